//! Runtime settings shared by handlers and orchestration services.

use remedy_core::{Error, Result};
use url::Url;
use uuid::Uuid;

use crate::extract::ApiKey;

/// Deployment settings of the remediation workflow.
#[derive(Debug, Clone)]
#[must_use = "settings do nothing unless you use them"]
pub struct RemediationSettings {
    auto_remediation_enabled: bool,
    public_base_url: Url,
    webhook_key: ApiKey,
    internal_key: ApiKey,
}

impl RemediationSettings {
    /// Creates settings with auto-remediation disabled.
    ///
    /// A trailing slash is added to `public_base_url` so links keep any
    /// path prefix the repository is mounted under.
    pub fn new(mut public_base_url: Url, webhook_key: ApiKey, internal_key: ApiKey) -> Self {
        if !public_base_url.path().ends_with('/') {
            let path = format!("{}/", public_base_url.path());
            public_base_url.set_path(&path);
        }

        Self {
            auto_remediation_enabled: false,
            public_base_url,
            webhook_key,
            internal_key,
        }
    }

    /// Turns the auto-remediation feature flag on or off.
    pub fn with_auto_remediation(mut self, enabled: bool) -> Self {
        self.auto_remediation_enabled = enabled;
        self
    }

    /// Returns whether downloads may trigger auto-remediation.
    #[inline]
    pub fn auto_remediation_enabled(&self) -> bool {
        self.auto_remediation_enabled
    }

    /// Returns the public base URL of the repository.
    #[inline]
    pub fn public_base_url(&self) -> &Url {
        &self.public_base_url
    }

    /// Key the remediation service presents on webhook calls.
    #[inline]
    pub fn webhook_key(&self) -> &ApiKey {
        &self.webhook_key
    }

    /// Key internal callers present on the remediation API.
    #[inline]
    pub fn internal_key(&self) -> &ApiKey {
        &self.internal_key
    }

    /// Publicly resolvable URL of a file's content.
    pub fn file_url(&self, file_id: Uuid) -> Result<Url> {
        self.link(&format!("files/{file_id}"))
    }

    /// Public landing page of a version.
    pub fn version_url(&self, version_id: Uuid) -> Result<Url> {
        self.link(&format!("versions/{version_id}"))
    }

    fn link(&self, path: &str) -> Result<Url> {
        self.public_base_url.join(path).map_err(|e| {
            Error::configuration()
                .with_message(format!("cannot build public link {path}"))
                .with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: &str) -> anyhow::Result<RemediationSettings> {
        Ok(RemediationSettings::new(
            Url::parse(base)?,
            ApiKey::new("webhook"),
            ApiKey::new("internal"),
        ))
    }

    #[test]
    fn links_keep_path_prefix() -> anyhow::Result<()> {
        let file_id = Uuid::nil();

        let root = settings("https://repo.example.com")?;
        assert_eq!(
            root.file_url(file_id)?.as_str(),
            "https://repo.example.com/files/00000000-0000-0000-0000-000000000000"
        );

        let nested = settings("https://example.com/scholarsphere")?;
        assert_eq!(
            nested.version_url(file_id)?.as_str(),
            "https://example.com/scholarsphere/versions/00000000-0000-0000-0000-000000000000"
        );
        Ok(())
    }

    #[test]
    fn feature_flag_defaults_off() -> anyhow::Result<()> {
        let settings = settings("https://repo.example.com")?;
        assert!(!settings.auto_remediation_enabled());
        assert!(settings.with_auto_remediation(true).auto_remediation_enabled());
        Ok(())
    }
}
