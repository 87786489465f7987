//! Provider implementations for the outbound HTTP integrations.

mod mail;
mod remediation;
mod ticket;

pub use mail::{MailClient, MailConfig};
pub use remediation::{RemediationClient, RemediationConfig};
pub use ticket::{TicketClient, TicketConfig};

use url::Url;

use crate::{Error, Result};

/// Parses and checks an endpoint URL taken from configuration.
fn require_endpoint(name: &str, url: Option<&Url>) -> Result<Url> {
    let url = url.ok_or_else(|| Error::Config(format!("{name} is not set")))?;
    match url.scheme() {
        "http" | "https" => Ok(url.clone()),
        scheme => Err(Error::Config(format!(
            "{name} must use http or https, got {scheme}"
        ))),
    }
}

/// Returns a trimmed secret, rejecting missing or blank values.
fn require_secret(name: &str, secret: Option<&str>) -> Result<String> {
    match secret.map(str::trim) {
        Some(secret) if !secret.is_empty() => Ok(secret.to_owned()),
        _ => Err(Error::Config(format!("{name} is not set"))),
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use axum::Router;
    use tokio::net::TcpListener;
    use url::Url;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub async fn spawn(router: Router) -> anyhow::Result<Url> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(Url::parse(&format!("http://{addr}/"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_requires_http_scheme() -> anyhow::Result<()> {
        let url = Url::parse("ftp://files.example.com/jobs")?;
        assert!(require_endpoint("REMEDIATION_API_URL", Some(&url)).is_err());
        assert!(require_endpoint("REMEDIATION_API_URL", None).is_err());

        let url = Url::parse("https://remediate.example.com/jobs")?;
        assert_eq!(require_endpoint("REMEDIATION_API_URL", Some(&url))?, url);
        Ok(())
    }

    #[test]
    fn test_secret_is_trimmed() {
        assert!(require_secret("KEY", None).is_err());
        assert!(require_secret("KEY", Some("   ")).is_err());
        assert_eq!(require_secret("KEY", Some(" abc ")).ok().as_deref(), Some("abc"));
    }
}
