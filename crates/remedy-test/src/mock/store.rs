//! In-memory document store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use jiff::Timestamp;
use remedy_core::types::{
    Contributor, DocumentVersion, EventType, FileResource, NewFileResource, PublicationState,
    RemediationCommit, RemediationOutcome, RemediationResolution, RemediationStatus, Work,
};
use remedy_core::{DocumentStore, Error, Result};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    works: HashMap<Uuid, Work>,
    versions: HashMap<Uuid, DocumentVersion>,
    files: HashMap<Uuid, FileResource>,
    memberships: HashMap<Uuid, Vec<Uuid>>,
    events: HashMap<(String, EventType), RemediationOutcome>,
}

impl State {
    fn latest_published(&self, work_id: Uuid) -> Option<&DocumentVersion> {
        self.versions
            .values()
            .filter(|v| v.work_id == work_id && v.is_published())
            .max_by_key(|v| v.version_number)
    }

    fn next_version_number(&self, work_id: Uuid) -> i32 {
        self.versions
            .values()
            .filter(|v| v.work_id == work_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn file_by_correlation_id(&self, correlation_id: &str) -> Option<Uuid> {
        self.files
            .values()
            .find(|f| f.remediation.holds(correlation_id))
            .map(|f| f.id)
    }

    /// Builds on the latest published version while it still carries the
    /// replaced file; `None` means the work moved on.
    fn build_version(
        &mut self,
        replaced_file_id: Uuid,
        replacement: NewFileResource,
        at: Timestamp,
    ) -> Option<Uuid> {
        let base = self.latest_published(replacement.work_id).cloned()?;
        let base_version_id = base.id;
        let members = self.memberships.get(&base.id).cloned().unwrap_or_default();
        if !members.contains(&replaced_file_id) {
            return None;
        }

        let new_file = FileResource {
            id: replacement.id,
            work_id: replacement.work_id,
            filename: replacement.filename,
            mime_type: replacement.mime_type,
            sha256: replacement.sha256,
            size_bytes: replacement.size_bytes,
            storage_key: replacement.storage_key,
            remediated_from_id: replacement.remediated_from_id,
            remediation: RemediationStatus::NotStarted,
            created_at: at,
        };

        let version = DocumentVersion {
            id: Uuid::now_v7(),
            version_number: self.next_version_number(base.work_id),
            publication_state: PublicationState::Published,
            auto_remediation_started_at: None,
            remediated_version_id: None,
            is_auto_remediated: true,
            created_at: at,
            published_at: Some(at),
            ..base
        };

        let members = members
            .into_iter()
            .map(|id| if id == replaced_file_id { new_file.id } else { id })
            .collect();

        if let Some(base) = self.versions.get_mut(&base_version_id) {
            base.remediated_version_id = Some(version.id);
        }

        let version_id = version.id;
        self.files.insert(new_file.id, new_file);
        self.memberships.insert(version_id, members);
        self.versions.insert(version_id, version);
        Some(version_id)
    }
}

/// In-memory [`DocumentStore`].
///
/// All operations take a single lock, which gives `commit_remediation` and
/// `mark_remediation_started` the same atomicity as a database transaction.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test must not poison the remaining assertions.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inserts a work.
    pub fn insert_work(&self, title: &str, depositor_email: Option<&str>) -> Work {
        let work = Work {
            id: Uuid::now_v7(),
            title: title.to_owned(),
            depositor_name: "Depositor".to_owned(),
            depositor_email: depositor_email.map(str::to_owned),
            under_manual_review: false,
            created_at: Timestamp::now(),
        };
        self.lock().works.insert(work.id, work.clone());
        work
    }

    /// Flags a work as under manual review.
    pub fn set_under_manual_review(&self, work_id: Uuid, flag: bool) {
        if let Some(work) = self.lock().works.get_mut(&work_id) {
            work.under_manual_review = flag;
        }
    }

    /// Inserts a version with the next version number of its work.
    pub fn insert_version(
        &self,
        work_id: Uuid,
        publication_state: PublicationState,
        contributors: Vec<Contributor>,
    ) -> DocumentVersion {
        let mut state = self.lock();
        let now = Timestamp::now();
        let version = DocumentVersion {
            id: Uuid::now_v7(),
            work_id,
            version_number: state.next_version_number(work_id),
            publication_state,
            title: "Deposited work".to_owned(),
            metadata: serde_json::json!({ "keywords": ["accessibility"] }),
            contributors,
            auto_remediation_started_at: None,
            remediated_version_id: None,
            is_auto_remediated: false,
            created_at: now,
            published_at: (publication_state == PublicationState::Published).then_some(now),
        };
        state.versions.insert(version.id, version.clone());
        state.memberships.insert(version.id, Vec::new());
        version
    }

    /// Applies an arbitrary edit to a stored version.
    pub fn update_version(&self, version_id: Uuid, edit: impl FnOnce(&mut DocumentVersion)) {
        if let Some(version) = self.lock().versions.get_mut(&version_id) {
            edit(version);
        }
    }

    /// Inserts a file and attaches it to `version_id`.
    pub fn insert_file(
        &self,
        version_id: Uuid,
        filename: &str,
        mime_type: &str,
        sha256: &str,
    ) -> FileResource {
        let mut state = self.lock();
        let work_id = state
            .versions
            .get(&version_id)
            .map(|v| v.work_id)
            .unwrap_or_default();
        let file = FileResource {
            id: Uuid::now_v7(),
            work_id,
            filename: filename.to_owned(),
            mime_type: mime_type.to_owned(),
            sha256: sha256.to_owned(),
            size_bytes: 1024,
            storage_key: format!("uploads/{filename}"),
            remediated_from_id: None,
            remediation: RemediationStatus::NotStarted,
            created_at: Timestamp::now(),
        };
        state.files.insert(file.id, file.clone());
        state
            .memberships
            .entry(version_id)
            .or_default()
            .push(file.id);
        file
    }

    /// Attaches an existing file to another version.
    pub fn attach_file(&self, version_id: Uuid, file_id: Uuid) {
        self.lock()
            .memberships
            .entry(version_id)
            .or_default()
            .push(file_id);
    }

    /// Returns a snapshot of a version.
    pub fn version(&self, version_id: Uuid) -> Option<DocumentVersion> {
        self.lock().versions.get(&version_id).cloned()
    }

    /// Returns a snapshot of a file.
    pub fn file(&self, file_id: Uuid) -> Option<FileResource> {
        self.lock().files.get(&file_id).cloned()
    }

    /// Returns every version of a work ordered by version number.
    pub fn versions_of(&self, work_id: Uuid) -> Vec<DocumentVersion> {
        let mut versions: Vec<_> = self
            .lock()
            .versions
            .values()
            .filter(|v| v.work_id == work_id)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version_number);
        versions
    }

    /// Returns the file ids of a version in order.
    pub fn members(&self, version_id: Uuid) -> Vec<Uuid> {
        self.lock()
            .memberships
            .get(&version_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn find_work(&self, work_id: Uuid) -> Result<Option<Work>> {
        Ok(self.lock().works.get(&work_id).cloned())
    }

    async fn find_version(&self, version_id: Uuid) -> Result<Option<DocumentVersion>> {
        Ok(self.version(version_id))
    }

    async fn latest_published_version(&self, work_id: Uuid) -> Result<Option<DocumentVersion>> {
        Ok(self.lock().latest_published(work_id).cloned())
    }

    async fn list_version_files(&self, version_id: Uuid) -> Result<Vec<FileResource>> {
        let state = self.lock();
        let files = state
            .memberships
            .get(&version_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.files.get(id).cloned())
            .collect();
        Ok(files)
    }

    async fn find_file(&self, file_id: Uuid) -> Result<Option<FileResource>> {
        Ok(self.file(file_id))
    }

    async fn find_file_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> Result<Option<FileResource>> {
        let state = self.lock();
        Ok(state
            .file_by_correlation_id(correlation_id)
            .and_then(|id| state.files.get(&id).cloned()))
    }

    async fn mark_remediation_started(&self, version_id: Uuid, at: Timestamp) -> Result<bool> {
        let mut state = self.lock();
        let version = state.versions.get_mut(&version_id).ok_or_else(|| {
            Error::not_found().with_message(format!("version {version_id} does not exist"))
        })?;

        if version.auto_remediation_started_at.is_some() {
            return Ok(false);
        }
        version.auto_remediation_started_at = Some(at);
        Ok(true)
    }

    async fn record_submission(
        &self,
        file_id: Uuid,
        correlation_id: &str,
        at: Timestamp,
    ) -> Result<FileResource> {
        let mut state = self.lock();
        let file = state.files.get_mut(&file_id).ok_or_else(|| {
            Error::not_found().with_message(format!("file {file_id} does not exist"))
        })?;
        file.remediation = file.remediation.submit(correlation_id, at)?;
        Ok(file.clone())
    }

    async fn record_failure(
        &self,
        correlation_id: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<FileResource> {
        let mut state = self.lock();
        let file_id = state.file_by_correlation_id(correlation_id).ok_or_else(|| {
            Error::not_found().with_message(format!(
                "no file currently holds correlation id {correlation_id}"
            ))
        })?;
        let file = state
            .files
            .get_mut(&file_id)
            .ok_or_else(|| Error::internal_error().with_message("file vanished"))?;
        file.remediation = file.remediation.fail(correlation_id, reason, at)?;
        Ok(file.clone())
    }

    async fn is_event_processed(
        &self,
        correlation_id: &str,
        event_type: EventType,
    ) -> Result<bool> {
        let key = (correlation_id.to_owned(), event_type);
        Ok(self.lock().events.contains_key(&key))
    }

    async fn commit_remediation(&self, commit: RemediationCommit) -> Result<RemediationOutcome> {
        let mut state = self.lock();
        let correlation_id = commit.correlation_id.as_str();

        let file_id = state.file_by_correlation_id(correlation_id).ok_or_else(|| {
            Error::not_found().with_message(format!(
                "no file currently holds correlation id {correlation_id}"
            ))
        })?;

        let key = (correlation_id.to_owned(), EventType::JobSucceeded);
        if state.events.contains_key(&key) {
            return Ok(RemediationOutcome::AlreadyProcessed);
        }

        let current = state
            .files
            .get(&file_id)
            .map(|f| f.remediation.clone())
            .unwrap_or_default();
        let succeeded = current.succeed(correlation_id, &commit.output_url, commit.completed_at)?;

        let outcome = match commit.resolution {
            RemediationResolution::Replace {
                replaced_file_id,
                replacement,
                ..
            } => {
                match state.build_version(replaced_file_id, replacement, commit.completed_at) {
                    Some(version_id) => RemediationOutcome::VersionCreated { version_id },
                    None => RemediationOutcome::TargetMovedOn,
                }
            }
            RemediationResolution::Unchanged => RemediationOutcome::Unchanged,
            RemediationResolution::TargetMovedOn => RemediationOutcome::TargetMovedOn,
        };

        if let Some(file) = state.files.get_mut(&file_id) {
            file.remediation = succeeded;
        }
        state.events.insert(key, outcome);
        Ok(outcome)
    }
}
