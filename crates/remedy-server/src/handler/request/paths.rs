use serde::Deserialize;
use uuid::Uuid;

/// Path parameters of file-scoped routes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FilePathParams {
    /// File resource identifier.
    pub file_id: Uuid,
}
