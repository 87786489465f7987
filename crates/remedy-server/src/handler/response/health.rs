use serde::{Deserialize, Serialize};

/// Liveness probe response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Always `healthy` when the service answers.
    pub status: String,
}

impl Health {
    /// Returns the healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_owned(),
        }
    }
}
