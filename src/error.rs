use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("API request failed with status {status} after {retries} retries")]
    ApiErrorAfterRetries { status: u16, retries: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to resolve {resource}: {reason}")]
    Resolution { resource: String, reason: String },

    #[error("Pipeline clone failed. Build definitions API: {rest}; pipelines API: {pipelines}")]
    CloneFailed { rest: String, pipelines: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid rewrite pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl SnapshotError {
    pub fn resolution(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
