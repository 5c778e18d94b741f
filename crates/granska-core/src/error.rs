use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GranskaError {
    #[error("could not read document: {0}")]
    DocumentRead(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to load engine config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid engine config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
