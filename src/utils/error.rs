use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdScanError {
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),
    #[error("Recognition error: {0}")]
    RecognitionError(String),
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
