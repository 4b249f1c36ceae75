use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportingError {
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Column not found in dataset: {0}")]
    MissingColumn(String),

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Message log error: {0}")]
    MessageLog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportingError>;
