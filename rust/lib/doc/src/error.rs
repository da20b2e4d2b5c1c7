use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
