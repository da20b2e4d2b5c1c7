use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("asset not found: {0}")]
    NotFound(String),
}
