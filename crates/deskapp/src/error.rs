use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("{0}")]
    Validation(String),

    #[error("Incorrect password!")]
    WrongPassword,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    IllegalMove(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, DeskError>;
