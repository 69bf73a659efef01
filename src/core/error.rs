use thiserror::Error;

#[derive(Error, Debug)]
pub enum DreamerError {
    #[error("Creature not found: {0}")]
    CreatureNotFound(crate::core::types::CreatureId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Oracle error: {0}")]
    OracleError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DreamerError>;
