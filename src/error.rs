use std::io;

use thiserror::Error;

/// Main error type for skilldock operations.
#[derive(Error, Debug)]
pub enum SkdError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("Invalid skill format: {0}")]
    InvalidSkill(String),

    #[error("Unknown client: {0}")]
    UnknownClient(String),

    #[error("Client not detected: {0}")]
    ClientNotDetected(String),

    #[error("No installations found for {0}")]
    NothingInstalled(String),

    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SkdError>;
