use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Aud365Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid report definition: {0}")]
    InvalidDefinition(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cannot create output directory {path}: {reason}")]
    OutputDirError { path: PathBuf, reason: String },

    #[error("Cannot write report file {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Aud365Error>;
