use std::path::PathBuf;
use thiserror::Error;

use crate::keys::KeyAlgorithm;

#[derive(Debug, Error)]
pub enum GhostKeyError {
    #[error("key generation error: {0}")]
    KeyGen(#[from] KeyGenError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum KeyGenError {
    #[error("every key algorithm failed for {}: tried {tried:?}", path.display())]
    Exhausted {
        path: PathBuf,
        tried: Vec<KeyAlgorithm>,
    },

    #[error("failed to spawn key generation tool: {0}")]
    SpawnFailed(std::io::Error),

    #[error("key inspection failed: {0}")]
    InspectFailed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("config file error: {0}")]
    FileError(String),
}

pub type Result<T> = std::result::Result<T, GhostKeyError>;
