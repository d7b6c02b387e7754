//! Cookbook error types.

use std::path::PathBuf;
use thiserror::Error;

/// Cookbook loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Cookbook parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Cookbook validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub(super) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
