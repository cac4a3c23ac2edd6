use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown configuration key `{0}`")]
    UnknownKey(String),
}
