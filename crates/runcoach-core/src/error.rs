//! Error types for Runcoach

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing secret: {name}")]
    MissingSecret { name: String },

    #[error("transport error: {0}")]
    TransportError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn missing_secret(name: impl Into<String>) -> Self {
        Self::MissingSecret { name: name.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError(message.into())
    }
}
