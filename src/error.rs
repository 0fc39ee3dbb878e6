//! Error types for Quoteboard.
#![allow(dead_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Nothing to save: the replied message has no text or image")]
    NoContent,

    #[error("Image download failed: {0}")]
    Download(String),

    #[error("The quote store is empty")]
    EmptyStore,

    #[error("Render error: {0}")]
    Render(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Recoverable errors are reported back to the chat user as a plain
    /// message instead of being logged as failures.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NoContent | Error::Download(_) | Error::EmptyStore
        )
    }
}
