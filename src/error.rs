//! Crate error type. Store and configuration failures are kept as text so
//! the error stays `Send` and cheap to log.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrgmapError {
    #[error("config: {0}")]
    Config(String),
    #[error("store: {0}")]
    Persistence(String),
    #[error("session lock poisoned: {0}")]
    Lock(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OrgmapError>;

impl From<rusqlite::Error> for OrgmapError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<::config::ConfigError> for OrgmapError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
