//! CLI error types.

use crate::config::ConfigError;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No user matches the given name and password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Configuration could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred in the application layer.
    #[error(transparent)]
    App(#[from] app::Error),

    /// An error occurred in the authorization layer.
    #[error(transparent)]
    Auth(#[from] safeauth::Error),

    /// Output could not be serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
