use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Auth(#[from] safeauth::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
