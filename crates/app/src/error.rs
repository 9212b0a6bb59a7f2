use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] safeauth::Error),

    #[error(transparent)]
    Sql(#[from] safesql::Error),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether this is an authorization denial, as opposed to a defect or
    /// an infrastructure failure.
    pub fn is_denied(&self) -> bool {
        match self {
            Error::Auth(e) | Error::Sql(safesql::Error::Auth(e)) => e.is_denied(),
            Error::NotLoggedIn => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
