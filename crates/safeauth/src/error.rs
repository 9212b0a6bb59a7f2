//! Authorization error types.

use crate::Privilege;
use std::fmt;
use thiserror::Error;

/// A misuse of the Grant / Check / Must protocol.
///
/// Violations are programming defects, not user-facing conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Violation {
    /// Grant was called on a carrier that already holds privileges.
    GrantedTwice,
    /// Check was called on a carrier without a prior Grant.
    CheckBeforeGrant,
    /// Must was called on a carrier without a prior successful Check.
    MustBeforeCheck,
    /// A required privilege was missing but tolerated in report-only mode.
    MissingPrivilege(Privilege),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::GrantedTwice => f.write_str("grant called multiple times"),
            Violation::CheckBeforeGrant => f.write_str("check called before grant"),
            Violation::MustBeforeCheck => f.write_str("must called before check"),
            Violation::MissingPrivilege(p) => write!(f, "check failed for {p}"),
        }
    }
}

/// Authorization errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The protocol was used incorrectly.
    #[error("protocol violation: {0}")]
    Violation(Violation),

    /// A required privilege was not granted.
    #[error("privilege denied: missing {privilege}")]
    Denied { privilege: Privilege },
}

impl Error {
    pub fn is_denied(&self) -> bool {
        matches!(self, Error::Denied { .. })
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Error::Violation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
