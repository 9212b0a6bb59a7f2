//! Escape hatch for call sites that cannot use literals.
//!
//! Every use of this module must be manually audited: the text passed in
//! must never contain data that a user can influence.

use crate::TrustedSql;
use crate::trusted::LEGACY_CTOR;

/// Treat `trusted` as query text without any check.
#[track_caller]
pub fn riskily_assume_trusted_sql(trusted: impl Into<String>) -> TrustedSql {
    let location = std::panic::Location::caller();
    tracing::trace!(
        target: "safesql::legacy",
        file = location.file(),
        line = location.line(),
        "assuming trusted sql"
    );
    LEGACY_CTOR.build(trusted.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assumes_computed_text() {
        let table = "users";
        let q = riskily_assume_trusted_sql(format!("SELECT COUNT(*) FROM {table}"));
        assert_eq!(q.as_str(), "SELECT COUNT(*) FROM users");
    }
}
