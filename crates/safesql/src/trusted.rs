//! Query text that cannot carry untrusted input.

use std::fmt;

/// Text known at compile time.
///
/// The only way to obtain one is the [`const_text!`](crate::const_text) (or
/// [`sql!`](crate::sql)) macro, which accepts a single string literal token.
/// A variable, a `String`, `format!` output or `concat!` does not match:
///
/// ```compile_fail
/// let table = String::from("users");
/// let text = safesql::const_text!(table);
/// ```
///
/// ```compile_fail
/// let text = safesql::const_text!(concat!("SELECT * FROM ", "users"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstText(&'static str);

impl ConstText {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

#[doc(hidden)]
pub mod __private {
    use super::ConstText;

    /// Only for expansion of `const_text!`. Calling this directly defeats the
    /// point of the type and will be rejected in review.
    pub const fn literal(text: &'static str) -> ConstText {
        ConstText(text)
    }
}

/// Wrap a string literal as [`ConstText`].
#[macro_export]
macro_rules! const_text {
    ($text:literal) => {{
        const TEXT: &str = $text;
        $crate::__private::literal(TEXT)
    }};
}

/// Build a [`TrustedSql`] from a string literal.
///
/// ```
/// let q = safesql::sql!("SELECT id FROM users WHERE name = ?1");
/// assert_eq!(q.as_str(), "SELECT id FROM users WHERE name = ?1");
/// ```
///
/// Runtime data never becomes query text:
///
/// ```compile_fail
/// let name = std::env::args().next().unwrap();
/// let q = safesql::TrustedSql::new(format!("SELECT id FROM users WHERE name = '{name}'"));
/// ```
#[macro_export]
macro_rules! sql {
    ($text:literal) => {
        $crate::TrustedSql::new($crate::const_text!($text))
    };
}

/// SQL text that is safe to hand to the database.
///
/// Trusted text comes from string literals, integers, the concatenation of
/// other trusted text, or [`riskily_assume_trusted_sql`]
/// for audited legacy call sites.
///
/// [`riskily_assume_trusted_sql`]: crate::legacy::riskily_assume_trusted_sql
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedSql(String);

impl TrustedSql {
    pub fn new(text: ConstText) -> Self {
        Self(text.as_str().to_string())
    }

    /// The decimal rendering of an integer.
    pub fn from_int(i: i64) -> Self {
        Self(i.to_string())
    }

    /// Join already trusted fragments.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a TrustedSql>) -> Self {
        Self(parts.into_iter().map(|p| p.0.as_str()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn assume_trusted(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for TrustedSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The right to build [`TrustedSql`] from arbitrary text.
///
/// Its field is private to this module, so the only instance is
/// [`LEGACY_CTOR`], which only [`crate::legacy`] uses.
pub(crate) struct TrustedSqlCtor(fn(String) -> TrustedSql);

impl TrustedSqlCtor {
    pub(crate) fn build(&self, text: String) -> TrustedSql {
        (self.0)(text)
    }
}

pub(crate) static LEGACY_CTOR: TrustedSqlCtor = TrustedSqlCtor(TrustedSql::assume_trusted);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        let q = crate::sql!("SELECT 1");
        assert_eq!(q.as_str(), "SELECT 1");
        assert!(!q.is_empty());
    }

    #[test]
    fn test_from_int() {
        assert_eq!(TrustedSql::from_int(-42).as_str(), "-42");
    }

    #[test]
    fn test_concat_trusted_parts() {
        let limit = TrustedSql::from_int(10);
        let q = TrustedSql::concat([
            &crate::sql!("SELECT id FROM notes LIMIT "),
            &limit,
        ]);
        assert_eq!(q.to_string(), "SELECT id FROM notes LIMIT 10");
    }

    #[test]
    fn test_const_text_keeps_static_str() {
        let text = crate::const_text!("SELECT 2");
        assert_eq!(text.as_str(), "SELECT 2");
        assert_eq!(TrustedSql::new(text), crate::sql!("SELECT 2"));
    }
}
