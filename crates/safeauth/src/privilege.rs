//! Privilege tokens and sets.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// An opaque privilege token, by convention a short name like `read`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Privilege(Cow<'static, str>);

impl Privilege {
    pub const READ: Privilege = Privilege(Cow::Borrowed("read"));
    pub const WRITE: Privilege = Privilege(Cow::Borrowed("write"));
    pub const DELETE: Privilege = Privilege(Cow::Borrowed("delete"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Privilege {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Privilege {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// An unordered, duplicate-free collection of privileges.
///
/// The storage form is pipe delimited with leading and trailing pipes
/// (`|read|write|`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeSet(BTreeSet<Privilege>);

impl PrivilegeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the pipe-delimited storage form. Empty segments are ignored.
    pub fn parse(s: &str) -> Self {
        s.split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Privilege::from(p.to_string()))
            .collect()
    }

    pub fn contains(&self, privilege: &Privilege) -> bool {
        self.0.contains(privilege)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Privilege> {
        self.0.iter()
    }

    /// Render the pipe-delimited storage form.
    pub fn to_storage(&self) -> String {
        let mut out = String::from("|");
        for p in &self.0 {
            out.push_str(p.as_str());
            out.push('|');
        }
        if self.0.is_empty() {
            out.push('|');
        }
        out
    }
}

impl<P: Into<Privilege>> FromIterator<P> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for PrivilegeSet {
    type Item = Privilege;
    type IntoIter = std::collections::btree_set::IntoIter<Privilege>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for PrivilegeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Privilege::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
