//! The capability carrier: an immutable chain of typed bindings.

use crate::PrivilegeSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identifies the unit of work a carrier chain belongs to.
///
/// Every carrier derived from the same root shares its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarrierId(pub Uuid);

impl CarrierId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CarrierId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub(crate) enum Binding {
    Privileges(PrivilegeSet),
    Checked,
}

#[derive(Debug)]
struct Node {
    binding: Binding,
    parent: Option<Arc<Node>>,
}

/// Threads privilege and check state through a call chain.
///
/// A carrier is never mutated. [`Enforcer::grant`](crate::Enforcer::grant) and
/// [`Enforcer::check`](crate::Enforcer::check) return new carriers that point
/// back at the one they were derived from, so cloning is cheap and a carrier
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct Carrier {
    id: CarrierId,
    head: Option<Arc<Node>>,
}

impl Carrier {
    /// Create an empty root carrier for a new unit of work.
    pub fn new() -> Self {
        Self {
            id: CarrierId::new(),
            head: None,
        }
    }

    pub fn id(&self) -> CarrierId {
        self.id
    }

    /// The nearest privilege binding in the ancestry, if any.
    pub fn privileges(&self) -> Option<&PrivilegeSet> {
        self.bindings().find_map(|b| match b {
            Binding::Privileges(set) => Some(set),
            Binding::Checked => None,
        })
    }

    /// Whether any carrier in the ancestry bears the checked marker.
    pub fn is_checked(&self) -> bool {
        self.bindings().any(|b| matches!(b, Binding::Checked))
    }

    /// Number of bindings in the chain.
    pub fn depth(&self) -> usize {
        self.bindings().count()
    }

    pub(crate) fn bind(&self, binding: Binding) -> Self {
        Self {
            id: self.id,
            head: Some(Arc::new(Node {
                binding,
                parent: self.head.clone(),
            })),
        }
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> {
        std::iter::successors(self.head.as_deref(), |node| node.parent.as_deref())
            .map(|node| &node.binding)
    }
}

impl Default for Carrier {
    fn default() -> Self {
        Self::new()
    }
}
