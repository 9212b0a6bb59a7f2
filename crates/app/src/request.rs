//! Per-request authorization state.

use crate::{Error, Result, User};
use safeauth::Carrier;

/// An inbound request after preprocessing.
///
/// The carrier has been granted the user's privileges exactly once; handlers
/// derive checked carriers from it.
#[derive(Debug, Clone)]
pub struct Request {
    carrier: Carrier,
    user: Option<User>,
}

impl Request {
    pub(crate) fn new(carrier: Carrier, user: Option<User>) -> Self {
        Self { carrier, user }
    }

    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(Error::NotLoggedIn)
    }
}
