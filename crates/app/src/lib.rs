//! The notes application built on `safeauth` and `safesql`.
//!
//! Request flow:
//!
//! 1. [`App::preprocess`] grants the session user's privileges to a fresh
//!    carrier, once per request.
//! 2. A handler such as [`Notes::create`] checks the privilege it needs.
//! 3. The checked carrier reaches the [`safesql::GuardedDb`], which refuses to
//!    run a statement without it.

mod error;
mod notes;
mod request;
mod service;
mod users;

pub use error::{Error, Result};
pub use notes::{Note, Notes};
pub use request::Request;
pub use service::App;
pub use users::{Account, DEFAULT_USERS, User, UserId, Users};
