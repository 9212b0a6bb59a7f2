//! SQL execution that is injection-free by construction.
//!
//! Query text and query data travel on separate channels. Text is a
//! [`TrustedSql`], which ordinary code can only build from string literals:
//!
//! ```no_run
//! use safesql::{Db, params, sql};
//!
//! let db = Db::open("users.db")?;
//! let name = std::env::args().nth(1).unwrap_or_default();
//!
//! // `name` can only ever be a bound parameter.
//! let id = db.query_row(
//!     &sql!("SELECT id FROM users WHERE name = ?1"),
//!     params![name],
//!     |row| row.get::<_, i64>(0),
//! )?;
//! # let _ = id;
//! # Ok::<(), safesql::Error>(())
//! ```
//!
//! # Core Concepts
//!
//! ## TrustedSql
//!
//! Built with [`sql!`], [`TrustedSql::new`] over a [`ConstText`],
//! [`TrustedSql::from_int`] or [`TrustedSql::concat`]. Code that must build
//! query text at runtime goes through [`legacy::riskily_assume_trusted_sql`],
//! so every such call site is one grep away.
//!
//! ## Db and GuardedDb
//!
//! [`Db`] runs trusted text with bound parameters. [`GuardedDb`] additionally
//! takes the request's [`safeauth::Carrier`] and calls
//! [`safeauth::Enforcer::must`] before every statement, so a storage call that
//! was reached without an authorization decision fails.
//!
//! # Re-exports
//!
//! - [`Db`], [`GuardedDb`] — Query executors
//! - [`TrustedSql`], [`ConstText`] — Query text
//! - [`params!`], [`Params`], [`Row`], [`RowResult`] — from `rusqlite`, for binding and reading
//! - [`Error`], [`Result`] — Error handling

mod db;
mod error;
pub mod legacy;
mod trusted;

pub use db::{Db, GuardedDb};
pub use error::{Error, Result};
pub use rusqlite::{Params, Result as RowResult, Row, params};
pub use trusted::{ConstText, TrustedSql};

#[doc(hidden)]
pub use trusted::__private;
