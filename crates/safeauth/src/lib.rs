//! Privilege capabilities threaded through a unit of work.
//!
//! Core principle: **every privileged action is preceded by an explicit check,
//! and the point of use can prove that the check happened.**
//!
//! # Protocol
//!
//! 1. At the request boundary, [`Enforcer::grant`] attaches the caller's
//!    privileges to a fresh [`Carrier`]. This happens exactly once.
//! 2. A handler calls [`Enforcer::check`] with the privileges its action
//!    needs. Success yields a carrier with a *checked* marker.
//! 3. The storage layer calls [`Enforcer::must`] on the carrier it was handed
//!    before running any query.
//!
//! ```
//! use safeauth::{Carrier, Enforcer, Privilege};
//!
//! let enforcer = Enforcer::strict();
//! let request = enforcer.grant(&Carrier::new(), [Privilege::READ, Privilege::WRITE])?;
//!
//! let checked = enforcer.check(&request, &[Privilege::READ])?;
//! enforcer.must(&checked)?;
//!
//! assert!(enforcer.check(&request, &[Privilege::DELETE]).is_err());
//! assert!(enforcer.must(&request).is_err());
//! # Ok::<(), safeauth::Error>(())
//! ```
//!
//! In [`Mode::ReportOnly`] every violation is reported to a
//! [`DiagnosticSink`] and the operation proceeds.

mod carrier;
mod diagnostic;
mod enforcer;
mod error;
mod privilege;

pub use carrier::{Carrier, CarrierId};
pub use diagnostic::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use enforcer::{Enforcer, Mode};
pub use error::{Error, Result, Violation};
pub use privilege::{Privilege, PrivilegeSet};
