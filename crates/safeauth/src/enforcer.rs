//! Grant, Check and Must.

use crate::carrier::Binding;
use crate::diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
use crate::{Carrier, Error, Privilege, PrivilegeSet, Result, Violation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// How protocol violations are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Violations and denials fail the operation.
    #[default]
    Strict,
    /// Violations and denials are reported and the operation proceeds.
    ///
    /// Meant for rolling the protocol out onto existing code, never as a
    /// production posture.
    ReportOnly,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Strict => f.write_str("strict"),
            Mode::ReportOnly => f.write_str("report_only"),
        }
    }
}

/// Applies the Grant / Check / Must protocol under a fixed [`Mode`].
///
/// Build one at startup and clone it into whatever needs it; the mode never
/// changes afterwards.
#[derive(Clone)]
pub struct Enforcer {
    mode: Mode,
    sink: Arc<dyn DiagnosticSink>,
}

impl Enforcer {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn strict() -> Self {
        Self::new(Mode::Strict)
    }

    pub fn report_only() -> Self {
        Self::new(Mode::ReportOnly)
    }

    /// Deliver report-only diagnostics to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Attach a privilege set to `carrier`.
    ///
    /// A carrier may be granted privileges once in its whole ancestry.
    #[track_caller]
    pub fn grant<I>(&self, carrier: &Carrier, privileges: I) -> Result<Carrier>
    where
        I: IntoIterator,
        I::Item: Into<Privilege>,
    {
        let location = Location::caller();
        if carrier.privileges().is_some() {
            self.violation(Violation::GrantedTwice, carrier, location)?;
        }
        let set: PrivilegeSet = privileges.into_iter().collect();
        tracing::debug!(
            target: "safeauth",
            carrier = %carrier.id(),
            privileges = %set,
            "privileges granted"
        );
        Ok(carrier.bind(Binding::Privileges(set)))
    }

    /// Verify that every privilege in `required` was granted.
    ///
    /// On success the returned carrier bears the checked marker that
    /// [`must`](Self::must) looks for. In strict mode the first missing
    /// privilege fails the check; in report-only mode every missing privilege
    /// is reported and the check succeeds.
    #[track_caller]
    pub fn check(&self, carrier: &Carrier, required: &[Privilege]) -> Result<Carrier> {
        let location = Location::caller();
        let Some(granted) = carrier.privileges() else {
            self.violation(Violation::CheckBeforeGrant, carrier, location)?;
            return Ok(carrier.bind(Binding::Checked));
        };

        for privilege in required {
            if granted.contains(privilege) {
                continue;
            }
            match self.mode {
                Mode::Strict => {
                    tracing::debug!(
                        target: "safeauth",
                        carrier = %carrier.id(),
                        missing = %privilege,
                        "privilege denied"
                    );
                    return Err(Error::Denied {
                        privilege: privilege.clone(),
                    });
                }
                Mode::ReportOnly => {
                    self.report(Violation::MissingPrivilege(privilege.clone()), carrier, location)
                }
            }
        }

        Ok(carrier.bind(Binding::Checked))
    }

    /// Verify that a Check happened somewhere upstream of `carrier`.
    #[track_caller]
    pub fn must(&self, carrier: &Carrier) -> Result<()> {
        if carrier.is_checked() {
            return Ok(());
        }
        self.violation(Violation::MustBeforeCheck, carrier, Location::caller())
    }

    fn violation(
        &self,
        violation: Violation,
        carrier: &Carrier,
        location: &'static Location<'static>,
    ) -> Result<()> {
        match self.mode {
            Mode::Strict => {
                tracing::error!(
                    target: "safeauth",
                    violation = %violation,
                    carrier = %carrier.id(),
                    file = location.file(),
                    line = location.line(),
                    "authorization protocol violation"
                );
                Err(Error::Violation(violation))
            }
            Mode::ReportOnly => {
                self.report(violation, carrier, location);
                Ok(())
            }
        }
    }

    fn report(&self, violation: Violation, carrier: &Carrier, location: &'static Location<'static>) {
        self.sink
            .report(&Diagnostic::capture(violation, carrier.id(), location));
    }
}

impl Default for Enforcer {
    fn default() -> Self {
        Self::strict()
    }
}

impl fmt::Debug for Enforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enforcer").field("mode", &self.mode).finish()
    }
}
