//! Structured diagnostics for protocol violations.

use crate::{CarrierId, Violation};
use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::{Arc, Mutex};

/// A protocol violation observed at a specific call site.
#[derive(Debug)]
pub struct Diagnostic {
    pub violation: Violation,
    pub carrier: CarrierId,
    pub location: &'static Location<'static>,
    pub backtrace: Backtrace,
}

impl Diagnostic {
    pub(crate) fn capture(
        violation: Violation,
        carrier: CarrierId,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            violation,
            carrier,
            location,
            backtrace: Backtrace::capture(),
        }
    }
}

/// Receives diagnostics emitted by an [`Enforcer`](crate::Enforcer).
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Emits diagnostics as `tracing` warnings on the `safeauth` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, d: &Diagnostic) {
        tracing::warn!(
            target: "safeauth",
            violation = %d.violation,
            carrier = %d.carrier,
            file = d.location.file(),
            line = d.location.line(),
            backtrace = %d.backtrace,
            "authorization protocol violation"
        );
    }
}

/// Keeps every diagnostic it receives, for inspection in tests and tools.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    seen: Arc<Mutex<Vec<(Violation, CarrierId)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Violations recorded so far, oldest first.
    pub fn violations(&self) -> Vec<Violation> {
        self.lock().iter().map(|(v, _)| v.clone()).collect()
    }

    /// Carrier ids recorded so far, oldest first.
    pub fn carriers(&self) -> Vec<CarrierId> {
        self.lock().iter().map(|(_, c)| *c).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Violation, CarrierId)>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, d: &Diagnostic) {
        self.lock().push((d.violation.clone(), d.carrier));
    }
}
