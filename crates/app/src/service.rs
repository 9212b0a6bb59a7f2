//! Wiring of the database, the enforcer and request preprocessing.

use crate::{Account, Notes, Request, Result, UserId, Users};
use safeauth::{Carrier, Enforcer, Privilege, PrivilegeSet};
use safesql::{Db, GuardedDb};
use std::path::Path;

/// The application: one guarded database shared by the users directory and
/// the notes service.
pub struct App {
    db: GuardedDb,
}

impl App {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>, enforcer: Enforcer) -> Result<Self> {
        let db = Db::open(path)?;
        Ok(Self {
            db: GuardedDb::new(db, enforcer),
        })
    }

    /// Create an in-memory application (useful for testing).
    pub fn in_memory(enforcer: Enforcer) -> Result<Self> {
        let db = Db::in_memory()?;
        Ok(Self {
            db: GuardedDb::new(db, enforcer),
        })
    }

    pub fn enforcer(&self) -> &Enforcer {
        self.db.enforcer()
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(&self.db)
    }

    pub fn notes(&self) -> Notes<'_> {
        Notes::new(&self.db)
    }

    /// A carrier holding every privilege, for process startup only.
    ///
    /// Never hand this to request handling code.
    pub fn startup_carrier(&self) -> Result<Carrier> {
        Ok(self.enforcer().grant(
            &Carrier::new(),
            [Privilege::READ, Privilege::WRITE, Privilege::DELETE],
        )?)
    }

    /// Resolve the session and grant its privileges, once, to a fresh carrier.
    ///
    /// A missing, malformed or unknown session yields an anonymous request
    /// with an empty grant.
    pub fn preprocess(&self, session: Option<&str>) -> Result<Request> {
        let root = Carrier::new();
        let account = match self.lookup_session(&root, session) {
            Ok(account) => account,
            Err(e) if e.is_denied() => None,
            Err(e) => {
                tracing::warn!(carrier = %root.id(), error = %e, "session lookup failed");
                None
            }
        };

        let (user, privileges) = match account {
            Some(Account { user, privileges }) => (Some(user), privileges),
            None => (None, PrivilegeSet::new()),
        };
        tracing::debug!(
            carrier = %root.id(),
            user = user.as_ref().map(|u| u.name.as_str()).unwrap_or("-"),
            privileges = %privileges,
            "request preprocessed"
        );

        let carrier = self.enforcer().grant(&root, privileges)?;
        Ok(Request::new(carrier, user))
    }

    fn lookup_session(&self, root: &Carrier, session: Option<&str>) -> Result<Option<Account>> {
        let Some(session) = session else {
            return Ok(None);
        };
        let Ok(id) = session.parse::<UserId>() else {
            tracing::debug!(carrier = %root.id(), "malformed session");
            return Ok(None);
        };

        // No privileges are needed to read one's own record.
        let lookup = self.enforcer().grant(root, PrivilegeSet::new())?;
        let lookup = self.enforcer().check(&lookup, &[])?;
        self.users().find(&lookup, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeauth::{RecordingSink, Violation};

    fn bootstrapped(enforcer: Enforcer) -> App {
        let app = App::in_memory(enforcer).unwrap();
        let startup = app.startup_carrier().unwrap();
        app.users().bootstrap(&startup).unwrap();
        app
    }

    fn session_for(app: &App, name: &str) -> String {
        let anonymous = app.preprocess(None).unwrap();
        let checked = app.enforcer().check(anonymous.carrier(), &[]).unwrap();
        app.users()
            .authenticate(&checked, name, name)
            .unwrap()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_preprocess_grants_user_privileges() {
        let app = bootstrapped(Enforcer::strict());
        let session = session_for(&app, "reader");
        let request = app.preprocess(Some(&session)).unwrap();

        assert_eq!(request.user().unwrap().name, "reader");
        let granted = request.carrier().privileges().unwrap();
        assert!(granted.contains(&Privilege::READ));
        assert!(!granted.contains(&Privilege::WRITE));
        assert!(!request.carrier().is_checked());
    }

    #[test]
    fn test_preprocess_anonymous_gets_empty_grant() {
        let app = bootstrapped(Enforcer::strict());
        for session in [None, Some("not-a-number"), Some("9999")] {
            let request = app.preprocess(session).unwrap();
            assert!(!request.is_logged_in());
            assert!(request.carrier().privileges().unwrap().is_empty());
        }
    }

    #[test]
    fn test_preprocessed_carrier_cannot_be_granted_again() {
        let app = bootstrapped(Enforcer::strict());
        let session = session_for(&app, "admin");
        let request = app.preprocess(Some(&session)).unwrap();
        let err = app
            .enforcer()
            .grant(request.carrier(), [Privilege::DELETE])
            .unwrap_err();
        assert!(matches!(err, safeauth::Error::Violation(Violation::GrantedTwice)));
    }

    #[test]
    fn test_preprocess_before_bootstrap_is_anonymous() {
        let app = App::in_memory(Enforcer::strict()).unwrap();
        let request = app.preprocess(Some("1")).unwrap();
        assert!(!request.is_logged_in());
    }

    #[test]
    fn test_preprocess_report_only_is_clean() {
        let sink = RecordingSink::new();
        let app = bootstrapped(Enforcer::report_only().with_sink(sink.clone()));
        let session = session_for(&app, "editor");
        app.preprocess(Some(&session)).unwrap();
        assert!(sink.violations().is_empty());
    }
}
