//! Notes: the privileged feature.
//!
//! Each handler checks the privilege its action needs against the request
//! and hands the checked carrier to the guarded database.

use crate::{Error, Request, Result, UserId};
use chrono::{DateTime, Utc};
use safeauth::Privilege;
use safesql::{GuardedDb, Row, RowResult, TrustedSql, params, sql};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub owner: UserId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

pub struct Notes<'a> {
    db: &'a GuardedDb,
}

impl<'a> Notes<'a> {
    pub(crate) fn new(db: &'a GuardedDb) -> Self {
        Self { db }
    }

    /// All notes, oldest first, or the newest `limit` notes. Requires `read`.
    pub fn list(&self, request: &Request, limit: Option<u32>) -> Result<Vec<Note>> {
        let carrier = self
            .db
            .enforcer()
            .check(request.carrier(), &[Privilege::READ])?;

        let query = match limit {
            None => sql!("SELECT id, owner, title, body, created_at FROM notes ORDER BY id"),
            Some(n) => TrustedSql::concat([
                &sql!(
                    "SELECT * FROM (SELECT id, owner, title, body, created_at FROM notes ORDER BY id DESC LIMIT "
                ),
                &TrustedSql::from_int(i64::from(n)),
                &sql!(") ORDER BY id"),
            ]),
        };
        Ok(self.db.query_map(&carrier, &query, [], note_from_row)?)
    }

    /// Store a note owned by the requesting user. Requires `write`.
    pub fn create(&self, request: &Request, title: &str, body: &str) -> Result<Note> {
        let owner = request.require_user()?.id;
        let carrier = self
            .db
            .enforcer()
            .check(request.carrier(), &[Privilege::WRITE])?;

        let created_at = Utc::now();
        self.db.execute(
            &carrier,
            &sql!("INSERT INTO notes(owner, title, body, created_at) VALUES (?1, ?2, ?3, ?4)"),
            params![owner.0, title, body, created_at],
        )?;
        let id = self.db.last_insert_rowid();
        tracing::info!(carrier = %carrier.id(), note = id, owner = %owner, "note created");

        Ok(Note {
            id,
            owner,
            title: title.to_string(),
            body: body.to_string(),
            created_at,
        })
    }

    /// Remove a note. Requires `delete`.
    pub fn delete(&self, request: &Request, id: i64) -> Result<()> {
        let carrier = self
            .db
            .enforcer()
            .check(request.carrier(), &[Privilege::DELETE])?;

        let changed = self
            .db
            .execute(&carrier, &sql!("DELETE FROM notes WHERE id = ?1"), params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("note {id}")));
        }
        tracing::info!(carrier = %carrier.id(), note = id, "note deleted");
        Ok(())
    }
}

fn note_from_row(row: &Row<'_>) -> RowResult<Note> {
    Ok(Note {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        title: row.get(2)?,
        body: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::App;
    use safeauth::{Enforcer, RecordingSink, Violation};

    fn bootstrapped(enforcer: Enforcer) -> App {
        let app = App::in_memory(enforcer).unwrap();
        let startup = app.startup_carrier().unwrap();
        app.users().bootstrap(&startup).unwrap();
        app
    }

    fn login(app: &App, name: &str) -> Request {
        let anonymous = app.preprocess(None).unwrap();
        let checked = app.enforcer().check(anonymous.carrier(), &[]).unwrap();
        let id = app
            .users()
            .authenticate(&checked, name, name)
            .unwrap()
            .unwrap();
        app.preprocess(Some(&id.to_string())).unwrap()
    }

    #[test]
    fn test_editor_creates_and_lists() {
        let app = bootstrapped(Enforcer::strict());
        let editor = login(&app, "editor");
        let notes = app.notes();

        let created = notes.create(&editor, "groceries", "milk").unwrap();
        assert_eq!(created.owner, editor.user().unwrap().id);

        let listed = notes.list(&editor, None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].title, "groceries");
        assert_eq!(listed[0].created_at, created.created_at);
    }

    #[test]
    fn test_reader_cannot_write() {
        let app = bootstrapped(Enforcer::strict());
        let reader = login(&app, "reader");
        let err = app.notes().create(&reader, "t", "b").unwrap_err();
        assert!(err.is_denied());
        assert!(app.notes().list(&reader, None).unwrap().is_empty());
    }

    #[test]
    fn test_only_admin_deletes() {
        let app = bootstrapped(Enforcer::strict());
        let editor = login(&app, "editor");
        let admin = login(&app, "admin");
        let note = app.notes().create(&editor, "t", "b").unwrap();

        assert!(app.notes().delete(&editor, note.id).unwrap_err().is_denied());
        app.notes().delete(&admin, note.id).unwrap();
        assert!(matches!(
            app.notes().delete(&admin, note.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_anonymous_is_denied() {
        let app = bootstrapped(Enforcer::strict());
        let anonymous = app.preprocess(None).unwrap();
        assert!(app.notes().list(&anonymous, None).unwrap_err().is_denied());
        assert!(matches!(
            app.notes().create(&anonymous, "t", "b"),
            Err(Error::NotLoggedIn)
        ));
    }

    #[test]
    fn test_list_limit_keeps_newest() {
        let app = bootstrapped(Enforcer::strict());
        let editor = login(&app, "editor");
        for title in ["one", "two", "three"] {
            app.notes().create(&editor, title, "").unwrap();
        }
        let titles: Vec<String> = app
            .notes()
            .list(&editor, Some(2))
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["two", "three"]);
    }

    #[test]
    fn test_hostile_text_is_stored_verbatim() {
        let app = bootstrapped(Enforcer::strict());
        let editor = login(&app, "editor");
        let title = "x'); DROP TABLE notes; --";
        app.notes().create(&editor, title, "b").unwrap();
        let listed = app.notes().list(&editor, None).unwrap();
        assert_eq!(listed[0].title, title);
    }

    #[test]
    fn test_report_only_reader_writes_with_diagnostic() {
        let sink = RecordingSink::new();
        let app = bootstrapped(Enforcer::report_only().with_sink(sink.clone()));
        let reader = login(&app, "reader");
        app.notes().create(&reader, "t", "b").unwrap();
        assert_eq!(
            sink.violations(),
            vec![Violation::MissingPrivilege(Privilege::WRITE)]
        );
    }

    #[test]
    fn test_note_serializes() {
        let app = bootstrapped(Enforcer::strict());
        let editor = login(&app, "editor");
        let note = app.notes().create(&editor, "t", "b").unwrap();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["title"], "t");
        assert_eq!(json["owner"], editor.user().unwrap().id.0);
    }
}
