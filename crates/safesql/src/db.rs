//! Query executors that only accept [`TrustedSql`].

use crate::{Result, TrustedSql};
use rusqlite::{Connection, OptionalExtension, Params, Row};
use safeauth::{Carrier, Enforcer};
use std::path::Path;

/// SQLite connection whose query text must be [`TrustedSql`].
///
/// User-supplied values travel only as bound parameters.
pub struct Db {
    conn: Connection,
}

impl Db {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Run a single statement, returning the number of changed rows.
    pub fn execute<P: Params>(&self, query: &TrustedSql, params: P) -> Result<usize> {
        Ok(self.conn.execute(query.as_str(), params)?)
    }

    /// Run several statements that take no parameters.
    pub fn execute_batch(&self, query: &TrustedSql) -> Result<()> {
        self.conn.execute_batch(query.as_str())?;
        Ok(())
    }

    /// Return the first row mapped through `f`, or `None` when there is none.
    pub fn query_row<T, P, F>(&self, query: &TrustedSql, params: P, f: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(self.conn.query_row(query.as_str(), params, f).optional()?)
    }

    /// Map every row through `f`.
    pub fn query_map<T, P, F>(&self, query: &TrustedSql, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(query.as_str())?;
        let rows = stmt.query_map(params, f)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    /// Row id of the most recent successful insert on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

/// A [`Db`] that refuses to run anything unless an authorization check
/// happened upstream.
///
/// Each operation calls [`Enforcer::must`] on the carrier it is handed before
/// touching the connection.
pub struct GuardedDb {
    db: Db,
    enforcer: Enforcer,
}

impl GuardedDb {
    pub fn new(db: Db, enforcer: Enforcer) -> Self {
        Self { db, enforcer }
    }

    pub fn enforcer(&self) -> &Enforcer {
        &self.enforcer
    }

    #[track_caller]
    pub fn execute<P: Params>(&self, carrier: &Carrier, query: &TrustedSql, params: P) -> Result<usize> {
        self.enforcer.must(carrier)?;
        self.db.execute(query, params)
    }

    #[track_caller]
    pub fn execute_batch(&self, carrier: &Carrier, query: &TrustedSql) -> Result<()> {
        self.enforcer.must(carrier)?;
        self.db.execute_batch(query)
    }

    #[track_caller]
    pub fn query_row<T, P, F>(
        &self,
        carrier: &Carrier,
        query: &TrustedSql,
        params: P,
        f: F,
    ) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.enforcer.must(carrier)?;
        self.db.query_row(query, params, f)
    }

    #[track_caller]
    pub fn query_map<T, P, F>(
        &self,
        carrier: &Carrier,
        query: &TrustedSql,
        params: P,
        f: F,
    ) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.enforcer.must(carrier)?;
        self.db.query_map(query, params, f)
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.db.last_insert_rowid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, sql};
    use rusqlite::params;
    use safeauth::{Privilege, RecordingSink, Violation};

    fn users_db() -> Db {
        let db = Db::in_memory().unwrap();
        db.execute_batch(&sql!(
            "CREATE TABLE users(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, password TEXT);
             INSERT INTO users(name, password) VALUES ('admin', 'admin');
             INSERT INTO users(name, password) VALUES ('reader', 'reader');"
        ))
        .unwrap();
        db
    }

    #[test]
    fn test_bound_parameters_are_not_text() {
        let db = users_db();
        let q = sql!("SELECT id FROM users WHERE name = ?1 AND password = ?2");

        let hit = db
            .query_row(&q, params!["admin", "admin"], |row| row.get::<_, i64>(0))
            .unwrap();
        assert_eq!(hit, Some(1));

        let injected = db
            .query_row(&q, params!["admin", "' OR '1'='1"], |row| row.get::<_, i64>(0))
            .unwrap();
        assert_eq!(injected, None);
    }

    #[test]
    fn test_query_map_and_insert() {
        let db = users_db();
        let changed = db
            .execute(
                &sql!("INSERT INTO users(name, password) VALUES (?1, ?2)"),
                params!["editor", "editor"],
            )
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(db.last_insert_rowid(), 3);

        let names = db
            .query_map(&sql!("SELECT name FROM users ORDER BY id"), [], |row| {
                row.get::<_, String>(0)
            })
            .unwrap();
        assert_eq!(names, vec!["admin", "reader", "editor"]);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        {
            let db = Db::open(&path).unwrap();
            db.execute_batch(&sql!("CREATE TABLE t(x INTEGER)")).unwrap();
            db.execute(&sql!("INSERT INTO t(x) VALUES (?1)"), [7]).unwrap();
        }
        let db = Db::open(&path).unwrap();
        let x = db
            .query_row(&sql!("SELECT x FROM t"), [], |row| row.get::<_, i64>(0))
            .unwrap();
        assert_eq!(x, Some(7));
    }

    #[test]
    fn test_guarded_requires_check() {
        let enforcer = Enforcer::strict();
        let db = GuardedDb::new(users_db(), enforcer.clone());
        let count = sql!("SELECT COUNT(*) FROM users");

        let granted = enforcer.grant(&Carrier::new(), [Privilege::READ]).unwrap();
        let err = db
            .query_row(&granted, &count, [], |row| row.get::<_, i64>(0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(safeauth::Error::Violation(Violation::MustBeforeCheck))
        ));

        let checked = enforcer.check(&granted, &[Privilege::READ]).unwrap();
        let n = db
            .query_row(&checked, &count, [], |row| row.get::<_, i64>(0))
            .unwrap();
        assert_eq!(n, Some(2));
    }

    #[test]
    fn test_guarded_blocks_write_without_check() {
        let enforcer = Enforcer::strict();
        let db = GuardedDb::new(users_db(), enforcer.clone());
        let granted = enforcer.grant(&Carrier::new(), [Privilege::DELETE]).unwrap();

        assert!(db
            .execute(&granted, &sql!("DELETE FROM users"), [])
            .is_err());

        let checked = enforcer.check(&granted, &[]).unwrap();
        let n = db
            .query_row(&checked, &sql!("SELECT COUNT(*) FROM users"), [], |row| {
                row.get::<_, i64>(0)
            })
            .unwrap();
        assert_eq!(n, Some(2));
    }

    #[test]
    fn test_guarded_report_only_runs_and_reports() {
        let sink = RecordingSink::new();
        let enforcer = Enforcer::report_only().with_sink(sink.clone());
        let db = GuardedDb::new(users_db(), enforcer);

        let names = db
            .query_map(&Carrier::new(), &sql!("SELECT name FROM users"), [], |row| {
                row.get::<_, String>(0)
            })
            .unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(sink.violations(), vec![Violation::MustBeforeCheck]);
    }
}
