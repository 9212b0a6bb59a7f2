//! The users directory.

use crate::{Error, Result};
use safeauth::{Carrier, Privilege, PrivilegeSet};
use safesql::{GuardedDb, legacy, params, sql};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tables for users and notes, embedded at build time.
const SCHEMA: &str = include_str!("schema.sql");

/// Accounts created on first start: (name, password, privileges).
pub const DEFAULT_USERS: [(&str, &str, &str); 3] = [
    ("admin", "admin", "|read|write|delete|"),
    ("reader", "reader", "|read|"),
    ("editor", "editor", "|read|write|"),
];

/// Row id of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// A user as seen by handlers. Privileges live only in the request carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// A user together with the privileges stored for them.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub privileges: PrivilegeSet,
}

/// Lookups and bootstrap of the users table.
pub struct Users<'a> {
    db: &'a GuardedDb,
}

impl<'a> Users<'a> {
    pub(crate) fn new(db: &'a GuardedDb) -> Self {
        Self { db }
    }

    /// Create the schema and any missing default users.
    ///
    /// `carrier` must have been granted `read` and `write`.
    pub fn bootstrap(&self, carrier: &Carrier) -> Result<()> {
        let carrier = self
            .db
            .enforcer()
            .check(carrier, &[Privilege::READ, Privilege::WRITE])?;

        // Audited: SCHEMA is a file in this crate, compiled in.
        self.db
            .execute_batch(&carrier, &legacy::riskily_assume_trusted_sql(SCHEMA))?;

        let count = self.count(&carrier)?;
        if count >= DEFAULT_USERS.len() as i64 {
            return Ok(());
        }

        tracing::info!(count, "default users not found, initializing");
        for (name, password, privileges) in DEFAULT_USERS {
            self.db.execute(
                &carrier,
                &sql!(
                    "INSERT INTO users(name, password, privileges)
                     SELECT ?1, ?2, ?3
                     WHERE NOT EXISTS (SELECT 1 FROM users WHERE name = ?1)"
                ),
                params![name, password, privileges],
            )?;
        }
        tracing::info!("default users initialized");
        Ok(())
    }

    /// Number of users. `carrier` must be checked.
    pub fn count(&self, carrier: &Carrier) -> Result<i64> {
        let count = self
            .db
            .query_row(carrier, &sql!("SELECT COUNT(*) FROM users"), [], |row| {
                row.get::<_, i64>(0)
            })?;
        count.ok_or_else(|| Error::NotFound("users table".to_string()))
    }

    /// Resolve credentials to a user id. `carrier` must be checked.
    pub fn authenticate(&self, carrier: &Carrier, name: &str, password: &str) -> Result<Option<UserId>> {
        let id = self.db.query_row(
            carrier,
            &sql!("SELECT id FROM users WHERE name = ?1 AND password = ?2"),
            params![name, password],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id.map(UserId))
    }

    /// Load a user and their stored privileges. `carrier` must be checked.
    pub fn find(&self, carrier: &Carrier, id: UserId) -> Result<Option<Account>> {
        let account = self.db.query_row(
            carrier,
            &sql!("SELECT id, name, privileges FROM users WHERE id = ?1"),
            params![id.0],
            |row| {
                let privileges: String = row.get(2)?;
                Ok(Account {
                    user: User {
                        id: UserId(row.get(0)?),
                        name: row.get(1)?,
                    },
                    privileges: PrivilegeSet::parse(&privileges),
                })
            },
        )?;
        Ok(account)
    }
}
