//! Versioned schema migrations.
//!
//! The schema version marker is the global `config` row with `k = 'version'`.
//! Migrations form a strictly ordered chain; each step is applied only from
//! its exact predecessor, inside its own exclusive transaction, and bumps the
//! marker before committing.

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::info;

use super::schema::{SCHEMA_V0, SCHEMA_V1};
use crate::error::{Error, Result};

const VERSION_KEY: &str = "version";

/// The schema version this build of the crate operates against.
pub const LATEST_VERSION: &str = "1";

pub struct Migration {
    pub version: &'static str,
    pub description: &'static str,
    up: fn(&Transaction<'_>) -> rusqlite::Result<()>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0",
        description: "create base tables",
        up: migrate_0,
    },
    Migration {
        version: "1",
        description: "domain settings columns and unique session tokens",
        up: migrate_1,
    },
];

fn migrate_0(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(SCHEMA_V0)
}

fn migrate_1(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(SCHEMA_V1)
}

/// Reads the version marker. `None` means no schema is present.
pub fn current_version(conn: &Connection) -> Result<Option<String>> {
    let has_config: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'config')",
        [],
        |row| row.get(0),
    )?;
    if !has_config {
        return Ok(None);
    }

    conn.query_row(
        "SELECT v FROM config WHERE domain_id IS NULL AND k = ?1 ORDER BY id DESC LIMIT 1",
        params![VERSION_KEY],
        |row| row.get(0),
    )
    .optional()
    .map_err(Error::from)
}

/// Fails unless the store is exactly at [`LATEST_VERSION`].
pub fn ensure_latest(conn: &Connection) -> Result<()> {
    let found = current_version(conn)?;
    if found.as_deref() == Some(LATEST_VERSION) {
        Ok(())
    } else {
        Err(Error::SchemaMismatch {
            expected: LATEST_VERSION,
            found,
        })
    }
}

/// Returns the step that follows `current`, or `None` at the end of the chain.
fn next_step(current: Option<&str>) -> Result<Option<&'static Migration>> {
    let start = match current {
        None => 0,
        Some(v) => {
            MIGRATIONS
                .iter()
                .position(|m| m.version == v)
                .ok_or_else(|| Error::UnknownSchemaVersion(v.to_string()))?
                + 1
        }
    };
    Ok(MIGRATIONS.get(start))
}

fn write_version(tx: &Transaction<'_>, version: &str) -> rusqlite::Result<()> {
    let rows = tx.execute(
        "UPDATE config SET v = ?1 WHERE domain_id IS NULL AND k = ?2",
        params![version, VERSION_KEY],
    )?;
    if rows == 0 {
        tx.execute(
            "INSERT INTO config (domain_id, k, v) VALUES (NULL, ?1, ?2)",
            params![VERSION_KEY, version],
        )?;
    }
    Ok(())
}

/// Applies every pending migration in order and returns the versions applied.
///
/// Fails with [`Error::AlreadyUpToDate`] when nothing was pending, so an
/// operator never mistakes "nothing to do" for "nothing happened".
pub fn migrate_to_latest(conn: &mut Connection) -> Result<Vec<String>> {
    let mut applied = Vec::new();

    loop {
        // EXCLUSIVE blocks a concurrent migrator until this step commits; it
        // then re-reads the marker and continues from the new version.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;
        let current = current_version(&tx)?;

        let Some(step) = next_step(current.as_deref())? else {
            if applied.is_empty() {
                return Err(Error::AlreadyUpToDate(current.unwrap_or_default()));
            }
            break;
        };

        info!(
            from = current.as_deref().unwrap_or("none"),
            to = step.version,
            "Migrating database: {}",
            step.description
        );

        (step.up)(&tx)?;
        write_version(&tx, step.version)?;
        tx.commit()?;

        applied.push(step.version.to_string());
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        conn
    }

    fn schema_dump(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT type || ':' || name || ':' || IFNULL(sql, '') FROM sqlite_master ORDER BY type, name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    fn apply_only(conn: &mut Connection, version: &str) {
        let tx = conn.transaction().unwrap();
        let step = MIGRATIONS.iter().find(|m| m.version == version).unwrap();
        (step.up)(&tx).unwrap();
        write_version(&tx, version).unwrap();
        tx.commit().unwrap();
    }

    #[test]
    fn test_latest_version_matches_chain() {
        assert_eq!(MIGRATIONS.last().unwrap().version, LATEST_VERSION);
    }

    #[test]
    fn test_fresh_store_has_no_version() {
        let conn = open();
        assert_eq!(current_version(&conn).unwrap(), None);
        assert!(matches!(
            ensure_latest(&conn),
            Err(Error::SchemaMismatch { found: None, .. })
        ));
    }

    #[test]
    fn test_migrate_fresh_store_applies_whole_chain() {
        let mut conn = open();

        let applied = migrate_to_latest(&mut conn).unwrap();
        assert_eq!(applied, vec!["0".to_string(), "1".to_string()]);
        assert_eq!(current_version(&conn).unwrap().as_deref(), Some(LATEST_VERSION));
        ensure_latest(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for table in ["comments", "config", "domains", "sessions", "topics", "users"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_migrate_when_up_to_date_fails_and_changes_nothing() {
        let mut conn = open();
        migrate_to_latest(&mut conn).unwrap();
        let before = schema_dump(&conn);

        let err = migrate_to_latest(&mut conn).unwrap_err();
        assert!(matches!(err, Error::AlreadyUpToDate(ref v) if v == LATEST_VERSION));

        assert_eq!(schema_dump(&conn), before);
        let markers: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM config WHERE domain_id IS NULL AND k = 'version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(markers, 1);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut conn = open();
        migrate_to_latest(&mut conn).unwrap();
        conn.execute(
            "UPDATE config SET v = '42' WHERE domain_id IS NULL AND k = 'version'",
            [],
        )
        .unwrap();

        let err = migrate_to_latest(&mut conn).unwrap_err();
        assert!(matches!(err, Error::UnknownSchemaVersion(ref v) if v == "42"));
    }

    #[test]
    fn test_upgrade_populated_v0_store() {
        let mut conn = open();
        apply_only(&mut conn, "0");
        assert_eq!(current_version(&conn).unwrap().as_deref(), Some("0"));

        conn.execute_batch(
            "INSERT INTO domains (domain_name) VALUES ('a.example'), ('b.example');
             INSERT INTO config (domain_id, k, v) VALUES (1, 'forum_name', 'Alpha Forum');
             INSERT INTO config (domain_id, k, v) VALUES (2, 'signup_disabled', '1');
             INSERT INTO config (domain_id, k, v) VALUES (2, 'header_msg', 'hello');
             INSERT INTO users (domain_id, username, passwd_hash) VALUES (1, 'alice', 'x');
             INSERT INTO sessions (domain_id, user_id, token) VALUES (1, 1, 'dup');
             INSERT INTO sessions (domain_id, user_id, token) VALUES (1, 1, 'dup');",
        )
        .unwrap();

        let applied = migrate_to_latest(&mut conn).unwrap();
        assert_eq!(applied, vec!["1".to_string()]);

        let (forum_a, signup_a): (String, bool) = conn
            .query_row(
                "SELECT forum_name, signup_disabled FROM domains WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(forum_a, "Alpha Forum");
        assert!(!signup_a);

        let (forum_b, signup_b): (String, bool) = conn
            .query_row(
                "SELECT forum_name, signup_disabled FROM domains WHERE id = 2",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(forum_b, "b.example");
        assert!(signup_b);

        let header: String = conn
            .query_row(
                "SELECT v FROM config WHERE domain_id = 2 AND k = 'header_msg'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(header, "hello");

        let legacy: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM config WHERE k IN ('forum_name', 'signup_disabled')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(legacy, 0);

        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 1);

        let sessions: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(sessions, 1);

        let dup = conn.execute(
            "INSERT INTO sessions (domain_id, user_id, token) VALUES (1, 1, 'dup')",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_leftover_tables_without_marker_fail() {
        let mut conn = open();
        conn.execute_batch("CREATE TABLE domains (id INTEGER PRIMARY KEY);")
            .unwrap();

        let err = migrate_to_latest(&mut conn).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(current_version(&conn).unwrap(), None);
    }
}
