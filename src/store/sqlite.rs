use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::migrate;
use crate::error::{Error, Result, is_foreign_key_violation, is_unique_violation};
use crate::types::*;

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DOMAIN_COLUMNS: &str =
    "id, domain_name, forum_name, signup_disabled, read_only, created_at, updated_at";
const USER_COLUMNS: &str = "id, domain_id, username, passwd_hash, email, is_admin, is_mod, is_banned, created_at, updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_busy_timeout(db_path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Opens the store; `busy_timeout` bounds how long a statement waits on
    /// another writer before failing with `StoreUnavailable`.
    pub fn with_busy_timeout<P: AsRef<Path>>(db_path: P, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows the content layer to execute its own SQL against the same store.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn domain_from_row(row: &Row<'_>) -> rusqlite::Result<Domain> {
    Ok(Domain {
        id: row.get(0)?,
        domain_name: row.get(1)?,
        forum_name: row.get(2)?,
        signup_disabled: row.get(3)?,
        read_only: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        domain_id: row.get(1)?,
        username: row.get(2)?,
        passwd_hash: row.get(3)?,
        email: row.get(4)?,
        is_admin: row.get(5)?,
        is_mod: row.get(6)?,
        is_banned: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        updated_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

impl Store for SqliteStore {
    fn current_version(&self) -> Result<Option<String>> {
        migrate::current_version(&self.conn())
    }

    fn migrate_to_latest(&self) -> Result<Vec<String>> {
        migrate::migrate_to_latest(&mut self.conn())
    }

    fn ensure_latest_schema(&self) -> Result<()> {
        migrate::ensure_latest(&self.conn())
    }

    // Domain operations

    fn create_domain(&self, domain_name: &str, forum_name: &str) -> Result<DomainId> {
        let conn = self.conn();
        let now = format_datetime(&Utc::now());
        let result = conn.execute(
            "INSERT INTO domains (domain_name, forum_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![domain_name, forum_name, now],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(Error::DuplicateDomain(domain_name.to_string())),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_domain(&self, id: DomainId) -> Result<Option<Domain>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {DOMAIN_COLUMNS} FROM domains WHERE id = ?1"),
            params![id],
            domain_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_domain_by_name(&self, domain_name: &str) -> Result<Option<Domain>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {DOMAIN_COLUMNS} FROM domains WHERE domain_name = ?1"),
            params![domain_name],
            domain_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_domains(&self) -> Result<Vec<Domain>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM domains ORDER BY domain_name"
        ))?;

        let rows = stmt.query_map([], domain_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn rename_domain(&self, old_name: &str, new_name: &str) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE domains SET domain_name = ?1, updated_at = ?2 WHERE domain_name = ?3",
            params![new_name, format_datetime(&Utc::now()), old_name],
        );

        match result {
            Ok(0) => Err(Error::NotFound("domain")),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::DuplicateDomain(new_name.to_string())),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn set_forum_name(&self, domain_name: &str, forum_name: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE domains SET forum_name = ?1, updated_at = ?2 WHERE domain_name = ?3",
            params![forum_name, format_datetime(&Utc::now()), domain_name],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("domain"));
        }
        Ok(())
    }

    fn set_domain_flag(&self, domain_name: &str, flag: DomainFlag, value: bool) -> Result<()> {
        let sql = match flag {
            DomainFlag::ReadOnly => {
                "UPDATE domains SET read_only = ?1, updated_at = ?2 WHERE domain_name = ?3"
            }
            DomainFlag::SignupDisabled => {
                "UPDATE domains SET signup_disabled = ?1, updated_at = ?2 WHERE domain_name = ?3"
            }
        };
        let rows = self.conn().execute(
            sql,
            params![value, format_datetime(&Utc::now()), domain_name],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("domain"));
        }
        Ok(())
    }

    fn delete_domain(&self, domain_name: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM domains WHERE domain_name = ?1",
            params![domain_name],
        )?;
        Ok(rows > 0)
    }

    // Config operations

    fn get_config(&self, domain_id: DomainId, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT v FROM config WHERE domain_id = ?1 AND k = ?2",
            params![domain_id, key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn set_config(&self, domain_id: DomainId, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE config SET v = ?1 WHERE domain_id = ?2 AND k = ?3",
            params![value, domain_id, key],
        )?;
        if rows == 0 {
            let result = tx.execute(
                "INSERT INTO config (domain_id, k, v) VALUES (?1, ?2, ?3)",
                params![domain_id, key, value],
            );
            match result {
                Ok(_) => {}
                Err(e) if is_foreign_key_violation(&e) => return Err(Error::NotFound("domain")),
                Err(e) => return Err(Error::from(e)),
            }
        }
        tx.execute(
            "UPDATE domains SET updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), domain_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn list_config(&self, domain_id: DomainId) -> Result<Vec<ConfigEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT k, v FROM config WHERE domain_id = ?1 ORDER BY k")?;

        let rows = stmt.query_map(params![domain_id], |row| {
            Ok(ConfigEntry {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<UserId> {
        let conn = self.conn();
        let now = format_datetime(&Utc::now());
        let result = conn.execute(
            "INSERT INTO users (domain_id, username, passwd_hash, email, is_admin, is_mod, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                user.domain_id,
                user.username,
                user.passwd_hash,
                user.email,
                user.roles.is_admin,
                user.roles.is_mod,
                now,
            ],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(Error::DuplicateUser(user.username.clone())),
            Err(e) if is_foreign_key_violation(&e) => Err(Error::NotFound("domain")),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, domain_id: DomainId, id: UserId) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE domain_id = ?1 AND id = ?2"),
            params![domain_id, id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, domain_id: DomainId, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE domain_id = ?1 AND username = ?2"),
            params![domain_id, username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self, domain_id: DomainId) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE domain_id = ?1 ORDER BY username"
        ))?;

        let rows = stmt.query_map(params![domain_id], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_password(
        &self,
        domain_id: DomainId,
        username: &str,
        passwd_hash: &str,
        evict_sessions: bool,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE users SET passwd_hash = ?1, updated_at = ?2 WHERE domain_id = ?3 AND username = ?4",
            params![passwd_hash, format_datetime(&Utc::now()), domain_id, username],
        )?;
        if rows == 0 {
            return Err(Error::NotFound("user"));
        }

        if evict_sessions {
            tx.execute(
                "DELETE FROM sessions WHERE domain_id = ?1
                 AND user_id IN (SELECT id FROM users WHERE domain_id = ?1 AND username = ?2)",
                params![domain_id, username],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn set_user_roles(&self, domain_id: DomainId, username: &str, roles: RoleFlags) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET is_admin = ?1, is_mod = ?2, updated_at = ?3
             WHERE domain_id = ?4 AND username = ?5",
            params![
                roles.is_admin,
                roles.is_mod,
                format_datetime(&Utc::now()),
                domain_id,
                username
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("user"));
        }
        Ok(())
    }

    fn set_user_banned(&self, domain_id: DomainId, username: &str, banned: bool) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE users SET is_banned = ?1, updated_at = ?2 WHERE domain_id = ?3 AND username = ?4",
            params![banned, format_datetime(&Utc::now()), domain_id, username],
        )?;
        if rows == 0 {
            return Err(Error::NotFound("user"));
        }

        let evicted = if banned {
            tx.execute(
                "DELETE FROM sessions WHERE domain_id = ?1
                 AND user_id IN (SELECT id FROM users WHERE domain_id = ?1 AND username = ?2)",
                params![domain_id, username],
            )?
        } else {
            0
        };

        tx.commit()?;
        Ok(evicted)
    }

    fn delete_user(&self, domain_id: DomainId, username: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM users WHERE domain_id = ?1 AND username = ?2",
            params![domain_id, username],
        )?;
        Ok(rows > 0)
    }

    // Session operations

    fn create_session(&self, domain_id: DomainId, user_id: UserId, token: &str) -> Result<Session> {
        let conn = self.conn();
        let created_at = Utc::now();

        // The SELECT binds the session to a user of this very domain; a user id
        // from another domain inserts nothing.
        let result = conn.execute(
            "INSERT INTO sessions (domain_id, user_id, token, created_at)
             SELECT domain_id, id, ?3, ?4 FROM users
             WHERE id = ?2 AND domain_id = ?1 AND is_banned = 0",
            params![domain_id, user_id, token, format_datetime(&created_at)],
        );

        match result {
            Ok(0) => {
                let banned: Option<bool> = conn
                    .query_row(
                        "SELECT is_banned FROM users WHERE id = ?1 AND domain_id = ?2",
                        params![user_id, domain_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                match banned {
                    Some(true) => Err(Error::UserBanned),
                    _ => Err(Error::NotFound("user")),
                }
            }
            Ok(_) => Ok(Session {
                id: conn.last_insert_rowid(),
                domain_id,
                user_id,
                token: token.to_string(),
                created_at,
            }),
            Err(e) if is_unique_violation(&e) => Err(Error::TokenCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn resolve_session(&self, domain_id: DomainId, token: &str) -> Result<Option<ResolvedSession>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT s.id, s.domain_id, s.user_id, s.token, s.created_at, u.is_banned
             FROM sessions s
             JOIN users u ON u.id = s.user_id AND u.domain_id = s.domain_id
             WHERE s.domain_id = ?1 AND s.token = ?2",
            params![domain_id, token],
            |row| {
                Ok(ResolvedSession {
                    session: Session {
                        id: row.get(0)?,
                        domain_id: row.get(1)?,
                        user_id: row.get(2)?,
                        token: row.get(3)?,
                        created_at: parse_datetime(&row.get::<_, String>(4)?),
                    },
                    user_banned: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, domain_id: DomainId, token: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM sessions WHERE domain_id = ?1 AND token = ?2",
            params![domain_id, token],
        )?;
        Ok(rows > 0)
    }

    fn delete_user_sessions(&self, domain_id: DomainId, user_id: UserId) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM sessions WHERE domain_id = ?1 AND user_id = ?2",
            params![domain_id, user_id],
        )?;
        Ok(rows)
    }

    fn delete_domain_sessions(&self, domain_id: DomainId) -> Result<usize> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE domain_id = ?1", params![domain_id])?;
        Ok(rows)
    }

    fn delete_all_sessions(&self) -> Result<usize> {
        let rows = self.conn().execute("DELETE FROM sessions", [])?;
        Ok(rows)
    }

    fn stats(&self, domain_id: DomainId) -> Result<ForumStats> {
        let conn = self.conn();
        conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM users WHERE domain_id = ?1),
                (SELECT COUNT(*) FROM sessions WHERE domain_id = ?1),
                (SELECT COUNT(*) FROM topics WHERE domain_id = ?1),
                (SELECT COUNT(*) FROM comments WHERE domain_id = ?1)",
            params![domain_id],
            |row| {
                Ok(ForumStats {
                    users: row.get(0)?,
                    sessions: row.get(1)?,
                    topics: row.get(2)?,
                    comments: row.get(3)?,
                })
            },
        )
        .map_err(Error::from)
    }

    fn close(&self) -> Result<()> {
        self.conn()
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}
