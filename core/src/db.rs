use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{LogEntry, LogKind, UserProfile};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    user_id TEXT PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL DEFAULT '',
                    city TEXT NOT NULL DEFAULT '',
                    dietary_preference TEXT NOT NULL DEFAULT '',
                    medical_conditions TEXT NOT NULL DEFAULT 'None',
                    physical_limitations TEXT NOT NULL DEFAULT 'None',
                    latest_cgm TEXT NOT NULL DEFAULT '',
                    mood TEXT NOT NULL DEFAULT ''
                );

                CREATE TABLE IF NOT EXISTS logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL REFERENCES users(user_id),
                    kind TEXT NOT NULL CHECK (kind IN ('CGM', 'MOOD', 'FOOD')),
                    value_text TEXT,
                    value_int INTEGER,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_logs_user_kind ON logs(user_id, kind);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Users ---

    pub fn upsert_user(&self, user: &UserProfile) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (user_id, first_name, last_name, city, dietary_preference,
                                medical_conditions, physical_limitations, latest_cgm, mood)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                city = excluded.city,
                dietary_preference = excluded.dietary_preference,
                medical_conditions = excluded.medical_conditions,
                physical_limitations = excluded.physical_limitations,
                latest_cgm = excluded.latest_cgm,
                mood = excluded.mood",
            params![
                user.user_id.trim(),
                user.first_name,
                user.last_name,
                user.city,
                user.dietary_preference,
                user.medical_conditions,
                user.physical_limitations,
                user.latest_cgm,
                user.mood,
            ],
        )?;
        Ok(())
    }

    pub fn import_users(&self, users: &[UserProfile]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for user in users {
            self.upsert_user(user)
                .with_context(|| format!("Failed to import user {}", user.user_id))?;
        }
        tx.commit()?;
        Ok(users.len())
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.conn
            .query_row(
                "SELECT user_id, first_name, last_name, city, dietary_preference,
                        medical_conditions, physical_limitations, latest_cgm, mood
                 FROM users WHERE user_id = ?1",
                params![user_id.trim()],
                Self::user_from_row,
            )
            .optional()
            .context("Failed to load user")
    }

    pub fn count_users(&self) -> Result<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n)
    }

    fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<UserProfile> {
        Ok(UserProfile {
            user_id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            city: row.get(3)?,
            dietary_preference: row.get(4)?,
            medical_conditions: row.get(5)?,
            physical_limitations: row.get(6)?,
            latest_cgm: row.get(7)?,
            mood: row.get(8)?,
        })
    }

    // --- Logs ---

    /// Record a log row. CGM and MOOD logs also update the user's latest
    /// reading/mood in the same transaction.
    pub fn insert_log(
        &self,
        user_id: &str,
        kind: LogKind,
        value_text: Option<&str>,
        value_int: Option<i64>,
    ) -> Result<LogEntry> {
        let now = Local::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        self.conn.execute(
            "INSERT INTO logs (user_id, kind, value_text, value_int, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, kind.as_str(), value_text, value_int, now],
        )?;
        let id = self.conn.last_insert_rowid();

        match (kind, value_text, value_int) {
            (LogKind::Cgm, _, Some(reading)) => {
                self.conn.execute(
                    "UPDATE users SET latest_cgm = ?1 WHERE user_id = ?2",
                    params![reading.to_string(), user_id],
                )?;
            }
            (LogKind::Mood, Some(mood), _) => {
                self.conn.execute(
                    "UPDATE users SET mood = ?1 WHERE user_id = ?2",
                    params![mood, user_id],
                )?;
            }
            _ => {}
        }

        tx.commit()?;

        Ok(LogEntry {
            id,
            user_id: user_id.to_string(),
            kind,
            value_text: value_text.map(str::to_string),
            value_int,
            created_at: now,
        })
    }

    /// Most recent logs first. `kind = None` returns every kind.
    pub fn get_logs(
        &self,
        user_id: &str,
        kind: Option<LogKind>,
        limit: i64,
    ) -> Result<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, kind, value_text, value_int, created_at
             FROM logs
             WHERE user_id = ?1 AND (?2 IS NULL OR kind = ?2)
             ORDER BY id DESC
             LIMIT ?3",
        )?;
        let entries = stmt
            .query_map(
                params![user_id, kind.map(LogKind::as_str), limit],
                Self::log_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn log_from_row(row: &rusqlite::Row) -> rusqlite::Result<LogEntry> {
        let kind_str: String = row.get(2)?;
        let kind = kind_str.parse().map_err(|e: anyhow::Error| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
        })?;
        Ok(LogEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind,
            value_text: row.get(3)?,
            value_int: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
