//! SQLite storage layer for local preferences
//!
//! Holds the session token and the onboarding flag. Everything else the app
//! shows lives on the server.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::Result;
use crate::migrations::run_migrations;
use crate::session::SessionStore;

pub const SETTING_AUTH_TOKEN: &str = "auth_token";
pub const SETTING_ONBOARDING_COMPLETE: &str = "onboarding_complete";

/// Storage backend using SQLite
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        run_migrations(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }

    // ========== Settings ==========

    /// Save or update a setting value
    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Get a setting value
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Remove a setting, returning whether it existed
    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    // ========== Onboarding ==========

    pub fn onboarding_complete(&self) -> Result<bool> {
        Ok(self
            .get_setting(SETTING_ONBOARDING_COMPLETE)?
            .is_some_and(|v| v == "true"))
    }

    pub fn set_onboarding_complete(&self, complete: bool) -> Result<()> {
        self.set_setting(
            SETTING_ONBOARDING_COMPLETE,
            if complete { "true" } else { "false" },
        )
    }
}

#[async_trait]
impl SessionStore for Storage {
    async fn token(&self) -> Result<Option<String>> {
        self.get_setting(SETTING_AUTH_TOKEN)
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        self.set_setting(SETTING_AUTH_TOKEN, token)?;
        debug!("Session token stored");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.delete_setting(SETTING_AUTH_TOKEN)? {
            debug!("Session token cleared");
        }
        Ok(())
    }
}
