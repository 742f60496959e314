//! Embedded SQL migrations for the local settings database
//!
//! Applied migrations are tracked by name in `_migrations`.

use rusqlite::Connection;
use tracing::{debug, info};

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_settings.sql",
    include_str!("../migrations/001_settings.sql"),
)];

/// Run all pending migrations, returning how many were applied
pub fn run_migrations(conn: &Connection) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let applied = applied_migrations(conn)?;
    let mut applied_count = 0;

    for (name, sql) in MIGRATIONS {
        if applied.iter().any(|a| a == name) {
            debug!("Migration already applied: {}", name);
            continue;
        }

        info!("Applying migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
        applied_count += 1;
    }

    if applied_count > 0 {
        info!("Applied {} new migration(s)", applied_count);
    } else {
        debug!("Database schema is up to date");
    }

    Ok(applied_count)
}

/// Names of applied migrations in application order
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT name FROM _migrations ORDER BY id")?;
    stmt.query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()
}
