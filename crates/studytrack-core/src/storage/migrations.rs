//! Database schema migrations.
//!
//! Migrations are versioned and applied automatically when opening the
//! database; the `schema_version` table tracks the current version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);
    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 for a fresh database with no version row.
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// v1: subjects, tasks, and sessions tables.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS subjects (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            goal_hours  REAL NOT NULL,
            colors      TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id          TEXT PRIMARY KEY,
            subject_id  TEXT NOT NULL,
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            due_date    TEXT,
            priority    INTEGER NOT NULL DEFAULT 1,
            related_to_subject TEXT NOT NULL DEFAULT '',
            is_complete INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id  TEXT NOT NULL,
            related_to_subject TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            duration_secs INTEGER NOT NULL
        );",
    )?;
    set_schema_version(conn, 1)
}

/// v2: indexes for the listing and aggregate queries.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_sessions_recorded_at ON sessions(recorded_at);
        CREATE INDEX IF NOT EXISTS idx_sessions_subject_id ON sessions(subject_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_subject_id ON tasks(subject_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_is_complete_due ON tasks(is_complete, due_date);",
    )?;
    set_schema_version(conn, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
    }
}
