//! SQLite-based storage for subjects, tasks, and recorded study sessions.
//!
//! Provides persistent storage plus the aggregate queries behind the
//! statistics commands. The schema is created and upgraded through
//! [`super::migrations`] when the database is opened.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError};
use crate::study::{Priority, Session, Subject, Task};

/// Dashboard-style aggregates over the whole database.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_subjects: u64,
    pub total_goal_hours: f64,
    pub total_studied_hours: f64,
    pub total_sessions: u64,
}

/// SQLite database handle.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database in the data directory, creating and migrating the
    /// schema as needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("studytrack.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path,
            source,
        })?;
        Ok(Self::from_connection(conn)?)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Subjects ─────────────────────────────────────────────────────

    /// Insert or replace a subject by id.
    pub fn upsert_subject(&self, subject: &Subject) -> Result<(), DatabaseError> {
        let colors = serde_json::to_string(&subject.colors)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO subjects (id, name, goal_hours, colors, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                subject.id,
                subject.name,
                subject.goal_hours,
                colors,
                subject.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_subject(&self, id: &str) -> Result<Option<Subject>, DatabaseError> {
        let subject = self
            .conn
            .query_row(
                "SELECT id, name, goal_hours, colors, created_at
                 FROM subjects WHERE id = ?1",
                params![id],
                row_to_subject,
            )
            .optional()?;
        Ok(subject)
    }

    /// Case-insensitive lookup by name, for front ends that let the user
    /// refer to subjects by what they typed in.
    pub fn get_subject_by_name(&self, name: &str) -> Result<Option<Subject>, DatabaseError> {
        let subject = self
            .conn
            .query_row(
                "SELECT id, name, goal_hours, colors, created_at
                 FROM subjects WHERE name = ?1 COLLATE NOCASE LIMIT 1",
                params![name],
                row_to_subject,
            )
            .optional()?;
        Ok(subject)
    }

    pub fn list_subjects(&self) -> Result<Vec<Subject>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, goal_hours, colors, created_at
             FROM subjects ORDER BY created_at",
        )?;
        let subjects = stmt
            .query_map([], row_to_subject)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(subjects)
    }

    /// Delete a subject along with its tasks and sessions.
    pub fn delete_subject(&mut self, id: &str) -> Result<bool, DatabaseError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM tasks WHERE subject_id = ?1", params![id])?;
        tx.execute("DELETE FROM sessions WHERE subject_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM subjects WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    pub fn subject_count(&self) -> Result<u64, DatabaseError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM subjects", [], |row| {
                row.get::<_, u64>(0)
            })?;
        Ok(count)
    }

    pub fn total_goal_hours(&self) -> Result<f64, DatabaseError> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(goal_hours), 0) FROM subjects",
            [],
            |row| row.get::<_, f64>(0),
        )?;
        Ok(total)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Insert or replace a task by id.
    pub fn upsert_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tasks
             (id, subject_id, title, description, due_date, priority,
              related_to_subject, is_complete, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.id,
                task.subject_id,
                task.title,
                task.description,
                task.due_date.map(|d| d.to_string()),
                task.priority.value(),
                task.related_to_subject,
                task.is_complete,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let task = self
            .conn
            .query_row(
                "SELECT id, subject_id, title, description, due_date, priority,
                        related_to_subject, is_complete, created_at
                 FROM tasks WHERE id = ?1",
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    pub fn delete_task(&self, id: &str) -> Result<bool, DatabaseError> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    pub fn tasks_for_subject(&self, subject_id: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, title, description, due_date, priority,
                    related_to_subject, is_complete, created_at
             FROM tasks WHERE subject_id = ?1
             ORDER BY is_complete, due_date IS NULL, due_date, priority DESC",
        )?;
        let tasks = stmt
            .query_map(params![subject_id], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Incomplete tasks across all subjects, soonest due date first,
    /// higher priority breaking ties; undated tasks sort last.
    pub fn upcoming_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, title, description, due_date, priority,
                    related_to_subject, is_complete, created_at
             FROM tasks WHERE is_complete = 0
             ORDER BY due_date IS NULL, due_date, priority DESC",
        )?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Record a study session, returning its id.
    pub fn record_session(
        &self,
        subject_id: &str,
        related_to_subject: &str,
        duration_secs: u64,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (subject_id, related_to_subject, recorded_at, duration_secs)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                subject_id,
                related_to_subject,
                recorded_at.to_rfc3339(),
                duration_secs,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_session(&self, id: i64) -> Result<bool, DatabaseError> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Most recent sessions, newest first.
    pub fn recent_sessions(&self, limit: u32) -> Result<Vec<Session>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, related_to_subject, recorded_at, duration_secs
             FROM sessions ORDER BY recorded_at DESC LIMIT ?1",
        )?;
        let sessions = stmt
            .query_map(params![limit], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    pub fn recent_sessions_for_subject(
        &self,
        subject_id: &str,
        limit: u32,
    ) -> Result<Vec<Session>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, related_to_subject, recorded_at, duration_secs
             FROM sessions WHERE subject_id = ?1
             ORDER BY recorded_at DESC LIMIT ?2",
        )?;
        let sessions = stmt
            .query_map(params![subject_id, limit], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    /// Total recorded time across all sessions, in seconds.
    pub fn total_session_duration(&self) -> Result<u64, DatabaseError> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_secs), 0) FROM sessions",
            [],
            |row| row.get::<_, u64>(0),
        )?;
        Ok(total)
    }

    pub fn total_duration_for_subject(&self, subject_id: &str) -> Result<u64, DatabaseError> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_secs), 0) FROM sessions WHERE subject_id = ?1",
            params![subject_id],
            |row| row.get::<_, u64>(0),
        )?;
        Ok(total)
    }

    // ── Aggregates ───────────────────────────────────────────────────

    pub fn stats(&self) -> Result<Stats, DatabaseError> {
        let total_sessions = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| {
                row.get::<_, u64>(0)
            })?;
        Ok(Stats {
            total_subjects: self.subject_count()?,
            total_goal_hours: self.total_goal_hours()?,
            total_studied_hours: self.total_session_duration()? as f64 / 3600.0,
            total_sessions,
        })
    }
}

// ── Row mapping ──────────────────────────────────────────────────────

fn row_to_subject(row: &Row) -> Result<Subject, rusqlite::Error> {
    let colors_raw: String = row.get(3)?;
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        goal_hours: row.get(2)?,
        colors: serde_json::from_str(&colors_raw).unwrap_or_default(),
        created_at: parse_datetime_fallback(&row.get::<_, String>(4)?),
    })
}

fn row_to_task(row: &Row) -> Result<Task, rusqlite::Error> {
    let due_date: Option<String> = row.get(4)?;
    Ok(Task {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        due_date: due_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        priority: Priority::from_value(row.get(5)?),
        related_to_subject: row.get(6)?,
        is_complete: row.get(7)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(8)?),
    })
}

fn row_to_session(row: &Row) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        related_to_subject: row.get(2)?,
        recorded_at: parse_datetime_fallback(&row.get::<_, String>(3)?),
        duration_secs: row.get(4)?,
    })
}

fn parse_datetime_fallback(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
