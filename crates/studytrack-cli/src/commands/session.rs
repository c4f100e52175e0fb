//! Study session tracking and the recorded-session commands.
//!
//! `session run` spawns the timer service, starts it, and waits for the
//! user to finish (Ctrl-C, or `--finish-after` for unattended runs). The
//! commit gate lives here, on the caller side: the timer is first stopped,
//! the last published snapshot is checked against the minimum duration and
//! the selected subject, and only a confirmed save cancels the timer. A
//! failed save leaves the session paused instead of silently discarding it.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use studytrack_core::{
    Config, Database, NoStatus, StatusSurface, Subject, TimerCommand, TimerService,
    TimerSnapshot, ValidationError, MIN_SESSION_SECS,
};

use crate::status::TerminalStatus;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Track a study session with a live timer
    Run {
        /// Subject to record the session against
        #[arg(long)]
        subject: Option<String>,
        /// Finish automatically after this many seconds instead of Ctrl-C
        #[arg(long)]
        finish_after: Option<u64>,
    },
    /// List recorded sessions, newest first
    List {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Delete a recorded session
    Delete {
        /// Session id
        id: i64,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn Error>> {
    match action {
        SessionAction::Run {
            subject,
            finish_after,
        } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(track(subject, finish_after))
        }
        SessionAction::List { limit } => {
            let db = Database::open()?;
            let sessions = db.recent_sessions(limit)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
            Ok(())
        }
        SessionAction::Delete { id } => {
            let db = Database::open()?;
            if db.delete_session(id)? {
                println!("Session deleted: {id}");
            } else {
                println!("Session not found: {id}");
            }
            Ok(())
        }
    }
}

async fn track(subject: Option<String>, finish_after: Option<u64>) -> Result<(), Box<dyn Error>> {
    let config = Config::load();
    let db = Database::open()?;

    let subject = match subject {
        Some(name) => Some(db.get_subject_by_name(&name)?.ok_or_else(|| {
            ValidationError::NotFound {
                entity: "subject",
                id: name,
            }
        })?),
        None => None,
    };

    let status: Arc<dyn StatusSurface> = if config.notifications.enabled {
        Arc::new(TerminalStatus)
    } else {
        Arc::new(NoStatus)
    };
    let handle = TimerService::spawn(status);

    handle.apply(TimerCommand::Start).await?;
    match &subject {
        Some(s) => println!("Studying {} - press Ctrl-C to finish.", s.name),
        None => println!("Timer started - press Ctrl-C to finish."),
    }

    wait_for_finish(finish_after).await?;

    // Freeze the timer before deciding anything; elapsed stays intact.
    let snapshot = handle.apply(TimerCommand::Stop).await?;

    match save_session(&db, subject.as_ref(), &snapshot) {
        Ok(message) => {
            handle.apply(TimerCommand::Cancel).await?;
            println!("{message}");
            Ok(())
        }
        Err(e) => {
            // The session stays paused; the reset only follows a
            // confirmed save.
            eprintln!();
            Err(e)
        }
    }
}

async fn wait_for_finish(finish_after: Option<u64>) -> std::io::Result<()> {
    match finish_after {
        Some(secs) => {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            Ok(())
        }
        None => tokio::signal::ctrl_c().await,
    }
}

/// Caller-side commit gate and save. Returns the confirmation message.
fn save_session(
    db: &Database,
    subject: Option<&Subject>,
    snapshot: &TimerSnapshot,
) -> Result<String, Box<dyn Error>> {
    if !snapshot.meets_minimum_duration() {
        return Err(format!(
            "A session shorter than {MIN_SESSION_SECS} seconds is not recorded (this one ran {})",
            snapshot.display.to_clock()
        )
        .into());
    }
    let subject = subject.ok_or("Select a subject to record the session against (--subject)")?;

    db.record_session(&subject.id, &subject.name, snapshot.elapsed_secs, Utc::now())?;
    Ok(format!(
        "Session saved: {} on {}",
        snapshot.display.to_clock(),
        subject.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use studytrack_core::TimerEngine;

    fn snapshot_after(ticks: u64) -> TimerSnapshot {
        let mut engine = TimerEngine::new();
        engine.start();
        for _ in 0..ticks {
            engine.tick();
        }
        engine.stop();
        engine.snapshot()
    }

    fn subject_in(db: &Database) -> Subject {
        let subject = Subject::new("Algebra", 5.0, Subject::palette(0));
        db.upsert_subject(&subject).unwrap();
        subject
    }

    #[test]
    fn save_rejects_short_sessions() {
        let db = Database::open_memory().unwrap();
        let subject = subject_in(&db);

        let err = save_session(&db, Some(&subject), &snapshot_after(35)).unwrap_err();
        assert!(err.to_string().contains("not recorded"));
        assert_eq!(db.total_session_duration().unwrap(), 0);
    }

    #[test]
    fn save_rejects_missing_subject() {
        let db = Database::open_memory().unwrap();

        let err = save_session(&db, None, &snapshot_after(120)).unwrap_err();
        assert!(err.to_string().contains("subject"));
        assert_eq!(db.total_session_duration().unwrap(), 0);
    }

    #[test]
    fn save_records_at_the_gate_boundary() {
        let db = Database::open_memory().unwrap();
        let subject = subject_in(&db);

        let message = save_session(&db, Some(&subject), &snapshot_after(36)).unwrap();
        assert!(message.contains("00:00:36"));
        assert!(message.contains("Algebra"));
        assert_eq!(db.total_session_duration().unwrap(), 36);

        let sessions = db.recent_sessions(5).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].related_to_subject, "Algebra");
    }
}
