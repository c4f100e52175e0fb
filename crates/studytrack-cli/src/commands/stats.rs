//! Study statistics commands.

use std::error::Error;

use clap::Subcommand;
use serde_json::json;
use studytrack_core::{Database, ValidationError};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals across all subjects and sessions
    Overview,
    /// Studied time against the goal for one subject
    Subject {
        /// Subject name
        name: String,
    },
    /// Recently recorded sessions
    Recent {
        #[arg(long, default_value = "5")]
        limit: u32,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Overview => {
            let stats = db.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Subject { name } => {
            let subject = db.get_subject_by_name(&name)?.ok_or_else(|| {
                ValidationError::NotFound {
                    entity: "subject",
                    id: name,
                }
            })?;

            let studied_secs = db.total_duration_for_subject(&subject.id)?;
            let studied_hours = studied_secs as f64 / 3600.0;
            let tasks = db.tasks_for_subject(&subject.id)?;
            let completed = tasks.iter().filter(|t| t.is_complete).count();
            let progress_pct = if subject.goal_hours > 0.0 {
                (studied_hours / subject.goal_hours * 100.0).min(100.0)
            } else {
                0.0
            };

            let report = json!({
                "subject": subject,
                "studied_hours": studied_hours,
                "goal_hours": subject.goal_hours,
                "progress_pct": progress_pct,
                "tasks_total": tasks.len(),
                "tasks_completed": completed,
                "recent_sessions": db.recent_sessions_for_subject(&subject.id, 10)?,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Recent { limit } => {
            let sessions = db.recent_sessions(limit)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }

    Ok(())
}
