//! Task management commands.

use std::error::Error;

use chrono::NaiveDate;
use clap::Subcommand;
use studytrack_core::{Database, Priority, Task, ValidationError};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a subject
    Add {
        /// Subject the task belongs to
        subject: String,
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Priority: low, medium, or high (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// List tasks for a subject
    List {
        /// Subject name
        subject: String,
    },
    /// Incomplete tasks across all subjects, soonest due first
    Upcoming,
    /// Show one task
    Get {
        /// Task id
        id: String,
    },
    /// Mark a task complete
    Complete {
        /// Task id
        id: String,
    },
    /// Reopen a completed task
    Reopen {
        /// Task id
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn Error>> {
    let db = Database::open()?;

    match action {
        TaskAction::Add {
            subject,
            title,
            description,
            due,
            priority,
        } => {
            let subject = db.get_subject_by_name(&subject)?.ok_or_else(|| {
                ValidationError::NotFound {
                    entity: "subject",
                    id: subject,
                }
            })?;

            let mut task = Task::new(&subject, title);
            task.description = description.unwrap_or_default();
            task.priority = parse_priority(&priority)?;
            task.due_date = match due {
                Some(raw) => Some(parse_due_date(&raw)?),
                None => None,
            };
            db.upsert_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { subject } => {
            let subject = db.get_subject_by_name(&subject)?.ok_or_else(|| {
                ValidationError::NotFound {
                    entity: "subject",
                    id: subject,
                }
            })?;
            let tasks = db.tasks_for_subject(&subject.id)?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Upcoming => {
            let tasks = db.upcoming_tasks()?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Get { id } => match db.get_task(&id)? {
            Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
            None => println!("Task not found: {id}"),
        },
        TaskAction::Complete { id } => set_completion(&db, &id, true)?,
        TaskAction::Reopen { id } => set_completion(&db, &id, false)?,
        TaskAction::Delete { id } => {
            if db.delete_task(&id)? {
                println!("Task deleted: {id}");
            } else {
                println!("Task not found: {id}");
            }
        }
    }

    Ok(())
}

fn set_completion(db: &Database, id: &str, is_complete: bool) -> Result<(), Box<dyn Error>> {
    match db.get_task(id)? {
        Some(mut task) => {
            task.is_complete = is_complete;
            db.upsert_task(&task)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        None => println!("Task not found: {id}"),
    }
    Ok(())
}

fn parse_priority(raw: &str) -> Result<Priority, Box<dyn Error>> {
    match raw.to_ascii_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        _ => Err(ValidationError::InvalidValue {
            field: "priority".to_string(),
            message: format!("expected low, medium, or high, got '{raw}'"),
        }
        .into()),
    }
}

fn parse_due_date(raw: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidValue {
            field: "due".to_string(),
            message: format!("expected YYYY-MM-DD, got '{raw}'"),
        }
        .into()
    })
}
