//! Subject management commands.

use std::error::Error;

use clap::Subcommand;
use studytrack_core::{Config, Database, Subject};

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a subject
    Add {
        /// Subject name
        name: String,
        /// Goal in study hours (defaults to the configured value)
        #[arg(long)]
        goal_hours: Option<f64>,
    },
    /// List subjects
    List,
    /// Show one subject
    Get {
        /// Subject name
        name: String,
    },
    /// Update a subject
    Update {
        /// Subject name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        /// New goal in study hours
        #[arg(long)]
        goal_hours: Option<f64>,
    },
    /// Delete a subject along with its tasks and recorded sessions
    Delete {
        /// Subject name
        name: String,
    },
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn Error>> {
    let mut db = Database::open()?;

    match action {
        SubjectAction::Add { name, goal_hours } => {
            let config = Config::load();
            let goal = goal_hours.unwrap_or(config.study.default_goal_hours);
            let colors = Subject::palette(db.subject_count()? as usize);
            let subject = Subject::new(name, goal, colors);
            db.upsert_subject(&subject)?;
            println!("Subject created: {}", subject.id);
            println!("{}", serde_json::to_string_pretty(&subject)?);
        }
        SubjectAction::List => {
            let subjects = db.list_subjects()?;
            println!("{}", serde_json::to_string_pretty(&subjects)?);
        }
        SubjectAction::Get { name } => match db.get_subject_by_name(&name)? {
            Some(subject) => println!("{}", serde_json::to_string_pretty(&subject)?),
            None => println!("Subject not found: {name}"),
        },
        SubjectAction::Update {
            name,
            rename,
            goal_hours,
        } => match db.get_subject_by_name(&name)? {
            Some(mut subject) => {
                if let Some(rename) = rename {
                    subject.name = rename;
                }
                if let Some(goal) = goal_hours {
                    subject.goal_hours = goal;
                }
                db.upsert_subject(&subject)?;
                println!("{}", serde_json::to_string_pretty(&subject)?);
            }
            None => println!("Subject not found: {name}"),
        },
        SubjectAction::Delete { name } => match db.get_subject_by_name(&name)? {
            Some(subject) => {
                db.delete_subject(&subject.id)?;
                println!("Subject deleted: {}", subject.name);
            }
            None => println!("Subject not found: {name}"),
        },
    }

    Ok(())
}
