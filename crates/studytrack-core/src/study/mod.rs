//! Domain types for subjects, tasks, and recorded study sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Card color palettes, cycled through as subjects are created.
pub const SUBJECT_PALETTES: [[&str; 2]; 5] = [
    ["#6C63FF", "#9D97FF"],
    ["#FF6584", "#FF9BB0"],
    ["#00B8A9", "#6FE0D6"],
    ["#F8A70D", "#FBCA6E"],
    ["#3E8EF7", "#8BBDFA"],
];

/// A subject being studied, with a weekly goal in hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub goal_hours: f64,
    /// Gradient pair used by front ends to render the subject card.
    pub colors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: impl Into<String>, goal_hours: f64, colors: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            goal_hours,
            colors,
            created_at: Utc::now(),
        }
    }

    /// Palette assigned to the nth subject created.
    pub fn palette(index: usize) -> Vec<String> {
        SUBJECT_PALETTES[index % SUBJECT_PALETTES.len()]
            .iter()
            .map(|c| (*c).to_string())
            .collect()
    }
}

/// Priority of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn value(self) -> i64 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    /// Unknown stored values fall back to `Medium`.
    pub fn from_value(value: i64) -> Self {
        match value {
            0 => Priority::Low,
            2 => Priority::High,
            _ => Priority::Medium,
        }
    }
}

/// A task attached to a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    /// Denormalized subject name, kept so task listings render without a
    /// join.
    pub related_to_subject: String,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(subject: &Subject, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject.id.clone(),
            title: title.into(),
            description: String::new(),
            due_date: None,
            priority: Priority::default(),
            related_to_subject: subject.name.clone(),
            is_complete: false,
            created_at: Utc::now(),
        }
    }
}

/// A recorded study session. Created only after the commit gate passed;
/// the id is assigned by the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub subject_id: String,
    pub related_to_subject: String,
    pub recorded_at: DateTime<Utc>,
    pub duration_secs: u64,
}

impl Session {
    pub fn hours(&self) -> f64 {
        self.duration_secs as f64 / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_value_round_trip() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(Priority::from_value(priority.value()), priority);
        }
        // Out-of-range stored values degrade to the default.
        assert_eq!(Priority::from_value(42), Priority::Medium);
    }

    #[test]
    fn priority_orders_low_to_high() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn palettes_cycle() {
        assert_eq!(Subject::palette(0), Subject::palette(SUBJECT_PALETTES.len()));
        assert_ne!(Subject::palette(0), Subject::palette(1));
    }

    #[test]
    fn task_inherits_subject_link() {
        let subject = Subject::new("Mathematics", 8.0, Subject::palette(0));
        let task = Task::new(&subject, "Integrals worksheet");
        assert_eq!(task.subject_id, subject.id);
        assert_eq!(task.related_to_subject, "Mathematics");
        assert!(!task.is_complete);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn task_serialization() {
        let subject = Subject::new("History", 4.5, Subject::palette(1));
        let task = Task::new(&subject, "Read chapter 3");
        let json = serde_json::to_string(&task).unwrap();
        let decoded: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, task.id);
        assert_eq!(decoded.priority, Priority::Medium);
    }

    #[test]
    fn session_hours() {
        let session = Session {
            id: 1,
            subject_id: "s".into(),
            related_to_subject: "Physics".into(),
            recorded_at: Utc::now(),
            duration_secs: 5400,
        };
        assert!((session.hours() - 1.5).abs() < f64::EPSILON);
    }
}
