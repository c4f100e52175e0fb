use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every accepted timer transition and every tick produces an Event.
/// The service logs them and mirrors them onto the status surface; front
/// ends can print them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Ticking began, either fresh from idle or resuming a paused session.
    TimerStarted {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// Ticking paused; the elapsed time is preserved.
    TimerPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session was cancelled and the elapsed time zeroed.
    TimerCancelled {
        at: DateTime<Utc>,
    },
    /// One second of running time accumulated.
    Tick {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "started",
            Event::TimerPaused { .. } => "paused",
            Event::TimerCancelled { .. } => "cancelled",
            Event::Tick { .. } => "tick",
        }
    }
}
