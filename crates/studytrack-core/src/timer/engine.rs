//! Timer engine implementation.
//!
//! The engine is a count-up state machine with no internal clock - it is
//! owned by the timer service, which calls `tick()` once per elapsed second
//! while a session is running.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |           |
//!            +- cancel --+-> Idle (elapsed zeroed)
//! ```
//!
//! Commands that are invalid in the current state are defined no-ops and
//! return `None` rather than an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Minimum recordable session length in whole seconds.
///
/// The engine exposes the threshold but does not enforce it: the caller
/// checks it, together with a subject association, before saving a session.
pub const MIN_SESSION_SECS: u64 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Commands accepted by the timer, validated against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerCommand {
    /// Begin ticking from `Idle`, or resume from `Paused`.
    Start,
    /// Pause ticking, preserving the elapsed time.
    Stop,
    /// Stop ticking if active, zero the elapsed time, clear the status
    /// surface.
    Cancel,
}

/// Zero-padded clock components derived from the elapsed time.
///
/// A pure function of the elapsed seconds; recomputed on every tick and on
/// every state transition, never mutated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl TimeParts {
    pub fn from_secs(total_secs: u64) -> Self {
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;
        Self {
            hours: format!("{hours:02}"),
            minutes: format!("{minutes:02}"),
            seconds: format!("{seconds:02}"),
        }
    }

    /// `HH:MM:SS`, the form pushed to the status surface.
    pub fn to_clock(&self) -> String {
        format!("{}:{}:{}", self.hours, self.minutes, self.seconds)
    }
}

/// Point-in-time view of the engine published to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_secs: u64,
    pub display: TimeParts,
    pub at: DateTime<Utc>,
}

impl TimerSnapshot {
    /// Whether the elapsed time passes the minimum-duration half of the
    /// commit gate. The caller still has to pair this with a selected
    /// subject before saving.
    pub fn meets_minimum_duration(&self) -> bool {
        self.elapsed_secs >= MIN_SESSION_SECS
    }
}

/// Core timer state machine.
///
/// Single-writer: only the owning service mutates it, and `elapsed_secs`
/// only advances through `tick()` while `Running`. The only path back to
/// zero is cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    state: TimerState,
    elapsed_secs: u64,
    display: TimeParts,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            elapsed_secs: 0,
            display: TimeParts::from_secs(0),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn display(&self) -> &TimeParts {
        &self.display
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            elapsed_secs: self.elapsed_secs,
            display: self.display.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Dispatch a command against the transition table.
    pub fn apply(&mut self, command: TimerCommand) -> Option<Event> {
        match command {
            TimerCommand::Start => self.start(),
            TimerCommand::Stop => self.stop(),
            TimerCommand::Cancel => self.cancel(),
        }
    }

    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                self.refresh_display();
                Some(Event::TimerStarted {
                    elapsed_secs: self.elapsed_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Running => None, // Already running.
        }
    }

    pub fn stop(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                self.refresh_display();
                Some(Event::TimerPaused {
                    elapsed_secs: self.elapsed_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running | TimerState::Paused => {
                self.state = TimerState::Idle;
                self.elapsed_secs = 0;
                self.refresh_display();
                Some(Event::TimerCancelled { at: Utc::now() })
            }
            TimerState::Idle => None,
        }
    }

    /// Advance the elapsed time by one second. The owning service calls
    /// this on each firing of the 1-second tick loop; outside `Running` it
    /// is a no-op.
    pub fn tick(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.elapsed_secs += 1;
                self.refresh_display();
                Some(Event::Tick {
                    elapsed_secs: self.elapsed_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn refresh_display(&mut self) {
        self.display = TimeParts::from_secs(self.elapsed_secs);
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_stop_resume() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start().is_some());
        assert_eq!(engine.state(), TimerState::Running);

        assert!(engine.stop().is_some());
        assert_eq!(engine.state(), TimerState::Paused);

        assert!(engine.start().is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn tick_advances_only_while_running() {
        let mut engine = TimerEngine::new();
        assert!(engine.tick().is_none());
        assert_eq!(engine.elapsed_secs(), 0);

        engine.start();
        engine.tick();
        engine.tick();
        assert_eq!(engine.elapsed_secs(), 2);

        engine.stop();
        assert!(engine.tick().is_none());
        assert_eq!(engine.elapsed_secs(), 2);
    }

    #[test]
    fn stop_preserves_elapsed_across_resume() {
        let mut engine = TimerEngine::new();
        engine.start();
        for _ in 0..5 {
            engine.tick();
        }
        engine.stop();
        engine.start();
        for _ in 0..5 {
            engine.tick();
        }
        assert_eq!(engine.elapsed_secs(), 10);
    }

    #[test]
    fn cancel_zeroes_from_running_and_paused() {
        let mut engine = TimerEngine::new();
        engine.start();
        engine.tick();
        assert!(engine.cancel().is_some());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.elapsed_secs(), 0);

        engine.start();
        engine.tick();
        engine.stop();
        assert!(engine.cancel().is_some());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.elapsed_secs(), 0);
    }

    #[test]
    fn invalid_commands_are_noops() {
        let mut engine = TimerEngine::new();
        assert!(engine.stop().is_none());
        assert!(engine.cancel().is_none());
        assert_eq!(engine.state(), TimerState::Idle);

        engine.start();
        assert!(engine.start().is_none());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn display_tracks_elapsed() {
        let mut engine = TimerEngine::new();
        engine.start();
        for _ in 0..3725 {
            engine.tick();
        }
        let display = engine.display();
        assert_eq!(display.hours, "01");
        assert_eq!(display.minutes, "02");
        assert_eq!(display.seconds, "05");
        assert_eq!(display.to_clock(), "01:02:05");

        engine.cancel();
        assert_eq!(engine.display().to_clock(), "00:00:00");
    }

    #[test]
    fn time_parts_zero_pad() {
        assert_eq!(TimeParts::from_secs(0).to_clock(), "00:00:00");
        assert_eq!(TimeParts::from_secs(59).to_clock(), "00:00:59");
        assert_eq!(TimeParts::from_secs(60).to_clock(), "00:01:00");
        assert_eq!(TimeParts::from_secs(36_000).to_clock(), "10:00:00");
    }

    #[test]
    fn minimum_duration_boundary() {
        let mut engine = TimerEngine::new();
        engine.start();
        for _ in 0..35 {
            engine.tick();
        }
        assert!(!engine.snapshot().meets_minimum_duration());
        engine.tick();
        assert!(engine.snapshot().meets_minimum_duration());
    }
}
