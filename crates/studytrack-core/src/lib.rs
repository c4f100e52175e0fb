//! # StudyTrack Core Library
//!
//! Core business logic for StudyTrack, a personal study tracker built
//! around a background session timer. The CLI binary is a thin front end
//! over this library.
//!
//! ## Architecture
//!
//! - **Timer engine**: a count-up state machine (idle / running / paused)
//!   owned exclusively by an async service task; the service runs the
//!   1-second tick loop, serializes commands, publishes snapshots to any
//!   number of observers, and mirrors the formatted elapsed time onto a
//!   pluggable status surface
//! - **Storage**: SQLite persistence for subjects, tasks, and recorded
//!   sessions, plus TOML-based configuration
//! - **Study domain**: subjects with goal hours, prioritized tasks, and
//!   the recorded sessions that count toward the goals
//!
//! ## Key components
//!
//! - [`TimerService`] / [`TimerHandle`]: the session timer and its
//!   control/observation channel
//! - [`TimerEngine`]: the underlying state machine
//! - [`StatusSurface`]: boundary to the always-visible elapsed-time mirror
//! - [`Database`]: subjects, tasks, sessions, and statistics
//! - [`Config`]: application configuration

pub mod error;
pub mod events;
pub mod storage;
pub mod study;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, Stats};
pub use study::{Priority, Session, Subject, Task};
pub use timer::{
    NoStatus, ServiceError, StatusError, StatusSurface, TimeParts, TimerCommand, TimerEngine,
    TimerHandle, TimerService, TimerSnapshot, TimerState, MIN_SESSION_SECS,
};
