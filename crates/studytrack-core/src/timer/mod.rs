mod engine;
mod service;
mod status;

pub use engine::{
    TimeParts, TimerCommand, TimerEngine, TimerSnapshot, TimerState, MIN_SESSION_SECS,
};
pub use service::{ServiceError, TimerHandle, TimerService};
pub use status::{NoStatus, StatusError, StatusSurface};
