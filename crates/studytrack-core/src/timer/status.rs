//! Status surface boundary.
//!
//! The status surface is the external always-visible indicator that mirrors
//! the latest formatted elapsed time - a notification area, a terminal
//! line. Pushes are best-effort: the service logs failures and drops them,
//! they never affect timer state.

use thiserror::Error;

/// A status push the surface could not apply.
#[derive(Debug, Error)]
#[error("status surface push failed: {0}")]
pub struct StatusError(pub String);

pub trait StatusSurface: Send + Sync {
    /// Mirror the latest formatted elapsed time (`HH:MM:SS`).
    fn update(&self, text: &str) -> Result<(), StatusError>;

    /// Remove the indicator.
    fn clear(&self) -> Result<(), StatusError>;
}

/// Surface that drops every push. Used headless and in tests.
#[derive(Debug, Default)]
pub struct NoStatus;

impl StatusSurface for NoStatus {
    fn update(&self, _text: &str) -> Result<(), StatusError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StatusError> {
        Ok(())
    }
}
