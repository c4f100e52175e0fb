//! Terminal status surface.
//!
//! Mirrors the running timer as a single stderr line rewritten in place -
//! this front end's stand-in for a persistent notification.

use std::io::{self, Write};

use studytrack_core::{StatusError, StatusSurface};

#[derive(Debug, Default)]
pub struct TerminalStatus;

impl StatusSurface for TerminalStatus {
    fn update(&self, text: &str) -> Result<(), StatusError> {
        let mut err = io::stderr();
        write!(err, "\r  {text} ")
            .and_then(|()| err.flush())
            .map_err(|e| StatusError(e.to_string()))
    }

    fn clear(&self) -> Result<(), StatusError> {
        let mut err = io::stderr();
        write!(err, "\r\x1b[2K")
            .and_then(|()| err.flush())
            .map_err(|e| StatusError(e.to_string()))
    }
}
