//! Error types for secant operations.

use thiserror::Error;

/// Errors that can occur while configuring or running a parse.
#[derive(Error, Debug)]
pub enum Error {
    #[error("document contains no top-level tags")]
    EmptyDocument,

    #[error("step {0} has already processed a document; construct a fresh instance per parse")]
    StepReused(String),

    #[error("step filter lists {0} as both processed and excluded")]
    FilterOverlap(String),

    #[error("composite element requires at least one inner element")]
    EmptyComposite,

    #[error("bulletpoint level must be at least 1, got {0}")]
    BulletpointLevel(u32),

    #[error("{step}: {message}")]
    Step { step: String, message: String },
}

impl Error {
    /// Per-element failure inside a processing step. These are caught by the
    /// pipeline driver and surfaced as Error elements, never as an aborted
    /// batch.
    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Step {
            step: step.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
