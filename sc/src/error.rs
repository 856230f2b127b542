//! Workshop error types

use std::io;
use thiserror::Error;

/// Errors raised by the synchronization primitives and the actors built on them
#[derive(Debug, Error)]
pub enum WorkshopError {
    /// A gate was closed by cleanup while an actor was using it
    #[error("Workshop closed")]
    Closed,

    #[error("Cannot take from an empty pool")]
    EmptyPool,

    /// A protocol invariant was broken; never retried
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Resource allocation or configuration failed before any actor started
    #[error("Workshop setup failed: {0}")]
    Setup(String),

    #[error("Failed to spawn actor thread: {0}")]
    Spawn(#[from] io::Error),
}

impl WorkshopError {
    /// Shorthand for building an invariant violation
    pub fn invariant(message: impl Into<String>) -> Self {
        WorkshopError::Invariant(message.into())
    }

    /// Check if this error means the workshop was shut down underneath the caller
    pub fn is_closed(&self) -> bool {
        matches!(self, WorkshopError::Closed)
    }

    /// Check if this error must abort the process
    pub fn is_fatal(&self) -> bool {
        match self {
            WorkshopError::Closed => false,
            WorkshopError::EmptyPool => true,
            WorkshopError::Invariant(_) => true,
            WorkshopError::Setup(_) => true,
            WorkshopError::Spawn(_) => true,
        }
    }
}
