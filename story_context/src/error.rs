//! Error types for the context engine.

use story_bible::{ProjectId, RecordError};
use thiserror::Error;

use crate::chain::ContextLevel;

/// Errors raised by the persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Project store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored record for project {project} is unreadable: {source}")]
    Corrupt {
        project: ProjectId,
        #[source]
        source: RecordError,
    },

    #[error("Project store error: {0}")]
    Other(String),
}

/// Errors surfaced by the context engine.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Cannot build {requested} context: {missing} context has not been built")]
    PrecursorMissing {
        requested: ContextLevel,
        missing: ContextLevel,
    },

    #[error("Unit '{0}' is not part of the active structure")]
    UnknownUnit(String),

    #[error("Invalid target level: {0} (must be 1-5)")]
    InvalidLevel(u8),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for ContextError {
    fn from(err: toml::de::Error) -> Self {
        ContextError::Config(err.to_string())
    }
}
