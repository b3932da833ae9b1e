//! Error types for the registry.

use crate::types::{IsolateId, SuiteId};
use thiserror::Error;

/// Main error type for registry operations.
///
/// Everything that is not listed here (missing entries, double unsubscribe,
/// double termination) is a no-op rather than an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Listener capacity exceeded for store {suite}/{name}: limit is {limit} isolates")]
    ListenerCapacity {
        suite: SuiteId,
        name: String,
        limit: usize,
    },

    #[error("Backlog counter table is full ({limit} isolates), cannot track {isolate}")]
    BacklogCapacity { isolate: IsolateId, limit: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
