//! Error types for the simulation layer

use crate::config::ConfigError;
use thiserror::Error;

/// Errors surfaced by simulation orchestration.
///
/// The coordination protocol itself has no error path: lock construction is
/// infallible and acquisition is blocking. Protocol misuse (an exit without
/// a matching enter) panics rather than producing one of these variants.
#[derive(Debug, Error)]
pub enum SimError {
    /// The platform refused to create a task thread. Recoverable: the
    /// caller may retry with fewer tasks. Threads spawned before the
    /// failure have already been joined.
    #[error("failed to spawn {role} thread {index}: {source}")]
    Spawn {
        /// Task role, `"reader"` or `"writer"`.
        role: &'static str,
        /// Index of the task that could not be spawned.
        index: usize,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid simulation configuration.
    #[error("configuration error: {source}")]
    Config {
        /// Underlying configuration error.
        #[from]
        source: ConfigError,
    },
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
