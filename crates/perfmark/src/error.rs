//! Error types for the measurement engine.

use thiserror::Error;

/// Errors that can occur while recording or aggregating measurements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerfError {
    /// A measurement referenced a start mark that is not in the registry.
    ///
    /// The mark was either never recorded or already removed when a previous
    /// batch finalized; the registry does not distinguish the two.
    #[error("unknown start mark: {id}")]
    UnknownMark {
        /// The correlation id that failed to resolve
        id: String,
    },

    /// A second terminal measurement arrived before the current batch was
    /// cleared. The first aggregate stands; this one is rejected.
    #[error("ambiguous batch result: {name} arrived after the batch already finalized")]
    AmbiguousResult {
        /// Name of the rejected terminal measurement
        name: String,
    },
}

/// Result type for measurement operations.
pub type PerfResult<T> = Result<T, PerfError>;
