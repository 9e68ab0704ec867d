//! Metrics error types.

use thiserror::Error;

/// Errors returned by a metrics store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// An update referred to a record the store never created.
    #[error("metrics record {name:?} not found")]
    NotFound {
        /// Name of the missing record.
        name: String,
    },

    /// An update was submitted for a record that has no name yet.
    #[error("metrics record has no name; create it first")]
    Unnamed,

    /// The store rejected or failed the call.
    #[error("metrics store unavailable: {0}")]
    Unavailable(String),
}
