use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// The filter directives do not parse.
    #[error("invalid filter {filter:?}: {reason}")]
    Filter {
        /// The rejected directives.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// The format name is not one of `pretty`, `compact` or `json`.
    #[error("unknown log format {0:?}")]
    UnknownFormat(String),

    /// A global subscriber is already installed.
    #[error("install global subscriber: {0}")]
    Init(String),
}
