use thiserror::Error;

/// Failures shared by the services and the stores behind them.
///
/// Refusals that end in a redirect (login required, not the author) are
/// not errors; they come back as a `FormOutcome`.
#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    /// The payload names what was looked up, e.g. `group slug: cats`.
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} is already taken")]
    AlreadyExists(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}
