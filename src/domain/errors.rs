//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed input: name, date, gender, supply type, allocation target.
    /// Raised before any state change takes effect.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation contradicts existing state (e.g. victim already belongs to
    /// a different family group).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Referenced victim or group does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Opaque failure surfaced from the store. Propagated unmodified; the
    /// core never retries persistence.
    #[error("storage error: {0}")]
    Storage(String),
}
