//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, missing records). Infrastructure concerns belong elsewhere.
///
/// Note that an empty result is **not** an error: a fee total of zero for a
/// unit that is not distributed through a storefront is a documented outcome
/// and is returned as `Money::ZERO`, never as a `DomainError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist in the data the core was given.
    ///
    /// Surfaced to the caller, never silently treated as an empty set.
    #[error("not found: {0}")]
    NotFound(String),

    /// The data the core was given contradicts itself (e.g. a unit with no
    /// owning product, or negative on-hand stock).
    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: &str, id: impl core::fmt::Display) -> Self {
        Self::NotFound(format!("{what} {id}"))
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InconsistentState(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
