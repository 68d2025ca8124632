//! # ForumError
//!
//! Centralized error handling for the Rusty-Forum ecosystem.
//! Maps domain-specific failures to actionable error types.

use std::fmt;

use thiserror::Error;

/// The primary error type for all forum operations.
#[derive(Error, Debug)]
pub enum ForumError {
    /// Entity absent or soft-deleted (e.g., Discussion, Comment, User)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed id, or a reference pointing outside the claimed discussion
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Ownership or role check failed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Vote target resolved to zero or two elements
    #[error("vote target {0} matched no element or more than one")]
    AmbiguousOrNotFound(String),

    /// Rejected input (e.g., title too long, unknown vote type)
    #[error("validation error: {0}")]
    Validation(String),

    /// Persistence failure, tagged with the operation and its target
    #[error("storage failure during {operation} on {target}")]
    Storage {
        operation: &'static str,
        target: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Flat classification for transports mapping errors to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidReference,
    Forbidden,
    AmbiguousOrNotFound,
    Validation,
    Storage,
}

impl ForumError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        ForumError::NotFound { entity, id: id.to_string() }
    }

    /// Returns an adapter for `map_err` that wraps a port failure.
    pub fn storage(
        operation: &'static str,
        target: impl fmt::Display,
    ) -> impl FnOnce(anyhow::Error) -> Self {
        let target = target.to_string();
        move |source| ForumError::Storage { operation, target, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ForumError::NotFound { .. } => ErrorKind::NotFound,
            ForumError::InvalidReference(_) => ErrorKind::InvalidReference,
            ForumError::Forbidden(_) => ErrorKind::Forbidden,
            ForumError::AmbiguousOrNotFound(_) => ErrorKind::AmbiguousOrNotFound,
            ForumError::Validation(_) => ErrorKind::Validation,
            ForumError::Storage { .. } => ErrorKind::Storage,
        }
    }
}

/// A specialized Result type for Rusty-Forum logic.
pub type Result<T> = std::result::Result<T, ForumError>;
