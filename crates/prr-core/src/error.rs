//! # Validation Errors
//!
//! Errors raised while constructing domain primitives from untrusted input.
//! Each variant carries the rejected input so that callers can report it
//! without re-parsing.

use thiserror::Error;

/// Validation errors for identifier newtypes and status values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The input is not a well-formed UUID.
    #[error("invalid {kind} identifier: \"{value}\" (expected a UUID)")]
    InvalidIdentifier {
        /// Which identifier was being parsed (e.g. "pull request").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A status value was empty or whitespace only.
    #[error("status value must not be empty")]
    EmptyStatus,
}
