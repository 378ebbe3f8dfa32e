#![deny(missing_docs)]

//! # prr-core: Foundational Types for the PR Reviewers Service
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies and performs no I/O. It uses only
//! `serde`, `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** You cannot pass a [`StatusId`]
//!    where a [`PullRequestId`] is expected.
//!
//! 2. **Status values are an open set.** [`StatusValue`] wraps a string so
//!    that upstream processes may introduce new non-terminal states, while
//!    [`StatusValue::MERGED`] stays the single terminal value.
//!
//! 3. **Records mirror persistence.** [`PullRequest`], [`StatusRecord`] and
//!    [`ReviewerAssignment`] are what repositories hand back; a missing merge
//!    timestamp is `None`, never a zero sentinel.

pub mod error;
pub mod identity;
pub mod record;
pub mod status;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use error::ValidationError;
pub use identity::{AssignmentId, PullRequestId, StatusId, UserId};
pub use record::{PullRequest, ReviewerAssignment, StatusRecord};
pub use status::StatusValue;
pub use temporal::{Clock, FixedClock, SystemClock};
