//! # API Route Modules
//!
//! - `pull_requests`: merge endpoint (`POST /pullRequest/merge`).

pub mod pull_requests;
