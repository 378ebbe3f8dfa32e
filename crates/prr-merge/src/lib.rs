#![deny(missing_docs)]

//! # prr-merge: Transactional Pull Request Merge
//!
//! Moves a pull request to the terminal `MERGED` status. The transition
//! reads the pull request, its status record and its reviewer assignments,
//! decides whether a merge is needed and, if so, updates the status and
//! stamps the merge time as one atomic unit.
//!
//! ## Outcomes
//!
//! ```text
//! merge(id) ─┬─ Ok(Merged(result))         this call performed OPEN → MERGED
//!            ├─ Ok(AlreadyMerged(result))  no mutation; result is the frozen current state
//!            └─ Err(MergeError)            classified via MergeError::kind()
//! ```
//!
//! ## Contracts
//!
//! The workflow is generic over a [`TransactionManager`] and three
//! repositories ([`PullRequestRepository`], [`StatusRepository`],
//! [`ReviewerRepository`]). Every repository call receives the scope opened
//! by the manager; dropping a scope without committing rolls it back.
//! [`memory`] provides a serializable in-memory implementation of all four.
//!
//! [`create`] is the upstream path that creates an `OPEN` pull request with
//! its reviewers over the same contracts.

pub mod create;
pub mod error;
pub mod memory;
pub mod outcome;
pub mod repository;
pub mod workflow;

pub use create::{CreateError, CreatePullRequest, CreateWorkflow, NewPullRequest};
pub use error::{ErrorKind, MergeError, ReadTarget, WriteTarget};
pub use outcome::{MergeOutcome, MergeResult};
pub use repository::{
    Entity, PullRequestRepository, ReviewerRepository, StatusRepository, StoreError,
    TransactionManager,
};
pub use workflow::{MergePullRequest, MergeWorkflow};
