//! The job layer: the catalogue of administrative actions, submission,
//! and the runner that executes them.
//!
//! A job's life: [`submit`] validates the arguments, decides whether a
//! sysadmin must approve it, and writes the row. A [`Runner`] claims
//! queued jobs one at a time and drives each through its steps inside a
//! database transaction: precondition checks first, then entity
//! mutations and host/cluster effects in a fixed order, then the
//! terminal state. Entity mutations and the `done` state commit
//! together; external effects already performed are not undone when a
//! later step fails, and re-running the job is the recovery path.

pub mod error;
pub mod runner;
pub mod spec;
mod steps;
pub mod submit;

pub use error::JobError;
pub use runner::{JobOutcome, Runner};
pub use spec::{Engine, JobSpec};
pub use submit::submit;
