//! Host-level effects behind the job runner.
//!
//! Everything the facility does outside its own database happens here:
//! UNIX accounts and groups, home directory trees, NIS map rebuilds,
//! Mailman lists, and read-only lookups against the university
//! directory. All of it shells out to the standard admin tools, the
//! same ones an operator would run by hand.
//!
//! [`SystemBackend`] is the seam the job runner drives; [`HostBackend`]
//! is the real implementation. Tests substitute a recording fake.

pub mod backend;
pub mod command;
pub mod directory;
pub mod error;
pub mod lists;

pub use backend::{HostBackend, SystemBackend};
pub use directory::DirectoryPerson;
pub use error::SystemError;
