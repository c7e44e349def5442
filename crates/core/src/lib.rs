//! Core domain types for the SCF membership system.
//!
//! Pure types shared by every other crate in the workspace: id and
//! timestamp aliases, the domain error enum, account naming rules,
//! owner references, mail handler options, and the redacted password
//! wrapper. No I/O and no database access lives here.

pub mod error;
pub mod mail_handler;
pub mod naming;
pub mod owner;
pub mod password;
pub mod types;

pub use error::CoreError;
pub use mail_handler::MailHandler;
pub use owner::{Owner, OwnerKind};
pub use password::Password;
