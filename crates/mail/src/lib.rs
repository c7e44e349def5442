//! Notification rendering and delivery.
//!
//! Building blocks for the job layer's emails:
//!
//! - [`Outgoing`] — one rendered notification (recipients, subject, body).
//! - [`templates`] — a function per notification, producing `Outgoing`.
//! - [`Notifier`] — the delivery seam; [`SmtpNotifier`] sends via SMTP,
//!   [`NoopNotifier`] logs and drops (unconfigured or suppressed mail).
//!
//! Delivery is best-effort by contract: callers log a failed send and
//! carry on, so nothing here ever decides a job's outcome.

pub mod config;
pub mod error;
pub mod layout;
pub mod message;
pub mod notify;
pub mod templates;

pub use config::EmailConfig;
pub use error::MailError;
pub use message::{Outgoing, Recipient};
pub use notify::{Notifier, NoopNotifier, SmtpNotifier};
