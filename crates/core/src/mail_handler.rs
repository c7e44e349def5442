//! Mail delivery options for a member's facility address.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Where mail addressed to `crsid@scf.net` is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailHandler {
    /// Forward to the member's contact address.
    Forward,
    /// Deliver to the facility IMAP store.
    Mailbox,
    /// Deliver to the legacy mail host.
    Legacy,
}

impl MailHandler {
    pub fn as_str(self) -> &'static str {
        match self {
            MailHandler::Forward => "forward",
            MailHandler::Mailbox => "mailbox",
            MailHandler::Legacy => "legacy",
        }
    }
}

impl fmt::Display for MailHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MailHandler {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(MailHandler::Forward),
            "mailbox" => Ok(MailHandler::Mailbox),
            "legacy" => Ok(MailHandler::Legacy),
            other => Err(CoreError::Validation(format!(
                "unknown mail handler: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for handler in [MailHandler::Forward, MailHandler::Mailbox, MailHandler::Legacy] {
            assert_eq!(handler.as_str().parse::<MailHandler>().unwrap(), handler);
        }
    }

    #[test]
    fn rejects_unknown_handler() {
        assert!("imap".parse::<MailHandler>().is_err());
    }
}
