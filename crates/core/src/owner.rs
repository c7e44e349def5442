//! Owner references.
//!
//! Web domains, mailing lists, and database grants belong to either a
//! member or a society. [`Owner`] carries the namespace plus the account
//! name and is what job arguments and resource rows store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which namespace an owner name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Member,
    Society,
}

impl OwnerKind {
    /// Database discriminator value.
    pub fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Member => "member",
            OwnerKind::Society => "society",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(OwnerKind::Member),
            "society" => Ok(OwnerKind::Society),
            other => Err(CoreError::Validation(format!(
                "unknown owner kind: {other}"
            ))),
        }
    }
}

/// A reference to the member or society a resource belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub kind: OwnerKind,
    pub name: String,
}

impl Owner {
    pub fn member(crsid: impl Into<String>) -> Self {
        Self {
            kind: OwnerKind::Member,
            name: crsid.into(),
        }
    }

    pub fn society(name: impl Into<String>) -> Self {
        Self {
            kind: OwnerKind::Society,
            name: name.into(),
        }
    }

    /// The UNIX account name (crsid or society short name).
    pub fn account(&self) -> &str {
        &self.name
    }

    /// Canonical hostname for this owner's facility-hosted site.
    pub fn website_domain(&self) -> String {
        match self.kind {
            OwnerKind::Member => format!("{}.user.scf.net", self.name),
            OwnerKind::Society => format!("{}.soc.scf.net", self.name),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_domains_by_kind() {
        assert_eq!(
            Owner::member("ab123").website_domain(),
            "ab123.user.scf.net"
        );
        assert_eq!(
            Owner::society("chess").website_domain(),
            "chess.soc.scf.net"
        );
    }

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!("member".parse::<OwnerKind>().unwrap(), OwnerKind::Member);
        assert_eq!("society".parse::<OwnerKind>().unwrap(), OwnerKind::Society);
        assert!("group".parse::<OwnerKind>().is_err());
    }

    #[test]
    fn display_names_the_account() {
        assert_eq!(Owner::society("chess").to_string(), "society chess");
    }
}
