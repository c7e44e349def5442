//! Read-only lookups against the university directory.
//!
//! Signup consults the directory to confirm a CRSid exists and to pick
//! up a display name. The lookup shells out to `ldapsearch` rather than
//! speaking LDAP natively; the directory is anonymous-bind and the
//! query is a single equality match, so the tool is all we need.

use crate::command;
use crate::error::SystemError;

const LDAPSEARCH: &str = "/usr/bin/ldapsearch";
const DIRECTORY_URI: &str = "ldap://ldap.scf.net";
const PEOPLE_BASE: &str = "ou=people,o=scf.net";

/// A person record from the university directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPerson {
    pub crsid: String,
    pub display_name: String,
}

/// Look up a CRSid in the directory.
///
/// Returns `None` when the directory has no matching entry. A missing
/// entry is not an error; signup uses it to decide whether the request
/// needs a human look first.
pub async fn lookup(crsid: &str) -> Result<Option<DirectoryPerson>, SystemError> {
    let filter = format!("(uid={crsid})");
    let output = command::run(
        LDAPSEARCH,
        &[
            "-x", "-LLL", "-H", DIRECTORY_URI, "-b", PEOPLE_BASE, &filter, "displayName",
        ],
    )
    .await?;
    Ok(parse_person(crsid, &output.stdout))
}

/// Pull the display name out of LDIF output. Returns `None` when no
/// entry came back.
fn parse_person(crsid: &str, ldif: &str) -> Option<DirectoryPerson> {
    let mut seen_entry = false;
    let mut display_name = None;
    for line in ldif.lines() {
        if let Some(rest) = line.strip_prefix("dn:") {
            if !rest.trim().is_empty() {
                seen_entry = true;
            }
        } else if let Some(rest) = line.strip_prefix("displayName:") {
            display_name = Some(rest.trim().to_string());
        }
    }
    if !seen_entry {
        return None;
    }
    Some(DirectoryPerson {
        crsid: crsid.to_string(),
        display_name: display_name.unwrap_or_else(|| crsid.to_string()),
    })
}
