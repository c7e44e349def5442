//! Mailman mailing list tooling.
//!
//! Lists are created with `newlist` (fed the admin password over
//! `sshpass` so it never appears in the process table) and have their
//! passwords rotated with Mailman's `change_pw`, which prints the
//! generated value for us to parse back out. The inventory of lists an
//! account owns comes from the list server's `getlists` endpoint.

use scf_core::Password;

use crate::command;
use crate::error::SystemError;

const SSHPASS: &str = "/usr/bin/sshpass";
const NEWLIST: &str = "/usr/sbin/newlist";
const CHANGE_PW: &str = "/usr/lib/mailman/bin/change_pw";
const ADD_MEMBERS: &str = "/usr/lib/mailman/bin/add_members";

/// Inventory endpoint used when `SCF_LISTS_URL` is not set. Returns one
/// list name per line for a given owner prefix.
pub(crate) const DEFAULT_INVENTORY_URL: &str = "https://lists.scf.net/getlists.cgi";

/// Create a list with the given admin address and password.
pub async fn create(name: &str, owner_email: &str, password: &Password) -> Result<(), SystemError> {
    command::run_with_stdin(
        SSHPASS,
        &[NEWLIST, "--quiet", name, owner_email],
        password.reveal(),
    )
    .await?;
    tracing::info!(list = %name, owner = %owner_email, "Mailing list created");
    Ok(())
}

/// Subscribe an address to a list, without a welcome message.
pub async fn subscribe(name: &str, email: &str) -> Result<(), SystemError> {
    command::run_with_stdin(
        ADD_MEMBERS,
        &["--regular-members-file", "-", "--welcome-msg", "n", name],
        email,
    )
    .await?;
    tracing::info!(list = %name, %email, "Subscribed to mailing list");
    Ok(())
}

/// Have Mailman generate a fresh admin password for a list.
pub async fn reset_password(name: &str) -> Result<Password, SystemError> {
    let output = command::run(CHANGE_PW, &["--quiet", "--listname", name]).await?;
    let password = parse_new_password(name, &output.stdout)?;
    tracing::info!(list = %name, "Mailing list password reset");
    Ok(password)
}

/// Fetch the names of lists owned by the given account.
pub async fn owned_by(
    http: &reqwest::Client,
    inventory_url: &str,
    account: &str,
) -> Result<Vec<String>, SystemError> {
    let body = http
        .get(inventory_url)
        .query(&[("prefix", account)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// `change_pw` prints `New <list> password: <value>` among its chatter.
fn parse_new_password(name: &str, stdout: &str) -> Result<Password, SystemError> {
    let needle = format!("New {name} password: ");
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(needle.as_str()))
        .map(|value| Password::new(value.trim()))
        .ok_or_else(|| SystemError::Parse(format!("no password in change_pw output for {name}")))
}
