//! The host effect seam driven by the job runner.

use async_trait::async_trait;
use scf_core::{Owner, OwnerKind, Password};

use crate::command;
use crate::directory::{self, DirectoryPerson};
use crate::error::SystemError;
use crate::lists;

const ADDUSER: &str = "/usr/sbin/adduser";
const ADDGROUP: &str = "/usr/sbin/addgroup";
const DELUSER: &str = "/usr/sbin/deluser";
const USERMOD: &str = "/usr/sbin/usermod";
const GROUPMOD: &str = "/usr/sbin/groupmod";
const CHPASSWD: &str = "/usr/sbin/chpasswd";
const CHFN: &str = "/usr/bin/chfn";
const INSTALL: &str = "/usr/bin/install";
const MAKE: &str = "/usr/bin/make";
const SLAY: &str = "/usr/local/sbin/scf-slay";

const NOLOGIN_SHELL: &str = "/usr/sbin/nologin";
const LOGIN_SHELL: &str = "/bin/bash";
const SKEL: &str = "/etc/skel";
const NIS_DIR: &str = "/var/yp";

/// Host-level effects a job run may need.
///
/// One method per effect, in the vocabulary of the membership system
/// rather than of the tools underneath. Implementations must be safe to
/// retry; a re-run of a failed job will call them again.
#[async_trait]
pub trait SystemBackend: Send + Sync {
    /// Look up a CRSid in the university directory.
    async fn lookup_person(&self, crsid: &str) -> Result<Option<DirectoryPerson>, SystemError>;

    /// Create the UNIX user and group for an account, with its home and
    /// web trees in place.
    async fn create_account(
        &self,
        owner: &Owner,
        uid: i64,
        gid: i64,
        real_name: &str,
    ) -> Result<(), SystemError>;

    /// Set an account's password.
    async fn set_password(&self, account: &str, password: &Password) -> Result<(), SystemError>;

    /// Switch an account's shell between login and nologin.
    async fn set_login(&self, account: &str, enabled: bool) -> Result<(), SystemError>;

    /// Update the GECOS name field.
    async fn set_real_name(&self, account: &str, real_name: &str) -> Result<(), SystemError>;

    /// Kill every process owned by the account.
    async fn slay_sessions(&self, account: &str) -> Result<(), SystemError>;

    /// Rename an account's user, group and home directory.
    async fn rename_account(&self, owner: &Owner, new_name: &str) -> Result<(), SystemError>;

    /// Add a member to a society's admin group.
    async fn add_to_group(&self, crsid: &str, group: &str) -> Result<(), SystemError>;

    /// Remove a member from a society's admin group.
    async fn remove_from_group(&self, crsid: &str, group: &str) -> Result<(), SystemError>;

    /// Symlink a society home into an admin's home directory.
    async fn link_society_home(&self, crsid: &str, society: &str) -> Result<(), SystemError>;

    /// Remove the society home symlink from an admin's home directory.
    async fn unlink_society_home(&self, crsid: &str, society: &str) -> Result<(), SystemError>;

    /// Push account changes out to the NIS maps.
    async fn update_nis(&self) -> Result<(), SystemError>;

    /// Create a mailing list with the given admin address and password.
    async fn create_list(
        &self,
        name: &str,
        owner_email: &str,
        password: &Password,
    ) -> Result<(), SystemError>;

    /// Rotate a list's admin password, returning the new value.
    async fn reset_list_password(&self, name: &str) -> Result<Password, SystemError>;

    /// Subscribe an address to a mailing list.
    async fn subscribe_to_list(&self, name: &str, email: &str) -> Result<(), SystemError>;

    /// Names of the mailing lists owned by an account.
    async fn owned_lists(&self, account: &str) -> Result<Vec<String>, SystemError>;
}

// ---------------------------------------------------------------------------
// HostBackend
// ---------------------------------------------------------------------------

/// Runs effects against the local host with the standard admin tools.
pub struct HostBackend {
    http: reqwest::Client,
    lists_url: String,
}

impl HostBackend {
    /// Environment variables:
    /// - `SCF_LISTS_URL` (optional) — mailing-list inventory endpoint;
    ///   defaults to the public list server.
    pub fn new() -> Self {
        let lists_url = std::env::var("SCF_LISTS_URL")
            .unwrap_or_else(|_| lists::DEFAULT_INVENTORY_URL.to_string());
        Self::with_lists_url(lists_url)
    }

    pub fn with_lists_url(lists_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            lists_url,
        }
    }
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Home directory for an account.
fn home_path(owner: &Owner) -> String {
    match owner.kind {
        OwnerKind::Member => format!("/home/{}", owner.name),
        OwnerKind::Society => format!("/societies/{}", owner.name),
    }
}

/// World-readable web tree for an account.
fn public_path(owner: &Owner) -> String {
    match owner.kind {
        OwnerKind::Member => format!("/public/home/{}", owner.name),
        OwnerKind::Society => format!("/public/societies/{}", owner.name),
    }
}

#[async_trait]
impl SystemBackend for HostBackend {
    async fn lookup_person(&self, crsid: &str) -> Result<Option<DirectoryPerson>, SystemError> {
        directory::lookup(crsid).await
    }

    async fn create_account(
        &self,
        owner: &Owner,
        uid: i64,
        gid: i64,
        real_name: &str,
    ) -> Result<(), SystemError> {
        let uid = uid.to_string();
        let gid = gid.to_string();
        let home = home_path(owner);
        let public = public_path(owner);

        command::run(ADDGROUP, &["--system", "--gid", &gid, &owner.name]).await?;
        command::run(
            ADDUSER,
            &[
                "--system",
                "--no-create-home",
                "--disabled-password",
                "--uid",
                &uid,
                "--gid",
                &gid,
                "--home",
                &home,
                "--shell",
                LOGIN_SHELL,
                "--gecos",
                real_name,
                &owner.name,
            ],
        )
        .await?;

        // Group-writable home, world-readable web tree.
        let own = format!("{uid}:{gid}");
        command::run(INSTALL, &["-d", "-m", "2770", "-o", &uid, "-g", &gid, &home]).await?;
        command::run(
            INSTALL,
            &["-d", "-m", "2775", "-o", &uid, "-g", &gid, &public],
        )
        .await?;
        command::run("/bin/cp", &["-rT", SKEL, &home]).await?;
        command::run("/bin/chown", &["-R", &own, &home]).await?;
        command::run(
            INSTALL,
            &[
                "-d",
                "-m",
                "2775",
                "-o",
                &uid,
                "-g",
                &gid,
                &format!("{public}/public_html"),
            ],
        )
        .await?;

        tracing::info!(account = %owner.name, %uid, "UNIX account created");
        Ok(())
    }

    async fn set_password(&self, account: &str, password: &Password) -> Result<(), SystemError> {
        let line = format!("{account}:{}\n", password.reveal());
        command::run_with_stdin(CHPASSWD, &[], &line).await?;
        tracing::info!(%account, "Password set");
        Ok(())
    }

    async fn set_login(&self, account: &str, enabled: bool) -> Result<(), SystemError> {
        let shell = if enabled { LOGIN_SHELL } else { NOLOGIN_SHELL };
        command::run(USERMOD, &["--shell", shell, account]).await?;
        tracing::info!(%account, %enabled, "Login shell updated");
        Ok(())
    }

    async fn set_real_name(&self, account: &str, real_name: &str) -> Result<(), SystemError> {
        command::run(CHFN, &["--full-name", real_name, account]).await?;
        Ok(())
    }

    async fn slay_sessions(&self, account: &str) -> Result<(), SystemError> {
        command::run(SLAY, &[account]).await?;
        tracing::info!(%account, "Sessions slain");
        Ok(())
    }

    async fn rename_account(&self, owner: &Owner, new_name: &str) -> Result<(), SystemError> {
        let renamed = Owner {
            kind: owner.kind,
            name: new_name.to_string(),
        };
        let new_home = home_path(&renamed);

        command::run(USERMOD, &["--login", new_name, &owner.name]).await?;
        command::run(GROUPMOD, &["--new-name", new_name, &owner.name]).await?;
        command::run(USERMOD, &["--home", &new_home, "--move-home", new_name]).await?;
        tokio::fs::rename(public_path(owner), public_path(&renamed)).await?;

        tracing::info!(from = %owner.name, to = %new_name, "Account renamed");
        Ok(())
    }

    async fn add_to_group(&self, crsid: &str, group: &str) -> Result<(), SystemError> {
        command::run(ADDUSER, &[crsid, group]).await?;
        Ok(())
    }

    async fn remove_from_group(&self, crsid: &str, group: &str) -> Result<(), SystemError> {
        command::run(DELUSER, &[crsid, group]).await?;
        Ok(())
    }

    async fn link_society_home(&self, crsid: &str, society: &str) -> Result<(), SystemError> {
        let link = format!("/home/{crsid}/{society}");
        match tokio::fs::symlink(format!("/societies/{society}"), &link).await {
            Ok(()) => Ok(()),
            // Already linked from a previous run or an earlier admin stint.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn unlink_society_home(&self, crsid: &str, society: &str) -> Result<(), SystemError> {
        let link = format!("/home/{crsid}/{society}");
        match tokio::fs::remove_file(&link).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_nis(&self) -> Result<(), SystemError> {
        command::run(MAKE, &["-C", NIS_DIR]).await?;
        tracing::info!("NIS maps rebuilt");
        Ok(())
    }

    async fn create_list(
        &self,
        name: &str,
        owner_email: &str,
        password: &Password,
    ) -> Result<(), SystemError> {
        lists::create(name, owner_email, password).await
    }

    async fn reset_list_password(&self, name: &str) -> Result<Password, SystemError> {
        lists::reset_password(name).await
    }

    async fn subscribe_to_list(&self, name: &str, email: &str) -> Result<(), SystemError> {
        lists::subscribe(name, email).await
    }

    async fn owned_lists(&self, account: &str) -> Result<Vec<String>, SystemError> {
        lists::owned_by(&self.http, &self.lists_url, account).await
    }
}
