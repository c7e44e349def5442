//! Recording fakes for the runner's external seams.
//!
//! Each fake records the calls made to it and can be told to fail one
//! named method, which is how the tests exercise the effect-failure
//! paths without touching a real host or cluster.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use scf_core::{naming, Owner, Password};
use scf_db::models::member::CreateMember;
use scf_db::models::society::CreateSociety;
use scf_db::models::status::MemberStatus;
use scf_db::repositories::{MemberRepo, SocietyRepo};
use scf_db::DbPool;
use scf_mail::{MailError, Notifier, Outgoing};
use scf_provision::{DbCluster, ProvisionError};
use scf_system::{DirectoryPerson, SystemBackend, SystemError};

// ---------------------------------------------------------------------------
// FakeBackend
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
    pub directory: Mutex<HashMap<String, String>>,
    pub lists: Mutex<HashSet<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named method return an error from now on.
    pub fn fail_on(&self, method: &str) {
        *self.fail_on.lock().unwrap() = Some(method.to_string());
    }

    /// Register a directory entry so signups for this crsid queue
    /// without approval.
    pub fn add_person(&self, crsid: &str, display_name: &str) {
        self.directory
            .lock()
            .unwrap()
            .insert(crsid.to_string(), display_name.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, method: &str, detail: &str) -> Result<(), SystemError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{method} {detail}"));
        if self.fail_on.lock().unwrap().as_deref() == Some(method) {
            return Err(SystemError::Command {
                program: method.to_string(),
                code: Some(1),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SystemBackend for FakeBackend {
    async fn lookup_person(&self, crsid: &str) -> Result<Option<DirectoryPerson>, SystemError> {
        self.record("lookup_person", crsid)?;
        Ok(self
            .directory
            .lock()
            .unwrap()
            .get(crsid)
            .map(|name| DirectoryPerson {
                crsid: crsid.to_string(),
                display_name: name.clone(),
            }))
    }

    async fn create_account(
        &self,
        owner: &Owner,
        uid: i64,
        _gid: i64,
        _real_name: &str,
    ) -> Result<(), SystemError> {
        self.record("create_account", &format!("{} uid={uid}", owner.name))
    }

    async fn set_password(&self, account: &str, _password: &Password) -> Result<(), SystemError> {
        self.record("set_password", account)
    }

    async fn set_login(&self, account: &str, enabled: bool) -> Result<(), SystemError> {
        self.record("set_login", &format!("{account} enabled={enabled}"))
    }

    async fn set_real_name(&self, account: &str, real_name: &str) -> Result<(), SystemError> {
        self.record("set_real_name", &format!("{account} {real_name}"))
    }

    async fn slay_sessions(&self, account: &str) -> Result<(), SystemError> {
        self.record("slay_sessions", account)
    }

    async fn rename_account(&self, owner: &Owner, new_name: &str) -> Result<(), SystemError> {
        self.record("rename_account", &format!("{} -> {new_name}", owner.name))
    }

    async fn add_to_group(&self, crsid: &str, group: &str) -> Result<(), SystemError> {
        self.record("add_to_group", &format!("{crsid} {group}"))
    }

    async fn remove_from_group(&self, crsid: &str, group: &str) -> Result<(), SystemError> {
        self.record("remove_from_group", &format!("{crsid} {group}"))
    }

    async fn link_society_home(&self, crsid: &str, society: &str) -> Result<(), SystemError> {
        self.record("link_society_home", &format!("{crsid} {society}"))
    }

    async fn unlink_society_home(&self, crsid: &str, society: &str) -> Result<(), SystemError> {
        self.record("unlink_society_home", &format!("{crsid} {society}"))
    }

    async fn update_nis(&self) -> Result<(), SystemError> {
        self.record("update_nis", "")
    }

    async fn create_list(
        &self,
        name: &str,
        owner_email: &str,
        _password: &Password,
    ) -> Result<(), SystemError> {
        self.record("create_list", &format!("{name} {owner_email}"))?;
        self.lists.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn reset_list_password(&self, name: &str) -> Result<Password, SystemError> {
        self.record("reset_list_password", name)?;
        Ok(Password::generate())
    }

    async fn subscribe_to_list(&self, name: &str, email: &str) -> Result<(), SystemError> {
        self.record("subscribe_to_list", &format!("{name} {email}"))
    }

    async fn owned_lists(&self, account: &str) -> Result<Vec<String>, SystemError> {
        self.record("owned_lists", account)?;
        let prefix = format!("{account}-");
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// FakeCluster
// ---------------------------------------------------------------------------

pub struct FakeCluster {
    engine: &'static str,
    pub calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
    pub accounts: Mutex<HashSet<String>>,
    pub databases: Mutex<HashSet<String>>,
}

impl FakeCluster {
    pub fn mysql() -> Self {
        Self::new("mysql")
    }

    pub fn postgres() -> Self {
        Self::new("postgres")
    }

    fn new(engine: &'static str) -> Self {
        Self {
            engine,
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
            accounts: Mutex::new(HashSet::new()),
            databases: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_on(&self, method: &str) {
        *self.fail_on.lock().unwrap() = Some(method.to_string());
    }

    fn record(&self, method: &str, detail: &str) -> Result<(), ProvisionError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{method} {detail}"));
        if self.fail_on.lock().unwrap().as_deref() == Some(method) {
            return Err(ProvisionError::InvalidIdentifier(
                "injected failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DbCluster for FakeCluster {
    fn engine(&self) -> &'static str {
        self.engine
    }

    fn display_name(&self) -> &'static str {
        match self.engine {
            "mysql" => "MySQL",
            _ => "PostgreSQL",
        }
    }

    fn username(&self, account: &str) -> String {
        match self.engine {
            "mysql" => naming::mysql_username(account),
            _ => account.to_string(),
        }
    }

    async fn ensure_account(&self, account: &str) -> Result<Option<Password>, ProvisionError> {
        self.record("ensure_account", account)?;
        let username = self.username(account);
        if self.accounts.lock().unwrap().insert(username) {
            Ok(Some(Password::generate()))
        } else {
            Ok(None)
        }
    }

    async fn reset_password(&self, account: &str) -> Result<Password, ProvisionError> {
        self.record("reset_password", account)?;
        Ok(Password::generate())
    }

    async fn create_database(&self, name: &str, account: &str) -> Result<(), ProvisionError> {
        self.record("create_database", &format!("{name} for {account}"))?;
        self.databases.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn drop_database(&self, name: &str) -> Result<(), ProvisionError> {
        self.record("drop_database", name)?;
        self.databases.lock().unwrap().remove(name);
        Ok(())
    }

    async fn database_exists(&self, name: &str) -> Result<bool, ProvisionError> {
        Ok(self.databases.lock().unwrap().contains(name))
    }

    async fn list_databases(&self, account: &str) -> Result<Vec<String>, ProvisionError> {
        self.record("list_databases", account)?;
        let username = self.username(account);
        let prefix = format!("{username}/");
        let mut names: Vec<String> = self
            .databases
            .lock()
            .unwrap()
            .iter()
            .filter(|name| **name == username || name.starts_with(&prefix))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Outgoing>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &Outgoing) -> Result<(), MailError> {
        if *self.fail.lock().unwrap() {
            return Err(MailError::Build("injected failure".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

pub async fn seed_member(pool: &DbPool, crsid: &str, status: MemberStatus) {
    MemberRepo::create(
        pool,
        &CreateMember {
            crsid: crsid.to_string(),
            preferred_name: "Ada".to_string(),
            surname: "Bernoulli".to_string(),
            email: format!("{crsid}@example.test"),
            mail_handler: "forward".to_string(),
        },
        status,
    )
    .await
    .unwrap();
}

pub async fn seed_society(pool: &DbPool, name: &str, admin: &str) {
    SocietyRepo::create(
        pool,
        &CreateSociety {
            name: name.to_string(),
            description: "Chess Club".to_string(),
            role_email: None,
        },
        MemberStatus::Normal,
    )
    .await
    .unwrap();
    SocietyRepo::add_admin(pool, name, admin).await.unwrap();
}
