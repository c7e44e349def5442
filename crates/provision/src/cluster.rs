//! The engine-independent cluster interface.

use async_trait::async_trait;
use scf_core::Password;

use crate::error::ProvisionError;

/// One database cluster the facility provisions accounts on.
///
/// Account names arrive as the owning UNIX account name; each engine
/// maps them to its own username convention via [`username`]. Database
/// names are already composed (`account` or `account/suffix`).
///
/// [`username`]: DbCluster::username
#[async_trait]
pub trait DbCluster: Send + Sync {
    /// Engine tag as stored on grant rows (`mysql` or `postgres`).
    fn engine(&self) -> &'static str;

    /// Engine name as written in notifications.
    fn display_name(&self) -> &'static str;

    /// Cluster login name for an account.
    fn username(&self, account: &str) -> String;

    /// Create the cluster login if it does not exist yet.
    ///
    /// Returns the generated password when the login was created, and
    /// `None` when it already existed (its password is unchanged).
    async fn ensure_account(&self, account: &str) -> Result<Option<Password>, ProvisionError>;

    /// Set the account's login password to a fresh value.
    async fn reset_password(&self, account: &str) -> Result<Password, ProvisionError>;

    /// Create a database owned by the account.
    async fn create_database(&self, name: &str, account: &str) -> Result<(), ProvisionError>;

    /// Drop a database and everything in it.
    async fn drop_database(&self, name: &str) -> Result<(), ProvisionError>;

    /// Whether a database of this name exists on the cluster.
    async fn database_exists(&self, name: &str) -> Result<bool, ProvisionError>;

    /// Names of the account's databases on this cluster: the primary
    /// one plus any `name/suffix` secondaries, sorted.
    async fn list_databases(&self, account: &str) -> Result<Vec<String>, ProvisionError>;
}
