//! PostgreSQL cluster provisioning.
//!
//! Role names match the UNIX account unchanged. Databases are created
//! with the role as owner, which carries all the rights we need; there
//! is no separate grant step.

use scf_core::Password;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::cluster::DbCluster;
use crate::error::ProvisionError;
use crate::ident;

pub struct PgCluster {
    pool: PgPool,
}

impl PgCluster {
    /// Connect the admin pool.
    pub async fn connect(url: &str) -> Result<Self, ProvisionError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn create_role_sql(username: &str, password: &Password) -> String {
    format!(
        "CREATE ROLE {} WITH LOGIN ENCRYPTED PASSWORD {} NOCREATEDB NOCREATEROLE",
        ident::pg(username),
        ident::literal(password.reveal()),
    )
}

fn reset_password_sql(username: &str, password: &Password) -> String {
    format!(
        "ALTER ROLE {} WITH LOGIN PASSWORD {}",
        ident::pg(username),
        ident::literal(password.reveal()),
    )
}

fn create_database_sql(name: &str, owner: &str) -> String {
    format!(
        "CREATE DATABASE {} OWNER {}",
        ident::pg(name),
        ident::pg(owner),
    )
}

fn drop_database_sql(name: &str) -> String {
    format!("DROP DATABASE {}", ident::pg(name))
}

#[async_trait::async_trait]
impl DbCluster for PgCluster {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    fn display_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn username(&self, account: &str) -> String {
        account.to_string()
    }

    async fn ensure_account(&self, account: &str) -> Result<Option<Password>, ProvisionError> {
        let username = self.username(ident::check(account)?);

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pg_roles WHERE rolname = $1")
            .bind(&username)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(None);
        }

        let password = Password::generate();
        sqlx::raw_sql(&create_role_sql(&username, &password))
            .execute(&self.pool)
            .await?;

        tracing::info!(%username, "PostgreSQL role created");
        Ok(Some(password))
    }

    async fn reset_password(&self, account: &str) -> Result<Password, ProvisionError> {
        let username = self.username(ident::check(account)?);
        let password = Password::generate();
        sqlx::raw_sql(&reset_password_sql(&username, &password))
            .execute(&self.pool)
            .await?;
        tracing::info!(%username, "PostgreSQL password reset");
        Ok(password)
    }

    async fn create_database(&self, name: &str, account: &str) -> Result<(), ProvisionError> {
        let name = ident::check(name)?;
        let owner = self.username(ident::check(account)?);
        sqlx::raw_sql(&create_database_sql(name, &owner))
            .execute(&self.pool)
            .await?;
        tracing::info!(database = %name, %owner, "PostgreSQL database created");
        Ok(())
    }

    async fn drop_database(&self, name: &str) -> Result<(), ProvisionError> {
        let name = ident::check(name)?;
        sqlx::raw_sql(&drop_database_sql(name))
            .execute(&self.pool)
            .await?;
        tracing::info!(database = %name, "PostgreSQL database dropped");
        Ok(())
    }

    async fn database_exists(&self, name: &str) -> Result<bool, ProvisionError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pg_database WHERE datname = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn list_databases(&self, account: &str) -> Result<Vec<String>, ProvisionError> {
        let username = self.username(ident::check(account)?);
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT datname FROM pg_database \
             WHERE datname = $1 OR datname LIKE $2 \
             ORDER BY datname",
        )
        .bind(&username)
        .bind(ident::like_suffixes(&username))
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}
