//! MySQL cluster provisioning.
//!
//! MySQL usernames swap `-` for `_` (the hyphen is not valid there),
//! and a new login is granted all rights on its own database pattern
//! plus the `name/%` wildcard, so suffixed databases created later need
//! no further grants.

use scf_core::{naming, Password};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::cluster::DbCluster;
use crate::error::ProvisionError;
use crate::ident;

/// All logins are network accounts.
const HOST: &str = "%";

pub struct MysqlCluster {
    pool: MySqlPool,
}

impl MysqlCluster {
    /// Connect the admin pool.
    pub async fn connect(url: &str) -> Result<Self, ProvisionError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn create_user_sql(username: &str, password: &Password) -> String {
    format!(
        "CREATE USER {}@'{HOST}' IDENTIFIED BY {}",
        ident::literal(username),
        ident::literal(password.reveal()),
    )
}

fn grant_sql(username: &str, pattern: &str) -> String {
    format!(
        "GRANT ALL ON {}.* TO {}@'{HOST}'",
        ident::mysql(pattern),
        ident::literal(username),
    )
}

fn reset_password_sql(username: &str, password: &Password) -> String {
    format!(
        "ALTER USER {}@'{HOST}' IDENTIFIED BY {}",
        ident::literal(username),
        ident::literal(password.reveal()),
    )
}

fn create_database_sql(name: &str) -> String {
    format!("CREATE DATABASE {}", ident::mysql(name))
}

fn drop_database_sql(name: &str) -> String {
    format!("DROP DATABASE {}", ident::mysql(name))
}

#[async_trait::async_trait]
impl DbCluster for MysqlCluster {
    fn engine(&self) -> &'static str {
        "mysql"
    }

    fn display_name(&self) -> &'static str {
        "MySQL"
    }

    fn username(&self, account: &str) -> String {
        naming::mysql_username(account)
    }

    async fn ensure_account(&self, account: &str) -> Result<Option<Password>, ProvisionError> {
        let username = self.username(ident::check(account)?);

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM mysql.user WHERE User = ? AND Host = ?")
                .bind(&username)
                .bind(HOST)
                .fetch_one(&self.pool)
                .await?;
        if existing > 0 {
            return Ok(None);
        }

        let password = Password::generate();
        sqlx::raw_sql(&create_user_sql(&username, &password))
            .execute(&self.pool)
            .await?;
        // Cover the primary database and any future suffixed ones.
        sqlx::raw_sql(&grant_sql(&username, &username))
            .execute(&self.pool)
            .await?;
        sqlx::raw_sql(&grant_sql(&username, &format!("{username}/%")))
            .execute(&self.pool)
            .await?;

        tracing::info!(%username, "MySQL account created");
        Ok(Some(password))
    }

    async fn reset_password(&self, account: &str) -> Result<Password, ProvisionError> {
        let username = self.username(ident::check(account)?);
        let password = Password::generate();
        sqlx::raw_sql(&reset_password_sql(&username, &password))
            .execute(&self.pool)
            .await?;
        tracing::info!(%username, "MySQL password reset");
        Ok(password)
    }

    async fn create_database(&self, name: &str, _account: &str) -> Result<(), ProvisionError> {
        let name = ident::check(name)?;
        sqlx::raw_sql(&create_database_sql(name))
            .execute(&self.pool)
            .await?;
        tracing::info!(database = %name, "MySQL database created");
        Ok(())
    }

    async fn drop_database(&self, name: &str) -> Result<(), ProvisionError> {
        let name = ident::check(name)?;
        sqlx::raw_sql(&drop_database_sql(name))
            .execute(&self.pool)
            .await?;
        tracing::info!(database = %name, "MySQL database dropped");
        Ok(())
    }

    async fn database_exists(&self, name: &str) -> Result<bool, ProvisionError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn list_databases(&self, account: &str) -> Result<Vec<String>, ProvisionError> {
        let username = self.username(ident::check(account)?);
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT SCHEMA_NAME FROM information_schema.SCHEMATA \
             WHERE SCHEMA_NAME = ? OR SCHEMA_NAME LIKE ? \
             ORDER BY SCHEMA_NAME",
        )
        .bind(&username)
        .bind(ident::like_suffixes(&username))
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_quotes_the_password() {
        let sql = create_user_sql("ab123", &Password::new("p'w"));
        assert_eq!(sql, "CREATE USER 'ab123'@'%' IDENTIFIED BY 'p''w'");
    }

    #[test]
    fn grants_cover_the_wildcard_pattern() {
        assert_eq!(
            grant_sql("chess_club", "chess_club/%"),
            "GRANT ALL ON `chess_club/%`.* TO 'chess_club'@'%'"
        );
    }

    #[test]
    fn database_names_are_backticked() {
        assert_eq!(
            create_database_sql("ab123/blog"),
            "CREATE DATABASE `ab123/blog`"
        );
        assert_eq!(drop_database_sql("ab123/blog"), "DROP DATABASE `ab123/blog`");
    }
}
