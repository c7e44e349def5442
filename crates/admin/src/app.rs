//! Shared wiring for every subcommand.
//!
//! One [`App`] is built per invocation: the membership pool (with
//! pending migrations applied), the host backend, the notifier, and a
//! job runner with whichever clusters this deployment configures.

use std::sync::Arc;

use anyhow::Context;

use scf_db::DbPool;
use scf_jobs::Runner;
use scf_mail::{EmailConfig, NoopNotifier, Notifier, SmtpNotifier};
use scf_provision::{DbCluster, MysqlCluster, PgCluster};
use scf_system::HostBackend;

use crate::cli::Cli;

/// Deployment tag fallback when `SCF_ENVIRONMENT` is not set.
const DEFAULT_ENVIRONMENT: &str = "live";

pub struct App {
    pub pool: DbPool,
    pub backend: Arc<HostBackend>,
    pub notifier: Arc<dyn Notifier>,
    pub runner: Runner,
    /// Cluster handles for read-only commands; job steps reach them
    /// through the runner.
    pub mysql: Option<Arc<dyn DbCluster>>,
    pub postgres: Option<Arc<dyn DbCluster>>,
    /// Recorded on submitted jobs as the requesting member.
    pub actor: Option<String>,
    pub environment: String,
    pub assume_yes: bool,
}

impl App {
    pub async fn init(cli: &Cli) -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let pool = scf_db::create_pool(&database_url)
            .await
            .context("could not connect to the membership database")?;
        scf_db::run_migrations(&pool)
            .await
            .context("migrations failed")?;

        let backend = Arc::new(HostBackend::new());

        let notifier: Arc<dyn Notifier> = if cli.no_email {
            Arc::new(NoopNotifier)
        } else {
            match EmailConfig::from_env() {
                Some(config) => Arc::new(SmtpNotifier::new(config)),
                None => {
                    tracing::warn!("SMTP_HOST not set; notifications will be logged, not sent");
                    Arc::new(NoopNotifier)
                }
            }
        };

        let mut runner = Runner::new(pool.clone(), backend.clone(), notifier.clone());
        let mut mysql: Option<Arc<dyn DbCluster>> = None;
        let mut postgres: Option<Arc<dyn DbCluster>> = None;
        if let Ok(url) = std::env::var("MYSQL_ADMIN_URL") {
            let cluster: Arc<dyn DbCluster> = Arc::new(
                MysqlCluster::connect(&url)
                    .await
                    .context("could not connect to the MySQL cluster")?,
            );
            runner = runner.with_mysql(cluster.clone());
            mysql = Some(cluster);
        }
        if let Ok(url) = std::env::var("PGSQL_ADMIN_URL") {
            let cluster: Arc<dyn DbCluster> = Arc::new(
                PgCluster::connect(&url)
                    .await
                    .context("could not connect to the PostgreSQL cluster")?,
            );
            runner = runner.with_postgres(cluster.clone());
            postgres = Some(cluster);
        }

        let actor = cli
            .actor
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|a| !a.is_empty());
        let environment = std::env::var("SCF_ENVIRONMENT")
            .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());

        Ok(Self {
            pool,
            backend,
            notifier,
            runner,
            mysql,
            postgres,
            actor,
            environment,
            assume_yes: cli.yes,
        })
    }

    /// The configured cluster for an engine, or an error naming the
    /// missing env var.
    pub fn cluster(&self, engine: scf_jobs::Engine) -> anyhow::Result<&Arc<dyn DbCluster>> {
        let (cluster, var) = match engine {
            scf_jobs::Engine::Mysql => (&self.mysql, "MYSQL_ADMIN_URL"),
            scf_jobs::Engine::Postgres => (&self.postgres, "PGSQL_ADMIN_URL"),
        };
        cluster
            .as_ref()
            .with_context(|| format!("no {} cluster configured; set {var}", engine.as_str()))
    }
}
