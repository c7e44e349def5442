//! Command-line surface: one subcommand group per operator script
//! family, plus global flags shared by all of them.

use clap::{Args, Parser, Subcommand};

use scf_core::{MailHandler, Owner};
use scf_jobs::Engine;

#[derive(Parser, Debug)]
#[command(
    name = "scf-admin",
    about = "Operator tooling for the SCF membership system",
    version
)]
pub struct Cli {
    /// Acting member recorded on submitted jobs (defaults to $USER).
    #[arg(long, global = true, env = "SCF_ACTOR")]
    pub actor: Option<String>,

    /// Skip confirmation prompts.
    #[arg(long, global = true)]
    pub yes: bool,

    /// Log notifications instead of sending them.
    #[arg(long, global = true)]
    pub no_email: bool,

    /// Verbose logging (RUST_LOG still wins when set).
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Personal account administration.
    #[command(subcommand)]
    Member(MemberCommand),
    /// Shared account administration.
    #[command(subcommand)]
    Society(SocietyCommand),
    /// Custom web domains.
    #[command(subcommand)]
    Vhost(VhostCommand),
    /// Mailing lists.
    #[command(subcommand)]
    List(ListCommand),
    /// Cluster databases.
    #[command(subcommand)]
    Database(DatabaseCommand),
    /// The job queue itself.
    #[command(subcommand)]
    Job(JobCommand),
}

/// `--member` / `--society` selector for resources either kind of
/// account can own.
#[derive(Args, Debug, Clone)]
pub struct OwnerArgs {
    /// Owning member's crsid.
    #[arg(long, conflicts_with = "society")]
    pub member: Option<String>,

    /// Owning society's short name.
    #[arg(long)]
    pub society: Option<String>,
}

impl OwnerArgs {
    pub fn owner(&self) -> anyhow::Result<Owner> {
        match (&self.member, &self.society) {
            (Some(crsid), None) => Ok(Owner::member(crsid)),
            (None, Some(name)) => Ok(Owner::society(name)),
            _ => anyhow::bail!("pass exactly one of --member or --society"),
        }
    }
}

pub fn parse_engine(s: &str) -> Result<Engine, String> {
    match s {
        "mysql" => Ok(Engine::Mysql),
        "postgres" => Ok(Engine::Postgres),
        other => Err(format!("unknown engine {other:?} (mysql or postgres)")),
    }
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// Provision a personal account.
    Signup {
        crsid: String,
        preferred_name: String,
        surname: String,
        email: String,
        /// Delivery for the facility address: forward, mailbox or legacy.
        #[arg(long, default_value = "forward")]
        mail_handler: MailHandler,
        /// Subscribe the new member to the social list too.
        #[arg(long)]
        social: bool,
    },
    /// Restore a cancelled account with a fresh contact address.
    Reactivate { crsid: String, email: String },
    /// Retire an account: login disabled, sessions ended.
    Cancel { crsid: String },
    /// Set a fresh password and mail it to the member.
    Passwd { crsid: String },
    /// Update the recorded name.
    SetName {
        crsid: String,
        preferred_name: String,
        surname: String,
    },
    /// Update the contact address.
    SetEmail { crsid: String, email: String },
    /// Switch the facility-address mail handler.
    SetMailHandler {
        crsid: String,
        mail_handler: MailHandler,
    },
    /// Print a member's record and resources.
    Show { crsid: String },
}

#[derive(Subcommand, Debug)]
pub enum SocietyCommand {
    /// Provision a shared account.
    Create {
        name: String,
        description: String,
        /// Initial admin crsids (repeatable).
        #[arg(long = "admin", required = true)]
        admins: Vec<String>,
    },
    /// Update the human-readable description.
    Describe { name: String, description: String },
    /// Set the shared contact address; omit the address to clear it.
    RoleEmail {
        name: String,
        email: Option<String>,
    },
    /// Grant a member admin access.
    AddAdmin { name: String, crsid: String },
    /// Revoke a member's admin access.
    RemoveAdmin { name: String, crsid: String },
    /// Rename the account, its group, homes and resources.
    Rename { name: String, new_name: String },
    /// Print a society's record and resources.
    Show { name: String },
}

#[derive(Subcommand, Debug)]
pub enum VhostCommand {
    /// Attach a custom domain (held for sysadmin approval).
    Add {
        #[command(flatten)]
        owner: OwnerArgs,
        domain: String,
        /// Directory under the web tree; default is public_html.
        #[arg(long)]
        docroot: Option<String>,
    },
    /// Change where a domain is served from; omit --docroot to reset.
    SetDocroot {
        #[command(flatten)]
        owner: OwnerArgs,
        domain: String,
        #[arg(long)]
        docroot: Option<String>,
    },
    /// Detach a custom domain.
    Remove {
        #[command(flatten)]
        owner: OwnerArgs,
        domain: String,
    },
    /// List an owner's domains.
    List {
        #[command(flatten)]
        owner: OwnerArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Create the mailing list `<owner>-<suffix>`.
    Create {
        #[command(flatten)]
        owner: OwnerArgs,
        suffix: String,
    },
    /// Rotate a list's admin password.
    ResetPassword {
        #[command(flatten)]
        owner: OwnerArgs,
        suffix: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DatabaseCommand {
    /// Create a cluster database (and the account, on first use).
    Create {
        #[command(flatten)]
        owner: OwnerArgs,
        /// mysql or postgres.
        #[arg(value_parser = parse_engine)]
        engine: Engine,
        /// Secondary database suffix (`owner/suffix`).
        #[arg(long)]
        suffix: Option<String>,
    },
    /// Drop a database; its contents are deleted.
    Drop {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(value_parser = parse_engine)]
        engine: Engine,
        /// Secondary database suffix (`owner/suffix`).
        #[arg(long)]
        suffix: Option<String>,
    },
    /// List an owner's databases as the cluster sees them.
    List {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(value_parser = parse_engine)]
        engine: Engine,
    },
    /// Reset an owner's cluster password.
    ResetPassword {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(value_parser = parse_engine)]
        engine: Engine,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Print one job's record.
    Show { id: i64 },
    /// Print a job's audit trail.
    Logs { id: i64 },
    /// List jobs, newest first.
    List {
        /// Filter by state name (unapproved, queued, running, done,
        /// failed, withdrawn).
        #[arg(long)]
        state: Option<String>,
        /// Filter by requesting actor.
        #[arg(long)]
        actor: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Release a held job into the queue.
    Approve { id: i64 },
    /// Abandon an unstarted job.
    Withdraw { id: i64 },
    /// Run one queued job now.
    Run { id: i64 },
    /// Poll the queue until interrupted.
    Queue {
        /// Seconds between polls.
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
}
