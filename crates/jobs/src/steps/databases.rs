//! Steps for cluster database provisioning.
//!
//! Databases are named after the owning account (`name` or
//! `name/suffix`, with MySQL's underscore mapping applied). The first
//! database an owner gets also creates their cluster login; the
//! generated password goes out in the notification and nowhere else.

use sqlx::PgConnection;

use scf_db::models::grant::CreateGrant;
use scf_db::repositories::GrantRepo;
use scf_mail::templates;

use super::{precondition, require_active_owner};
use crate::error::JobError;
use crate::runner::RunCtx;
use crate::spec::{CreateDatabaseArgs, DropDatabaseArgs, ResetDatabasePasswordArgs};

/// Full database name for an owner on a cluster.
fn database_name(cluster_username: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{cluster_username}/{suffix}"),
        None => cluster_username.to_string(),
    }
}

pub(super) async fn create(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &CreateDatabaseArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    let cluster = ctx.cluster(args.engine)?;
    let username = cluster.username(&args.owner.name);
    let name = database_name(&username, args.suffix.as_deref());

    if GrantRepo::exists(&mut *tx, args.engine.as_str(), &name).await? {
        return Err(precondition(format!(
            "{} database {name} is already recorded",
            args.engine.as_str()
        )));
    }
    if cluster.database_exists(&name).await? {
        return Err(precondition(format!(
            "database {name} already exists on the {} cluster",
            args.engine.as_str()
        )));
    }

    let created_password = cluster.ensure_account(&args.owner.name).await?;
    if created_password.is_some() {
        ctx.info(format!("Cluster account {username} created"));
    }
    cluster.create_database(&name, &args.owner.name).await?;
    ctx.info(format!("Database {name} created"));

    GrantRepo::create(
        &mut *tx,
        &CreateGrant {
            owner_kind: args.owner.kind.as_str().to_string(),
            owner_name: args.owner.name.clone(),
            engine: args.engine.as_str().to_string(),
            database_name: name.clone(),
        },
    )
    .await?;

    ctx.notify(templates::database_created(
        account.account(),
        cluster.display_name(),
        &name,
        &username,
        created_password.as_ref(),
    ));
    Ok(format!(
        "{} database {name} created for {}",
        args.engine.as_str(),
        args.owner
    ))
}

pub(super) async fn drop(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &DropDatabaseArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    let cluster = ctx.cluster(args.engine)?;
    let name = database_name(&cluster.username(&args.owner.name), args.suffix.as_deref());

    if !GrantRepo::remove(&mut *tx, args.engine.as_str(), &name).await? {
        return Err(precondition(format!(
            "no {} database {name} is recorded for {}",
            args.engine.as_str(),
            args.owner
        )));
    }

    if cluster.database_exists(&name).await? {
        cluster.drop_database(&name).await?;
        ctx.info(format!("Database {name} dropped"));
    } else {
        ctx.warn(format!("Database {name} was already absent from the cluster"));
    }

    ctx.notify(templates::database_dropped(
        account.account(),
        cluster.display_name(),
        &name,
    ));
    Ok(format!(
        "{} database {name} dropped for {}",
        args.engine.as_str(),
        args.owner
    ))
}

pub(super) async fn reset_password(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &ResetDatabasePasswordArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    let cluster = ctx.cluster(args.engine)?;

    let grants = GrantRepo::list_by_owner(
        &mut *tx,
        args.owner.kind.as_str(),
        &args.owner.name,
        Some(args.engine.as_str()),
    )
    .await?;
    if grants.is_empty() {
        return Err(precondition(format!(
            "{} has no {} databases",
            args.owner,
            args.engine.as_str()
        )));
    }

    let username = cluster.username(&args.owner.name);
    let password = cluster.reset_password(&args.owner.name).await?;
    ctx.info(format!("Cluster password reset for {username}"));

    ctx.notify(templates::database_password_reset(
        account.account(),
        cluster.display_name(),
        &username,
        &password,
    ));
    Ok(format!(
        "{} password reset for {}",
        args.engine.as_str(),
        args.owner
    ))
}
