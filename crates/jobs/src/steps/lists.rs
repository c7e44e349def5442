//! Steps for mailing-list jobs.
//!
//! List names are always `owner-suffix`; the suffix was validated at
//! submission against the reserved set. The list server is the source
//! of truth for which lists exist, so preconditions consult its
//! inventory rather than the membership schema.

use sqlx::PgConnection;

use scf_core::Password;
use scf_mail::templates;

use super::{precondition, require_active_owner};
use crate::error::JobError;
use crate::runner::RunCtx;
use crate::spec::ListArgs;

fn list_name(args: &ListArgs) -> String {
    format!("{}-{}", args.owner.name, args.suffix)
}

pub(super) async fn create(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &ListArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    let name = list_name(args);

    let owned = ctx.backend.owned_lists(&args.owner.name).await?;
    if owned.iter().any(|l| l == &name) {
        return Err(precondition(format!("list {name} already exists")));
    }

    let password = Password::generate();
    ctx.backend
        .create_list(&name, &account.email, &password)
        .await?;
    ctx.info(format!("Mailing list {name} created"));

    ctx.notify(templates::list_created(account.account(), &name, &password));
    Ok(format!("mailing list {name} created"))
}

pub(super) async fn reset_password(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &ListArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    let name = list_name(args);

    let owned = ctx.backend.owned_lists(&args.owner.name).await?;
    if !owned.iter().any(|l| l == &name) {
        return Err(precondition(format!("{} owns no list named {name}", args.owner)));
    }

    let password = ctx.backend.reset_list_password(&name).await?;
    ctx.info(format!("Password reset for mailing list {name}"));

    ctx.notify(templates::list_password_reset(
        account.account(),
        &name,
        &password,
    ));
    Ok(format!("mailing list {name} password reset"))
}
