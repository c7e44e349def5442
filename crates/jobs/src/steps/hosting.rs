//! Steps for custom-domain jobs.
//!
//! The web servers read the `domains` and `https_certs` tables
//! directly, so these jobs are pure schema mutations plus
//! notifications; there is no host command to run.

use sqlx::PgConnection;

use scf_core::Owner;
use scf_db::models::domain::{CreateDomain, Domain};
use scf_db::repositories::{DomainRepo, HttpsCertRepo};
use scf_mail::templates;

use super::{precondition, require_active_owner};
use crate::error::JobError;
use crate::runner::RunCtx;
use crate::spec::{AddVhostArgs, ChangeVhostDocrootArgs, RemoveVhostArgs};

/// Directory served when a domain has no explicit docroot.
const DEFAULT_DOCROOT: &str = "public_html";

pub(super) async fn add_vhost(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &AddVhostArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    if DomainRepo::find_by_domain(&mut *tx, &args.domain)
        .await?
        .is_some()
    {
        return Err(precondition(format!("{} is already hosted", args.domain)));
    }

    DomainRepo::create(
        &mut *tx,
        &CreateDomain {
            owner_kind: args.owner.kind.as_str().to_string(),
            owner_name: args.owner.name.clone(),
            domain: args.domain.clone(),
            docroot: args.docroot.clone(),
            wildcard: false,
        },
    )
    .await?;
    HttpsCertRepo::create(&mut *tx, &args.domain).await?;
    ctx.info(format!(
        "Domain {} attached to {} with certificate issuance queued",
        args.domain, args.owner
    ));

    let root = args.docroot.as_deref().unwrap_or(DEFAULT_DOCROOT);
    ctx.notify(templates::vhost_added(account.account(), &args.domain, root));
    Ok(format!("domain {} added for {}", args.domain, args.owner))
}

pub(super) async fn change_docroot(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &ChangeVhostDocrootArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    let existing = require_owned_domain(tx, &args.owner, &args.domain).await?;
    if existing.docroot == args.docroot {
        return Err(precondition(format!(
            "docroot for {} is unchanged",
            args.domain
        )));
    }

    DomainRepo::set_docroot(&mut *tx, &args.domain, args.docroot.as_deref()).await?;
    let root = args.docroot.as_deref().unwrap_or(DEFAULT_DOCROOT);
    ctx.info(format!("Docroot for {} set to {root}", args.domain));

    ctx.notify(templates::vhost_docroot_changed(
        account.account(),
        &args.domain,
        root,
    ));
    Ok(format!("docroot updated for {}", args.domain))
}

pub(super) async fn remove_vhost(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &RemoveVhostArgs,
) -> Result<String, JobError> {
    let account = require_active_owner(tx, &args.owner).await?;
    require_owned_domain(tx, &args.owner, &args.domain).await?;

    HttpsCertRepo::remove(&mut *tx, &args.domain).await?;
    DomainRepo::remove(&mut *tx, &args.domain).await?;
    ctx.info(format!("Domain {} detached", args.domain));

    ctx.notify(templates::vhost_removed(account.account(), &args.domain));
    Ok(format!("domain {} removed", args.domain))
}

/// The domain row, provided it belongs to the job's owner.
async fn require_owned_domain(
    tx: &mut PgConnection,
    owner: &Owner,
    domain: &str,
) -> Result<Domain, JobError> {
    let Some(existing) = DomainRepo::find_by_domain(&mut *tx, domain).await? else {
        return Err(precondition(format!("{domain} is not hosted here")));
    };
    if existing.owner_kind != owner.kind.as_str() || existing.owner_name != owner.name {
        return Err(precondition(format!("{domain} does not belong to {owner}")));
    }
    Ok(existing)
}
