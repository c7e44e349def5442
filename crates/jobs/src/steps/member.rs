//! Steps for personal-account jobs.

use sqlx::PgConnection;

use scf_core::{Owner, Password};
use scf_db::models::member::{CreateMember, UpdateMember};
use scf_db::models::status::MemberStatus;
use scf_db::repositories::MemberRepo;
use scf_mail::templates::{self, MemberMail};

use super::{precondition, require_active_member, require_member};
use crate::error::JobError;
use crate::runner::RunCtx;
use crate::spec::{
    MemberArgs, ReactivateArgs, SignupArgs, UpdateEmailArgs, UpdateMailHandlerArgs, UpdateNameArgs,
};

/// Provision a personal account.
///
/// A failed signup leaves the member row in `new`; re-running the job
/// picks it up from there rather than hitting the duplicate-key error.
pub(super) async fn signup(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &SignupArgs,
) -> Result<String, JobError> {
    let crsid = &args.crsid;

    match MemberRepo::find_by_crsid(&mut *tx, crsid).await? {
        Some(m) if m.status_id == MemberStatus::Normal.id() => {
            return Err(precondition(format!("{crsid} is already a member")));
        }
        Some(m) if m.status_id == MemberStatus::Cancelled.id() => {
            return Err(precondition(format!(
                "{crsid} was cancelled; use reactivate instead"
            )));
        }
        Some(_) => {
            ctx.info(format!("Resuming signup for existing {crsid} record"));
        }
        None => {
            MemberRepo::create(
                &mut *tx,
                &CreateMember {
                    crsid: crsid.clone(),
                    preferred_name: args.preferred_name.clone(),
                    surname: args.surname.clone(),
                    email: args.email.clone(),
                    mail_handler: args.mail_handler.as_str().to_string(),
                },
                MemberStatus::New,
            )
            .await?;
            ctx.info(format!("Member record created for {crsid}"));
        }
    }

    let (uid, gid) = MemberRepo::allocate_ids(&mut *tx, crsid).await?;
    ctx.info(format!("Allocated uid {uid}, gid {gid}"));

    let owner = Owner::member(crsid);
    let display = format!("{} {}", args.preferred_name, args.surname);
    ctx.backend.create_account(&owner, uid, gid, &display).await?;
    ctx.info("UNIX account and home directories created");

    let password = Password::generate();
    ctx.backend.set_password(crsid, &password).await?;
    ctx.backend.update_nis().await?;
    ctx.info("Password set and NIS maps rebuilt");

    ctx.backend
        .subscribe_to_list("scf-announce", &args.email)
        .await?;
    if args.social {
        ctx.backend
            .subscribe_to_list("scf-social", &args.email)
            .await?;
    }
    ctx.info(if args.social {
        "Subscribed to announcements and the social list"
    } else {
        "Subscribed to announcements"
    });

    if !MemberRepo::set_status(&mut *tx, crsid, &[MemberStatus::New], MemberStatus::Normal).await? {
        return Err(JobError::State(format!(
            "{crsid} changed status during signup"
        )));
    }

    ctx.notify(templates::signup(
        MemberMail {
            crsid,
            name: &display,
            email: &args.email,
        },
        &password,
    ));
    Ok(format!("member {crsid} provisioned"))
}

/// Restore a cancelled account with a fresh password and contact
/// address.
pub(super) async fn reactivate(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &ReactivateArgs,
) -> Result<String, JobError> {
    let crsid = &args.crsid;
    let member = require_member(tx, crsid).await?;
    if member.status_id != MemberStatus::Cancelled.id() {
        return Err(precondition(format!("{crsid} is not cancelled")));
    }

    MemberRepo::update(
        &mut *tx,
        crsid,
        &UpdateMember {
            email: Some(args.email.clone()),
            ..Default::default()
        },
    )
    .await?;

    ctx.backend.set_login(crsid, true).await?;
    let password = Password::generate();
    ctx.backend.set_password(crsid, &password).await?;
    ctx.backend.update_nis().await?;
    ctx.info("Login re-enabled, password reset, NIS maps rebuilt");

    if !MemberRepo::set_status(
        &mut *tx,
        crsid,
        &[MemberStatus::Cancelled],
        MemberStatus::Normal,
    )
    .await?
    {
        return Err(JobError::State(format!(
            "{crsid} changed status during reactivation"
        )));
    }

    ctx.notify(templates::reactivated(
        MemberMail {
            crsid,
            name: &member.display_name(),
            email: &args.email,
        },
        &password,
    ));
    Ok(format!("member {crsid} reactivated"))
}

/// Retire an account: login disabled, sessions ended, status
/// `cancelled`. Files and rows stay.
pub(super) async fn cancel(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &MemberArgs,
) -> Result<String, JobError> {
    let crsid = &args.crsid;
    let member = require_active_member(tx, crsid).await?;

    ctx.backend.set_login(crsid, false).await?;
    ctx.backend.slay_sessions(crsid).await?;
    ctx.backend.update_nis().await?;
    ctx.info("Login disabled and sessions ended");

    if !MemberRepo::set_status(
        &mut *tx,
        crsid,
        &[MemberStatus::Normal],
        MemberStatus::Cancelled,
    )
    .await?
    {
        return Err(JobError::State(format!(
            "{crsid} changed status during cancellation"
        )));
    }

    ctx.notify(templates::cancelled(MemberMail {
        crsid,
        name: &member.display_name(),
        email: &member.email,
    }));
    Ok(format!("member {crsid} cancelled"))
}

pub(super) async fn reset_password(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &MemberArgs,
) -> Result<String, JobError> {
    let crsid = &args.crsid;
    let member = require_active_member(tx, crsid).await?;

    let password = Password::generate();
    ctx.backend.set_password(crsid, &password).await?;
    ctx.backend.update_nis().await?;
    ctx.info("Password reset");

    ctx.notify(templates::password_reset(
        MemberMail {
            crsid,
            name: &member.display_name(),
            email: &member.email,
        },
        &password,
    ));
    Ok(format!("password reset for {crsid}"))
}

pub(super) async fn update_name(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &UpdateNameArgs,
) -> Result<String, JobError> {
    let crsid = &args.crsid;
    let member = require_active_member(tx, crsid).await?;
    let old_name = member.display_name();
    let new_name = format!("{} {}", args.preferred_name, args.surname);
    if old_name == new_name {
        return Err(precondition(format!("{crsid} is already named {new_name}")));
    }

    MemberRepo::update(
        &mut *tx,
        crsid,
        &UpdateMember {
            preferred_name: Some(args.preferred_name.clone()),
            surname: Some(args.surname.clone()),
            ..Default::default()
        },
    )
    .await?;

    ctx.backend.set_real_name(crsid, &new_name).await?;
    ctx.backend.update_nis().await?;
    ctx.info(format!("Name updated from {old_name} to {new_name}"));

    ctx.notify(templates::name_updated(
        MemberMail {
            crsid,
            name: &new_name,
            email: &member.email,
        },
        &old_name,
    ));
    Ok(format!("name updated for {crsid}"))
}

pub(super) async fn update_email(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &UpdateEmailArgs,
) -> Result<String, JobError> {
    let crsid = &args.crsid;
    let member = require_active_member(tx, crsid).await?;
    if member.email == args.email {
        return Err(precondition(format!(
            "{} is already the contact address for {crsid}",
            args.email
        )));
    }

    MemberRepo::update(
        &mut *tx,
        crsid,
        &UpdateMember {
            email: Some(args.email.clone()),
            ..Default::default()
        },
    )
    .await?;
    ctx.info(format!(
        "Contact address updated from {} to {}",
        member.email, args.email
    ));

    ctx.notify(templates::email_updated(
        MemberMail {
            crsid,
            name: &member.display_name(),
            email: &args.email,
        },
        &member.email,
    ));
    Ok(format!("contact address updated for {crsid}"))
}

pub(super) async fn update_mail_handler(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &UpdateMailHandlerArgs,
) -> Result<String, JobError> {
    let crsid = &args.crsid;
    let member = require_active_member(tx, crsid).await?;
    let handler = args.mail_handler.as_str();
    if member.mail_handler == handler {
        return Err(precondition(format!(
            "mail for {crsid} is already handled by {handler}"
        )));
    }

    MemberRepo::update(
        &mut *tx,
        crsid,
        &UpdateMember {
            mail_handler: Some(handler.to_string()),
            ..Default::default()
        },
    )
    .await?;
    ctx.info(format!(
        "Mail handler changed from {} to {handler}",
        member.mail_handler
    ));

    ctx.notify(templates::mail_handler_updated(
        MemberMail {
            crsid,
            name: &member.display_name(),
            email: &member.email,
        },
        handler,
    ));
    Ok(format!("mail handler updated for {crsid}"))
}
