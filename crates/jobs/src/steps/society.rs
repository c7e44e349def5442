//! Steps for shared-account jobs.

use sqlx::PgConnection;

use scf_core::Owner;
use scf_db::models::society::{CreateSociety, UpdateSociety};
use scf_db::models::status::MemberStatus;
use scf_db::repositories::SocietyRepo;
use scf_mail::templates::{self, MemberMail, SocietyMail};

use super::{precondition, require_active_member, require_active_society, society_email};
use crate::error::JobError;
use crate::runner::RunCtx;
use crate::spec::{
    CreateSocietyArgs, RenameSocietyArgs, SocietyAdminArgs, UpdateSocietyDescriptionArgs,
    UpdateSocietyRoleEmailArgs,
};

/// Provision a shared account with its initial admin set.
pub(super) async fn create(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &CreateSocietyArgs,
) -> Result<String, JobError> {
    let name = &args.name;
    if SocietyRepo::find_by_name(&mut *tx, name).await?.is_some() {
        return Err(precondition(format!("society {name} already exists")));
    }

    // Every listed admin must be an active member before anything runs.
    let mut admins = Vec::with_capacity(args.admins.len());
    for crsid in &args.admins {
        admins.push(require_active_member(tx, crsid).await?);
    }

    SocietyRepo::create(
        &mut *tx,
        &CreateSociety {
            name: name.clone(),
            description: args.description.clone(),
            role_email: None,
        },
        MemberStatus::New,
    )
    .await?;
    let (uid, gid) = SocietyRepo::allocate_ids(&mut *tx, name).await?;
    ctx.info(format!("Society record created, uid {uid}, gid {gid}"));

    let owner = Owner::society(name);
    ctx.backend
        .create_account(&owner, uid, gid, &args.description)
        .await?;
    ctx.info("UNIX account and home directories created");

    for admin in &admins {
        SocietyRepo::add_admin(&mut *tx, name, &admin.crsid).await?;
        ctx.backend.add_to_group(&admin.crsid, name).await?;
        ctx.backend.link_society_home(&admin.crsid, name).await?;
        ctx.info(format!("Added admin {}", admin.crsid));
    }
    ctx.backend.update_nis().await?;

    if !SocietyRepo::set_status(&mut *tx, name, &[MemberStatus::New], MemberStatus::Normal).await? {
        return Err(JobError::State(format!(
            "society {name} changed status during creation"
        )));
    }

    let role = format!("{name}@scf.net");
    let society = SocietyMail {
        name,
        description: &args.description,
        email: &role,
    };
    ctx.notify(templates::society_created(society));
    for admin in &admins {
        ctx.notify(templates::admin_joined(
            MemberMail {
                crsid: &admin.crsid,
                name: &admin.display_name(),
                email: &admin.email,
            },
            society,
        ));
    }
    Ok(format!("society {name} created with {} admins", admins.len()))
}

pub(super) async fn update_description(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &UpdateSocietyDescriptionArgs,
) -> Result<String, JobError> {
    let name = &args.society;
    let society = require_active_society(tx, name).await?;
    if society.description == args.description {
        return Err(precondition(format!(
            "{name} is already described as {}",
            args.description
        )));
    }

    SocietyRepo::update(
        &mut *tx,
        name,
        &UpdateSociety {
            description: Some(args.description.clone()),
            ..Default::default()
        },
    )
    .await?;
    ctx.backend.set_real_name(name, &args.description).await?;
    ctx.backend.update_nis().await?;
    ctx.info(format!(
        "Description updated from {} to {}",
        society.description, args.description
    ));

    let email = society_email(&society);
    ctx.notify(templates::society_description_updated(SocietyMail {
        name,
        description: &args.description,
        email: &email,
    }));
    Ok(format!("description updated for {name}"))
}

pub(super) async fn update_role_email(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &UpdateSocietyRoleEmailArgs,
) -> Result<String, JobError> {
    let name = &args.society;
    let society = require_active_society(tx, name).await?;
    if society.role_email == args.email {
        return Err(precondition(format!("role address for {name} is unchanged")));
    }

    let old_email = society_email(&society);
    SocietyRepo::set_role_email(&mut *tx, name, args.email.as_deref()).await?;
    ctx.info(match &args.email {
        Some(email) => format!("Role address set to {email}"),
        None => "Role address cleared".to_string(),
    });

    // Notify the address that takes effect from now on.
    let new_email = args
        .email
        .clone()
        .unwrap_or_else(|| format!("{name}@scf.net"));
    ctx.notify(templates::society_role_email_updated(
        SocietyMail {
            name,
            description: &society.description,
            email: &new_email,
        },
        &old_email,
    ));
    Ok(format!("role address updated for {name}"))
}

pub(super) async fn add_admin(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &SocietyAdminArgs,
) -> Result<String, JobError> {
    let name = &args.society;
    let crsid = &args.target_crsid;
    let society = require_active_society(tx, name).await?;
    let member = require_active_member(tx, crsid).await?;
    if SocietyRepo::is_admin(&mut *tx, name, crsid).await? {
        return Err(precondition(format!("{crsid} already administers {name}")));
    }

    SocietyRepo::add_admin(&mut *tx, name, crsid).await?;
    ctx.backend.add_to_group(crsid, name).await?;
    ctx.backend.link_society_home(crsid, name).await?;
    ctx.backend.update_nis().await?;
    ctx.info(format!("{crsid} added to the {name} admin group"));

    let email = society_email(&society);
    let member_name = member.display_name();
    let society_mail = SocietyMail {
        name,
        description: &society.description,
        email: &email,
    };
    let member_mail = MemberMail {
        crsid,
        name: &member_name,
        email: &member.email,
    };
    ctx.notify(templates::admin_joined(member_mail, society_mail));
    ctx.notify(templates::admin_added(society_mail, member_mail));
    Ok(format!("{crsid} now administers {name}"))
}

pub(super) async fn remove_admin(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &SocietyAdminArgs,
) -> Result<String, JobError> {
    let name = &args.society;
    let crsid = &args.target_crsid;
    let society = require_active_society(tx, name).await?;
    let member = require_active_member(tx, crsid).await?;

    let admins = SocietyRepo::admins(&mut *tx, name).await?;
    if !admins.iter().any(|a| a == crsid) {
        return Err(precondition(format!("{crsid} does not administer {name}")));
    }
    if admins.len() == 1 {
        return Err(precondition(format!(
            "{crsid} is the last admin of {name} and cannot be removed"
        )));
    }

    SocietyRepo::remove_admin(&mut *tx, name, crsid).await?;
    ctx.backend.remove_from_group(crsid, name).await?;
    ctx.backend.unlink_society_home(crsid, name).await?;
    ctx.backend.update_nis().await?;
    ctx.info(format!("{crsid} removed from the {name} admin group"));

    let email = society_email(&society);
    let member_name = member.display_name();
    let society_mail = SocietyMail {
        name,
        description: &society.description,
        email: &email,
    };
    let member_mail = MemberMail {
        crsid,
        name: &member_name,
        email: &member.email,
    };
    ctx.notify(templates::admin_left(member_mail, society_mail));
    ctx.notify(templates::admin_removed(society_mail, member_mail));
    Ok(format!("{crsid} no longer administers {name}"))
}

/// Rename a shared account everywhere: the society row and its
/// dependent resource rows, then the UNIX account, group and homes.
///
/// The row updates run first so a host failure rolls everything back
/// and the society keeps its old name.
pub(super) async fn rename(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    args: &RenameSocietyArgs,
) -> Result<String, JobError> {
    let old = &args.society;
    let new = &args.new_name;
    let society = require_active_society(tx, old).await?;
    if SocietyRepo::find_by_name(&mut *tx, new).await?.is_some() {
        return Err(precondition(format!("society {new} already exists")));
    }

    if !SocietyRepo::rename(&mut *tx, old, new).await? {
        return Err(JobError::State(format!("society {old} vanished mid-run")));
    }
    ctx.info(format!("Rows renamed from {old} to {new}"));

    ctx.backend
        .rename_account(&Owner::society(old), new)
        .await?;
    ctx.backend.update_nis().await?;
    ctx.info("UNIX account, group and homes renamed");

    let email = match &society.role_email {
        Some(role) => role.clone(),
        None => format!("{new}@scf.net"),
    };
    ctx.notify(templates::society_renamed(
        SocietyMail {
            name: new,
            description: &society.description,
            email: &email,
        },
        old,
    ));
    Ok(format!("society {old} renamed to {new}"))
}
