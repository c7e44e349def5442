//! Per-kind job execution.
//!
//! Each step function takes the run's transaction and [`RunCtx`] and
//! returns a one-line summary for the job row. The shared shape:
//! precondition checks first (nothing external runs until they pass),
//! then entity mutations on the transaction interleaved with host and
//! cluster effects, then notifications queued on the context.

mod databases;
mod hosting;
mod lists;
mod member;
mod society;

use sqlx::PgConnection;

use scf_core::{Owner, OwnerKind};
use scf_db::models::member::Member;
use scf_db::models::society::Society;
use scf_db::models::status::MemberStatus;
use scf_db::repositories::{MemberRepo, SocietyRepo};
use scf_mail::templates::{Account, MemberMail, SocietyMail};

use crate::error::JobError;
use crate::runner::RunCtx;
use crate::spec::JobSpec;

/// Dispatch a typed job to its steps.
pub(crate) async fn execute(
    tx: &mut PgConnection,
    ctx: &mut RunCtx<'_>,
    spec: &JobSpec,
) -> Result<String, JobError> {
    match spec {
        JobSpec::Signup(args) => member::signup(tx, ctx, args).await,
        JobSpec::Reactivate(args) => member::reactivate(tx, ctx, args).await,
        JobSpec::CancelMember(args) => member::cancel(tx, ctx, args).await,
        JobSpec::ResetUserPassword(args) => member::reset_password(tx, ctx, args).await,
        JobSpec::UpdateName(args) => member::update_name(tx, ctx, args).await,
        JobSpec::UpdateEmailAddress(args) => member::update_email(tx, ctx, args).await,
        JobSpec::UpdateMailHandler(args) => member::update_mail_handler(tx, ctx, args).await,
        JobSpec::CreateSociety(args) => society::create(tx, ctx, args).await,
        JobSpec::UpdateSocietyDescription(args) => society::update_description(tx, ctx, args).await,
        JobSpec::UpdateSocietyRoleEmail(args) => society::update_role_email(tx, ctx, args).await,
        JobSpec::AddSocietyAdmin(args) => society::add_admin(tx, ctx, args).await,
        JobSpec::RemoveSocietyAdmin(args) => society::remove_admin(tx, ctx, args).await,
        JobSpec::RenameSociety(args) => society::rename(tx, ctx, args).await,
        JobSpec::AddVhost(args) => hosting::add_vhost(tx, ctx, args).await,
        JobSpec::ChangeVhostDocroot(args) => hosting::change_docroot(tx, ctx, args).await,
        JobSpec::RemoveVhost(args) => hosting::remove_vhost(tx, ctx, args).await,
        JobSpec::CreateMailingList(args) => lists::create(tx, ctx, args).await,
        JobSpec::ResetMailingListPassword(args) => lists::reset_password(tx, ctx, args).await,
        JobSpec::CreateDatabase(args) => databases::create(tx, ctx, args).await,
        JobSpec::DropDatabase(args) => databases::drop(tx, ctx, args).await,
        JobSpec::ResetDatabasePassword(args) => databases::reset_password(tx, ctx, args).await,
    }
}

fn precondition(message: impl Into<String>) -> JobError {
    JobError::Precondition(message.into())
}

// ---------------------------------------------------------------------------
// Subject lookups
// ---------------------------------------------------------------------------

/// The member, or a precondition violation when the record is missing.
async fn require_member(tx: &mut PgConnection, crsid: &str) -> Result<Member, JobError> {
    MemberRepo::find_by_crsid(&mut *tx, crsid)
        .await?
        .ok_or_else(|| precondition(format!("no member named {crsid}")))
}

/// The member in the `normal` status; anything else is a precondition
/// violation.
async fn require_active_member(tx: &mut PgConnection, crsid: &str) -> Result<Member, JobError> {
    let member = require_member(tx, crsid).await?;
    match member.status_id {
        id if id == MemberStatus::Normal.id() => Ok(member),
        id if id == MemberStatus::Cancelled.id() => {
            Err(precondition(format!("{crsid} is cancelled")))
        }
        _ => Err(precondition(format!("{crsid} has not completed signup"))),
    }
}

/// The society, or a precondition violation when the record is missing.
async fn require_society(tx: &mut PgConnection, name: &str) -> Result<Society, JobError> {
    SocietyRepo::find_by_name(&mut *tx, name)
        .await?
        .ok_or_else(|| precondition(format!("no society named {name}")))
}

/// The society in the `normal` status.
async fn require_active_society(tx: &mut PgConnection, name: &str) -> Result<Society, JobError> {
    let society = require_society(tx, name).await?;
    if society.status_id == MemberStatus::Normal.id() {
        Ok(society)
    } else {
        Err(precondition(format!("{name} is not an active society")))
    }
}

// ---------------------------------------------------------------------------
// Notification addressing
// ---------------------------------------------------------------------------

/// Address for mail to a society's admins: the role address when set,
/// otherwise the account's facility address.
fn society_email(society: &Society) -> String {
    society
        .role_email
        .clone()
        .unwrap_or_else(|| format!("{}@scf.net", society.name))
}

/// Resolved addressing for an [`Owner`], for jobs that work on either
/// kind of account. Owns its strings so templates can borrow them.
struct OwnerAccount {
    owner: Owner,
    display: String,
    email: String,
}

impl OwnerAccount {
    fn account(&self) -> Account<'_> {
        match self.owner.kind {
            OwnerKind::Member => Account::Member(MemberMail {
                crsid: &self.owner.name,
                name: &self.display,
                email: &self.email,
            }),
            OwnerKind::Society => Account::Society(SocietyMail {
                name: &self.owner.name,
                description: &self.display,
                email: &self.email,
            }),
        }
    }
}

/// Look up an owner and require it to be an active account.
async fn require_active_owner(
    tx: &mut PgConnection,
    owner: &Owner,
) -> Result<OwnerAccount, JobError> {
    match owner.kind {
        OwnerKind::Member => {
            let member = require_active_member(tx, &owner.name).await?;
            Ok(OwnerAccount {
                owner: owner.clone(),
                display: member.display_name(),
                email: member.email,
            })
        }
        OwnerKind::Society => {
            let society = require_active_society(tx, &owner.name).await?;
            let email = society_email(&society);
            Ok(OwnerAccount {
                owner: owner.clone(),
                display: society.description,
                email,
            })
        }
    }
}
