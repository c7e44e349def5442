//! Job submission.
//!
//! Validates arguments, decides whether the job needs sysadmin
//! approval, and writes the row with its created log entry. Held jobs
//! trigger a best-effort approval request to the sysadmins address.

use validator::ValidateEmail;

use scf_core::{naming, Owner, OwnerKind};
use scf_db::models::job::{Job, SubmitJob};
use scf_db::models::status::{JobState, LogLevel};
use scf_db::repositories::{JobRepo, MemberRepo, SocietyRepo};
use scf_db::DbPool;
use scf_mail::{templates, Notifier};
use scf_system::SystemBackend;

use crate::error::JobError;
use crate::spec::JobSpec;

/// Validate, record, and (when needed) hold a job for approval.
///
/// `actor` is the requesting member; `None` marks a self-service signup
/// application. The returned row carries the initial state: `queued`,
/// or `unapproved` when a sysadmin must look first.
pub async fn submit(
    pool: &DbPool,
    backend: &dyn SystemBackend,
    notifier: &dyn Notifier,
    spec: &JobSpec,
    actor: Option<&str>,
    environment: &str,
) -> Result<Job, JobError> {
    validate(spec)?;
    let requires_approval = approval_required(pool, backend, spec).await?;

    let job = JobRepo::submit(
        pool,
        &SubmitJob {
            kind: spec.kind().to_string(),
            actor_crsid: actor.map(str::to_string),
            args: spec.args()?,
            environment: environment.to_string(),
            requires_approval,
        },
    )
    .await?;

    let created = format!(
        "Job created by {}: {}",
        actor.unwrap_or("self-service"),
        spec.describe()
    );
    JobRepo::append_log(pool, job.id, LogLevel::Info, &created, None).await?;
    tracing::info!(job_id = job.id, kind = %job.kind, held = requires_approval, "Job submitted");

    if job.state_id == JobState::Unapproved.id() {
        let request =
            templates::approval_request(job.id, spec.kind(), actor.unwrap_or("self-service"));
        if let Err(err) = notifier.send(&request).await {
            tracing::warn!(job_id = job.id, error = %err, "Approval request send failed");
            let note = format!("Approval request notification failed: {err}");
            JobRepo::append_log(pool, job.id, LogLevel::Warning, &note, None).await?;
        }
    }

    Ok(job)
}

fn bad(message: impl Into<String>) -> JobError {
    JobError::BadArgs(message.into())
}

fn check_crsid(crsid: &str) -> Result<(), JobError> {
    if naming::is_crsid(crsid) {
        Ok(())
    } else {
        Err(bad(format!("invalid crsid: {crsid:?}")))
    }
}

fn check_society_name(name: &str) -> Result<(), JobError> {
    if naming::is_society_name(name) {
        Ok(())
    } else {
        Err(bad(format!("invalid society name: {name:?}")))
    }
}

fn check_owner(owner: &Owner) -> Result<(), JobError> {
    match owner.kind {
        OwnerKind::Member => check_crsid(&owner.name),
        OwnerKind::Society => check_society_name(&owner.name),
    }
}

fn check_email(email: &str) -> Result<(), JobError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(bad(format!("invalid email address: {email:?}")))
    }
}

fn check_name_part(label: &str, value: &str) -> Result<(), JobError> {
    if value.trim().is_empty() {
        Err(bad(format!("{label} must not be empty")))
    } else {
        Ok(())
    }
}

fn check_hostname(domain: &str) -> Result<(), JobError> {
    if naming::is_hostname(domain) {
        Ok(())
    } else {
        Err(bad(format!("invalid domain name: {domain:?}")))
    }
}

/// Docroots are paths under the owner's web tree: relative, no parent
/// traversal.
fn check_docroot(docroot: &Option<String>) -> Result<(), JobError> {
    match docroot {
        None => Ok(()),
        Some(path)
            if !path.is_empty()
                && !path.starts_with('/')
                && path.split('/').all(|part| !part.is_empty() && part != "..") =>
        {
            Ok(())
        }
        Some(path) => Err(bad(format!("invalid docroot: {path:?}"))),
    }
}

fn check_db_suffix(suffix: &Option<String>) -> Result<(), JobError> {
    match suffix {
        None => Ok(()),
        Some(s)
            if !s.is_empty()
                && s.len() <= 16
                && s.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') =>
        {
            Ok(())
        }
        Some(s) => Err(bad(format!("invalid database suffix: {s:?}"))),
    }
}

/// Reject malformed arguments before a row is written. Everything here
/// is syntactic; preconditions against live entity state belong to the
/// run.
pub fn validate(spec: &JobSpec) -> Result<(), JobError> {
    match spec {
        JobSpec::Signup(a) => {
            check_crsid(&a.crsid)?;
            check_name_part("preferred name", &a.preferred_name)?;
            check_name_part("surname", &a.surname)?;
            check_email(&a.email)
        }
        JobSpec::Reactivate(a) => {
            check_crsid(&a.crsid)?;
            check_email(&a.email)
        }
        JobSpec::CancelMember(a) | JobSpec::ResetUserPassword(a) => check_crsid(&a.crsid),
        JobSpec::UpdateName(a) => {
            check_crsid(&a.crsid)?;
            check_name_part("preferred name", &a.preferred_name)?;
            check_name_part("surname", &a.surname)
        }
        JobSpec::UpdateEmailAddress(a) => {
            check_crsid(&a.crsid)?;
            check_email(&a.email)
        }
        JobSpec::UpdateMailHandler(a) => check_crsid(&a.crsid),
        JobSpec::CreateSociety(a) => {
            check_society_name(&a.name)?;
            check_name_part("description", &a.description)?;
            if a.admins.is_empty() {
                return Err(bad("a society needs at least one admin"));
            }
            for crsid in &a.admins {
                check_crsid(crsid)?;
            }
            Ok(())
        }
        JobSpec::UpdateSocietyDescription(a) => {
            check_society_name(&a.society)?;
            check_name_part("description", &a.description)
        }
        JobSpec::UpdateSocietyRoleEmail(a) => {
            check_society_name(&a.society)?;
            match &a.email {
                Some(email) => check_email(email),
                None => Ok(()),
            }
        }
        JobSpec::AddSocietyAdmin(a) | JobSpec::RemoveSocietyAdmin(a) => {
            check_society_name(&a.society)?;
            check_crsid(&a.target_crsid)
        }
        JobSpec::RenameSociety(a) => {
            check_society_name(&a.society)?;
            check_society_name(&a.new_name)?;
            if a.society == a.new_name {
                return Err(bad("the new name matches the current name"));
            }
            Ok(())
        }
        JobSpec::AddVhost(a) => {
            check_owner(&a.owner)?;
            check_hostname(&a.domain)?;
            check_docroot(&a.docroot)
        }
        JobSpec::ChangeVhostDocroot(a) => {
            check_owner(&a.owner)?;
            check_hostname(&a.domain)?;
            check_docroot(&a.docroot)
        }
        JobSpec::RemoveVhost(a) => {
            check_owner(&a.owner)?;
            check_hostname(&a.domain)
        }
        JobSpec::CreateMailingList(a) | JobSpec::ResetMailingListPassword(a) => {
            check_owner(&a.owner)?;
            if naming::is_list_suffix(&a.suffix) {
                Ok(())
            } else {
                Err(bad(format!("invalid list suffix: {:?}", a.suffix)))
            }
        }
        JobSpec::CreateDatabase(a) => {
            check_owner(&a.owner)?;
            check_db_suffix(&a.suffix)
        }
        JobSpec::DropDatabase(a) => {
            check_owner(&a.owner)?;
            check_db_suffix(&a.suffix)
        }
        JobSpec::ResetDatabasePassword(a) => check_owner(&a.owner),
    }
}

/// Whether the job starts held for sysadmin approval.
///
/// Dangerous accounts hold every job touching them. Two kinds have
/// their own rules: a signup whose CRSid the university directory does
/// not know is held for a human look, and `add_vhost` is always held
/// because domain ownership cannot be validated here.
async fn approval_required(
    pool: &DbPool,
    backend: &dyn SystemBackend,
    spec: &JobSpec,
) -> Result<bool, JobError> {
    match spec {
        JobSpec::Signup(a) => match backend.lookup_person(&a.crsid).await {
            Ok(person) => Ok(person.is_none()),
            // Directory unavailable: hold the job rather than guessing.
            Err(err) => {
                tracing::warn!(crsid = %a.crsid, error = %err, "Directory lookup failed; holding signup");
                Ok(true)
            }
        },
        JobSpec::AddVhost(_) => Ok(true),
        _ => match spec.subject() {
            Some(owner) => subject_is_dangerous(pool, &owner).await,
            None => Ok(false),
        },
    }
}

async fn subject_is_dangerous(pool: &DbPool, owner: &Owner) -> Result<bool, JobError> {
    let danger = match owner.kind {
        OwnerKind::Member => MemberRepo::find_by_crsid(pool, &owner.name)
            .await?
            .map(|m| m.danger),
        OwnerKind::Society => SocietyRepo::find_by_name(pool, &owner.name)
            .await?
            .map(|s| s.danger),
    };
    // A missing subject is queued as-is; the run reports the
    // precondition violation with full logging.
    Ok(danger.unwrap_or(false))
}
