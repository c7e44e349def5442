//! The typed job catalogue.
//!
//! Every administrative action is one [`JobSpec`] variant with a typed
//! argument struct. Job rows store the kind string plus the arguments
//! serialized to JSON; [`JobSpec::from_job`] turns a claimed row back
//! into the typed form, rejecting kinds this build does not know.

use scf_core::{MailHandler, Owner};
use scf_db::models::job::Job;
use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Database engine selector for provisioning jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Mysql,
    Postgres,
}

impl Engine {
    /// Tag as stored on grant rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Mysql => "mysql",
            Engine::Postgres => "postgres",
        }
    }
}

// ---------------------------------------------------------------------------
// Argument structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupArgs {
    pub crsid: String,
    pub preferred_name: String,
    pub surname: String,
    pub email: String,
    pub mail_handler: MailHandler,
    /// Subscribe the new member to the social list as well as the
    /// maintenance announcements.
    pub social: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactivateArgs {
    pub crsid: String,
    /// Fresh contact address; the stored one is assumed stale.
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberArgs {
    pub crsid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNameArgs {
    pub crsid: String,
    pub preferred_name: String,
    pub surname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEmailArgs {
    pub crsid: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMailHandlerArgs {
    pub crsid: String,
    pub mail_handler: MailHandler,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSocietyArgs {
    pub name: String,
    pub description: String,
    /// Initial admin crsids; must include the requesting member.
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSocietyDescriptionArgs {
    pub society: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSocietyRoleEmailArgs {
    pub society: String,
    /// `None` clears the role address.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocietyAdminArgs {
    pub society: String,
    pub target_crsid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameSocietyArgs {
    pub society: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddVhostArgs {
    pub owner: Owner,
    pub domain: String,
    /// Path under the owner's web tree; `None` serves the default root.
    pub docroot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeVhostDocrootArgs {
    pub owner: Owner,
    pub domain: String,
    pub docroot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveVhostArgs {
    pub owner: Owner,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListArgs {
    pub owner: Owner,
    /// Suffix after `owner-`; the full list name is composed at run.
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatabaseArgs {
    pub owner: Owner,
    pub engine: Engine,
    /// Optional suffix for a secondary `owner/suffix` database.
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropDatabaseArgs {
    pub owner: Owner,
    pub engine: Engine,
    /// `None` drops the primary `owner` database.
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetDatabasePasswordArgs {
    pub owner: Owner,
    pub engine: Engine,
}

// ---------------------------------------------------------------------------
// JobSpec
// ---------------------------------------------------------------------------

/// One administrative action, fully typed.
#[derive(Debug, Clone)]
pub enum JobSpec {
    Signup(SignupArgs),
    Reactivate(ReactivateArgs),
    CancelMember(MemberArgs),
    ResetUserPassword(MemberArgs),
    UpdateName(UpdateNameArgs),
    UpdateEmailAddress(UpdateEmailArgs),
    UpdateMailHandler(UpdateMailHandlerArgs),
    CreateSociety(CreateSocietyArgs),
    UpdateSocietyDescription(UpdateSocietyDescriptionArgs),
    UpdateSocietyRoleEmail(UpdateSocietyRoleEmailArgs),
    AddSocietyAdmin(SocietyAdminArgs),
    RemoveSocietyAdmin(SocietyAdminArgs),
    RenameSociety(RenameSocietyArgs),
    AddVhost(AddVhostArgs),
    ChangeVhostDocroot(ChangeVhostDocrootArgs),
    RemoveVhost(RemoveVhostArgs),
    CreateMailingList(ListArgs),
    ResetMailingListPassword(ListArgs),
    CreateDatabase(CreateDatabaseArgs),
    DropDatabase(DropDatabaseArgs),
    ResetDatabasePassword(ResetDatabasePasswordArgs),
}

impl JobSpec {
    /// The kind string stored on the job row.
    pub fn kind(&self) -> &'static str {
        match self {
            JobSpec::Signup(_) => "signup",
            JobSpec::Reactivate(_) => "reactivate",
            JobSpec::CancelMember(_) => "cancel_member",
            JobSpec::ResetUserPassword(_) => "reset_user_password",
            JobSpec::UpdateName(_) => "update_name",
            JobSpec::UpdateEmailAddress(_) => "update_email_address",
            JobSpec::UpdateMailHandler(_) => "update_mail_handler",
            JobSpec::CreateSociety(_) => "create_society",
            JobSpec::UpdateSocietyDescription(_) => "update_society_description",
            JobSpec::UpdateSocietyRoleEmail(_) => "update_society_role_email",
            JobSpec::AddSocietyAdmin(_) => "add_society_admin",
            JobSpec::RemoveSocietyAdmin(_) => "remove_society_admin",
            JobSpec::RenameSociety(_) => "rename_society",
            JobSpec::AddVhost(_) => "add_vhost",
            JobSpec::ChangeVhostDocroot(_) => "change_vhost_docroot",
            JobSpec::RemoveVhost(_) => "remove_vhost",
            JobSpec::CreateMailingList(_) => "create_mailing_list",
            JobSpec::ResetMailingListPassword(_) => "reset_mailing_list_password",
            JobSpec::CreateDatabase(_) => "create_database",
            JobSpec::DropDatabase(_) => "drop_database",
            JobSpec::ResetDatabasePassword(_) => "reset_database_password",
        }
    }

    /// Serialize the arguments for storage on the job row.
    pub fn args(&self) -> Result<serde_json::Value, JobError> {
        let encode = |r: Result<serde_json::Value, serde_json::Error>| {
            r.map_err(|e| JobError::BadArgs(e.to_string()))
        };
        match self {
            JobSpec::Signup(a) => encode(serde_json::to_value(a)),
            JobSpec::Reactivate(a) => encode(serde_json::to_value(a)),
            JobSpec::CancelMember(a) => encode(serde_json::to_value(a)),
            JobSpec::ResetUserPassword(a) => encode(serde_json::to_value(a)),
            JobSpec::UpdateName(a) => encode(serde_json::to_value(a)),
            JobSpec::UpdateEmailAddress(a) => encode(serde_json::to_value(a)),
            JobSpec::UpdateMailHandler(a) => encode(serde_json::to_value(a)),
            JobSpec::CreateSociety(a) => encode(serde_json::to_value(a)),
            JobSpec::UpdateSocietyDescription(a) => encode(serde_json::to_value(a)),
            JobSpec::UpdateSocietyRoleEmail(a) => encode(serde_json::to_value(a)),
            JobSpec::AddSocietyAdmin(a) => encode(serde_json::to_value(a)),
            JobSpec::RemoveSocietyAdmin(a) => encode(serde_json::to_value(a)),
            JobSpec::RenameSociety(a) => encode(serde_json::to_value(a)),
            JobSpec::AddVhost(a) => encode(serde_json::to_value(a)),
            JobSpec::ChangeVhostDocroot(a) => encode(serde_json::to_value(a)),
            JobSpec::RemoveVhost(a) => encode(serde_json::to_value(a)),
            JobSpec::CreateMailingList(a) => encode(serde_json::to_value(a)),
            JobSpec::ResetMailingListPassword(a) => encode(serde_json::to_value(a)),
            JobSpec::CreateDatabase(a) => encode(serde_json::to_value(a)),
            JobSpec::DropDatabase(a) => encode(serde_json::to_value(a)),
            JobSpec::ResetDatabasePassword(a) => encode(serde_json::to_value(a)),
        }
    }

    /// Parse a stored job row back into its typed form.
    pub fn from_job(job: &Job) -> Result<JobSpec, JobError> {
        fn parse<T: serde::de::DeserializeOwned>(
            args: &serde_json::Value,
        ) -> Result<T, JobError> {
            serde_json::from_value(args.clone()).map_err(|e| JobError::BadArgs(e.to_string()))
        }

        let spec = match job.kind.as_str() {
            "signup" => JobSpec::Signup(parse(&job.args)?),
            "reactivate" => JobSpec::Reactivate(parse(&job.args)?),
            "cancel_member" => JobSpec::CancelMember(parse(&job.args)?),
            "reset_user_password" => JobSpec::ResetUserPassword(parse(&job.args)?),
            "update_name" => JobSpec::UpdateName(parse(&job.args)?),
            "update_email_address" => JobSpec::UpdateEmailAddress(parse(&job.args)?),
            "update_mail_handler" => JobSpec::UpdateMailHandler(parse(&job.args)?),
            "create_society" => JobSpec::CreateSociety(parse(&job.args)?),
            "update_society_description" => JobSpec::UpdateSocietyDescription(parse(&job.args)?),
            "update_society_role_email" => JobSpec::UpdateSocietyRoleEmail(parse(&job.args)?),
            "add_society_admin" => JobSpec::AddSocietyAdmin(parse(&job.args)?),
            "remove_society_admin" => JobSpec::RemoveSocietyAdmin(parse(&job.args)?),
            "rename_society" => JobSpec::RenameSociety(parse(&job.args)?),
            "add_vhost" => JobSpec::AddVhost(parse(&job.args)?),
            "change_vhost_docroot" => JobSpec::ChangeVhostDocroot(parse(&job.args)?),
            "remove_vhost" => JobSpec::RemoveVhost(parse(&job.args)?),
            "create_mailing_list" => JobSpec::CreateMailingList(parse(&job.args)?),
            "reset_mailing_list_password" => JobSpec::ResetMailingListPassword(parse(&job.args)?),
            "create_database" => JobSpec::CreateDatabase(parse(&job.args)?),
            "drop_database" => JobSpec::DropDatabase(parse(&job.args)?),
            "reset_database_password" => JobSpec::ResetDatabasePassword(parse(&job.args)?),
            other => return Err(JobError::UnknownKind(other.to_string())),
        };
        Ok(spec)
    }

    /// The account this job operates on, when it exists before the run.
    ///
    /// Signup has no subject (the member record does not exist yet);
    /// everything else names one, and its danger flag feeds the
    /// approval decision.
    pub fn subject(&self) -> Option<Owner> {
        match self {
            JobSpec::Signup(_) => None,
            JobSpec::Reactivate(a) => Some(Owner::member(&a.crsid)),
            JobSpec::CancelMember(a) | JobSpec::ResetUserPassword(a) => {
                Some(Owner::member(&a.crsid))
            }
            JobSpec::UpdateName(a) => Some(Owner::member(&a.crsid)),
            JobSpec::UpdateEmailAddress(a) => Some(Owner::member(&a.crsid)),
            JobSpec::UpdateMailHandler(a) => Some(Owner::member(&a.crsid)),
            JobSpec::CreateSociety(_) => None,
            JobSpec::UpdateSocietyDescription(a) => Some(Owner::society(&a.society)),
            JobSpec::UpdateSocietyRoleEmail(a) => Some(Owner::society(&a.society)),
            JobSpec::AddSocietyAdmin(a) | JobSpec::RemoveSocietyAdmin(a) => {
                Some(Owner::society(&a.society))
            }
            JobSpec::RenameSociety(a) => Some(Owner::society(&a.society)),
            JobSpec::AddVhost(a) => Some(a.owner.clone()),
            JobSpec::ChangeVhostDocroot(a) => Some(a.owner.clone()),
            JobSpec::RemoveVhost(a) => Some(a.owner.clone()),
            JobSpec::CreateMailingList(a) | JobSpec::ResetMailingListPassword(a) => {
                Some(a.owner.clone())
            }
            JobSpec::CreateDatabase(a) => Some(a.owner.clone()),
            JobSpec::DropDatabase(a) => Some(a.owner.clone()),
            JobSpec::ResetDatabasePassword(a) => Some(a.owner.clone()),
        }
    }

    /// One-line human description for listings.
    pub fn describe(&self) -> String {
        match self {
            JobSpec::Signup(a) => format!(
                "Signup: {} ({} {}, {})",
                a.crsid, a.preferred_name, a.surname, a.email
            ),
            JobSpec::Reactivate(a) => format!("Reactivate member: {} ({})", a.crsid, a.email),
            JobSpec::CancelMember(a) => format!("Cancel member: {}", a.crsid),
            JobSpec::ResetUserPassword(a) => format!("Reset password: {}", a.crsid),
            JobSpec::UpdateName(a) => format!(
                "Update name: {} ({} {})",
                a.crsid, a.preferred_name, a.surname
            ),
            JobSpec::UpdateEmailAddress(a) => {
                format!("Update email address: {} ({})", a.crsid, a.email)
            }
            JobSpec::UpdateMailHandler(a) => {
                format!("Update mail handler: {} ({})", a.crsid, a.mail_handler)
            }
            JobSpec::CreateSociety(a) => {
                format!("Create society: {} ({})", a.name, a.description)
            }
            JobSpec::UpdateSocietyDescription(a) => {
                format!("Update society description: {} ({})", a.society, a.description)
            }
            JobSpec::UpdateSocietyRoleEmail(a) => format!(
                "Update society role email: {} ({})",
                a.society,
                a.email.as_deref().unwrap_or("cleared")
            ),
            JobSpec::AddSocietyAdmin(a) => {
                format!("Add society admin: {} to {}", a.target_crsid, a.society)
            }
            JobSpec::RemoveSocietyAdmin(a) => {
                format!("Remove society admin: {} from {}", a.target_crsid, a.society)
            }
            JobSpec::RenameSociety(a) => {
                format!("Rename society: {} to {}", a.society, a.new_name)
            }
            JobSpec::AddVhost(a) => format!(
                "Add custom domain: {} ({} -> {})",
                a.owner.name,
                a.domain,
                a.docroot.as_deref().unwrap_or("default root")
            ),
            JobSpec::ChangeVhostDocroot(a) => format!(
                "Change custom domain root: {} ({} -> {})",
                a.owner.name,
                a.domain,
                a.docroot.as_deref().unwrap_or("default root")
            ),
            JobSpec::RemoveVhost(a) => {
                format!("Remove custom domain: {} ({})", a.owner.name, a.domain)
            }
            JobSpec::CreateMailingList(a) => {
                format!("Create mailing list: {}-{}", a.owner.name, a.suffix)
            }
            JobSpec::ResetMailingListPassword(a) => {
                format!("Reset mailing list password: {}-{}", a.owner.name, a.suffix)
            }
            JobSpec::CreateDatabase(a) => format!(
                "Create {} database: {}{}",
                a.engine.as_str(),
                a.owner.name,
                a.suffix
                    .as_deref()
                    .map(|s| format!("/{s}"))
                    .unwrap_or_default()
            ),
            JobSpec::DropDatabase(a) => format!(
                "Drop {} database: {}{}",
                a.engine.as_str(),
                a.owner.name,
                a.suffix
                    .as_deref()
                    .map(|s| format!("/{s}"))
                    .unwrap_or_default()
            ),
            JobSpec::ResetDatabasePassword(a) => {
                format!("Reset {} password: {}", a.engine.as_str(), a.owner.name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with(kind: &str, args: serde_json::Value) -> Job {
        Job {
            id: 1,
            kind: kind.to_string(),
            state_id: 2,
            actor_crsid: None,
            args,
            environment: "test".to_string(),
            state_message: None,
            created_at: chrono::Utc::now(),
            claimed_at: None,
            completed_at: None,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn args_round_trip_through_job_rows() {
        let spec = JobSpec::CreateDatabase(CreateDatabaseArgs {
            owner: Owner::society("chess"),
            engine: Engine::Postgres,
            suffix: Some("site".to_string()),
        });
        let job = job_with(spec.kind(), spec.args().unwrap());
        let parsed = JobSpec::from_job(&job).unwrap();
        assert_matches::assert_matches!(parsed, JobSpec::CreateDatabase(a) => {
            assert_eq!(a.owner, Owner::society("chess"));
            assert_eq!(a.engine, Engine::Postgres);
            assert_eq!(a.suffix.as_deref(), Some("site"));
        });
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        let job = job_with("defragment_coffee", serde_json::json!({}));
        assert_matches::assert_matches!(
            JobSpec::from_job(&job),
            Err(JobError::UnknownKind(kind)) => assert_eq!(kind, "defragment_coffee")
        );
    }

    #[test]
    fn malformed_args_are_bad_args() {
        let job = job_with("signup", serde_json::json!({"crsid": "ab123"}));
        assert_matches::assert_matches!(JobSpec::from_job(&job), Err(JobError::BadArgs(_)));
    }

    #[test]
    fn signup_has_no_subject() {
        let spec = JobSpec::Signup(SignupArgs {
            crsid: "ab123".to_string(),
            preferred_name: "Ada".to_string(),
            surname: "Bernoulli".to_string(),
            email: "ab123@example.test".to_string(),
            mail_handler: MailHandler::Forward,
            social: true,
        });
        assert_eq!(spec.subject(), None);
    }

    #[test]
    fn vhost_subject_is_the_owner() {
        let spec = JobSpec::AddVhost(AddVhostArgs {
            owner: Owner::member("ab123"),
            domain: "ada.example.org".to_string(),
            docroot: None,
        });
        assert_eq!(spec.subject(), Some(Owner::member("ab123")));
    }
}
