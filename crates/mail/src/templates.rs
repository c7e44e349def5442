//! One function per notification, producing a ready-to-send [`Outgoing`].
//!
//! Bodies are plain text composed with [`layout::wrap`], so every mail
//! carries the standard salutation and signature. Subjects are left
//! unprefixed; the notifier adds the facility tag on delivery.
//! Society-owned notifications lead the subject with the society name so
//! shared-account admins can filter them.

use scf_core::{Owner, Password};

use crate::layout;
use crate::message::{Outgoing, Recipient};

/// Addressing details for a member, taken from the membership records.
#[derive(Debug, Clone, Copy)]
pub struct MemberMail<'a> {
    pub crsid: &'a str,
    pub name: &'a str,
    pub email: &'a str,
}

impl MemberMail<'_> {
    fn recipient(&self) -> Recipient {
        Recipient::new(self.name, self.email)
    }
}

/// Addressing details for a society account. Mail goes to the society's
/// role address and greets the admins collectively.
#[derive(Debug, Clone, Copy)]
pub struct SocietyMail<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub email: &'a str,
}

impl SocietyMail<'_> {
    fn admins(&self) -> String {
        format!("{} Admins", self.description)
    }

    fn recipient(&self) -> Recipient {
        Recipient::new(self.admins(), self.email)
    }
}

/// The account a notification concerns.
#[derive(Debug, Clone, Copy)]
pub enum Account<'a> {
    Member(MemberMail<'a>),
    Society(SocietyMail<'a>),
}

impl Account<'_> {
    fn recipient(&self) -> Recipient {
        match self {
            Account::Member(member) => member.recipient(),
            Account::Society(society) => society.recipient(),
        }
    }

    fn greeting(&self) -> String {
        match self {
            Account::Member(member) => member.name.to_owned(),
            Account::Society(society) => society.admins(),
        }
    }

    fn subject(&self, line: &str) -> String {
        match self {
            Account::Member(_) => line.to_owned(),
            Account::Society(society) => format!("{}: {line}", society.name),
        }
    }

    fn possessive(&self) -> &'static str {
        match self {
            Account::Member(_) => "your website",
            Account::Society(_) => "the account's website",
        }
    }
}

fn to_account(account: &Account<'_>, subject: &str, body: &str) -> Outgoing {
    Outgoing::new(
        vec![account.recipient()],
        account.subject(subject),
        layout::wrap(&account.greeting(), body),
    )
}

// ---------------------------------------------------------------------------
// Member accounts
// ---------------------------------------------------------------------------

/// Welcome mail for a freshly provisioned personal account.
pub fn signup(member: MemberMail<'_>, password: &Password) -> Outgoing {
    let website = Owner::member(member.crsid).website_domain();
    let body = format!(
        "Welcome to the SCF. Your account has been created and is ready to \
         use.\n\n  Username: {}\n  Password: {}\n\nLog in via SSH to \
         shell.scf.net and change this password straight away with the \
         passwd command. Files you publish in your public_html directory \
         appear at https://{}/.\n\nIf you did not request this account, \
         reply to this email and let us know.",
        member.crsid,
        password.reveal(),
        website,
    );
    Outgoing::new(
        vec![member.recipient()],
        "Your SCF account",
        layout::wrap(member.name, &body),
    )
}

/// Reactivation notice, sent to the member's updated contact address.
pub fn reactivated(member: MemberMail<'_>, password: &Password) -> Outgoing {
    let body = format!(
        "Your SCF account has been reactivated and your contact address \
         updated to {}. A new password has been set:\n\n  Password: {}\n\n\
         Change it after your next login with the passwd command.",
        member.email,
        password.reveal(),
    );
    Outgoing::new(
        vec![member.recipient()],
        "Account reactivated",
        layout::wrap(member.name, &body),
    )
}

pub fn password_reset(member: MemberMail<'_>, password: &Password) -> Outgoing {
    let body = format!(
        "The password for your SCF account {} has been reset:\n\n  \
         Password: {}\n\nChange it after your next login with the passwd \
         command.",
        member.crsid,
        password.reveal(),
    );
    Outgoing::new(
        vec![member.recipient()],
        "Password reset",
        layout::wrap(member.name, &body),
    )
}

/// Cancellation notice. Copied to the sysadmins as an audit record.
pub fn cancelled(member: MemberMail<'_>) -> Outgoing {
    let body = format!(
        "Your SCF account {} has been cancelled. Login and website hosting \
         are now disabled, and mail to your {}@scf.net address is no longer \
         delivered.\n\nYour files remain on our systems for the time being. \
         Contact us if you need anything recovered, or if this cancellation \
         is unexpected.",
        member.crsid, member.crsid,
    );
    Outgoing::new(
        vec![member.recipient()],
        "Account cancelled",
        layout::wrap(member.name, &body),
    )
    .with_sysadmins_copy()
}

pub fn name_updated(member: MemberMail<'_>, old_name: &str) -> Outgoing {
    let body = format!(
        "The name recorded for your SCF account has been updated from {} to \
         {}.\n\nIf this change is unexpected, contact us by replying to \
         this email.",
        old_name, member.name,
    );
    Outgoing::new(
        vec![member.recipient()],
        "Name updated",
        layout::wrap(member.name, &body),
    )
}

/// Sent to the new contact address once it takes effect.
pub fn email_updated(member: MemberMail<'_>, old_email: &str) -> Outgoing {
    let body = format!(
        "The contact address for your SCF account has been updated from {} \
         to {}.\n\nIf this change is unexpected, contact us by replying to \
         this email.",
        old_email, member.email,
    );
    Outgoing::new(
        vec![member.recipient()],
        "Email address updated",
        layout::wrap(member.name, &body),
    )
}

pub fn mail_handler_updated(member: MemberMail<'_>, handler: &str) -> Outgoing {
    let body = format!(
        "Delivery for your {}@scf.net address has been switched to the {} \
         handler. Allow a few minutes for the mail servers to pick up the \
         change.",
        member.crsid, handler,
    );
    Outgoing::new(
        vec![member.recipient()],
        "Email handling updated",
        layout::wrap(member.name, &body),
    )
}

// ---------------------------------------------------------------------------
// Society accounts
// ---------------------------------------------------------------------------

/// Welcome mail for a new shared account, sent to its role address.
pub fn society_created(society: SocietyMail<'_>) -> Outgoing {
    let website = Owner::society(society.name).website_domain();
    let body = format!(
        "The shared SCF account {} ({}) has been created, and each of its \
         admins can manage it with their own credentials.\n\nFiles \
         published in the account's public_html directory appear at \
         https://{}/.",
        society.name, society.description, website,
    );
    Outgoing::new(
        vec![society.recipient()],
        format!("{}: New shared account created", society.name),
        layout::wrap(&society.admins(), &body),
    )
}

pub fn society_description_updated(society: SocietyMail<'_>) -> Outgoing {
    let body = format!(
        "The description of {} has been updated to:\n\n  {}",
        society.name, society.description,
    );
    Outgoing::new(
        vec![society.recipient()],
        format!("{}: Description updated", society.name),
        layout::wrap(&society.admins(), &body),
    )
}

/// Sent to the new role address once it takes effect.
pub fn society_role_email_updated(society: SocietyMail<'_>, old_email: &str) -> Outgoing {
    let body = format!(
        "The contact address for {} has been updated from {} to {}.",
        society.name, old_email, society.email,
    );
    Outgoing::new(
        vec![society.recipient()],
        format!("{}: Role email updated", society.name),
        layout::wrap(&society.admins(), &body),
    )
}

/// Tells a member they now administer a shared account.
pub fn admin_joined(member: MemberMail<'_>, society: SocietyMail<'_>) -> Outgoing {
    let body = format!(
        "You have been added as an admin of the shared account {} ({}). \
         You can now manage its files, websites and databases using your \
         own account.",
        society.name, society.description,
    );
    Outgoing::new(
        vec![member.recipient()],
        format!("Access granted to {}", society.name),
        layout::wrap(member.name, &body),
    )
}

/// Tells the existing admins about the new arrival.
pub fn admin_added(society: SocietyMail<'_>, member: MemberMail<'_>) -> Outgoing {
    let body = format!(
        "{} ({}) has been added as an admin of {} and can now manage the \
         account.",
        member.name, member.crsid, society.name,
    );
    Outgoing::new(
        vec![society.recipient()],
        format!("{}: Access granted for {}", society.name, member.crsid),
        layout::wrap(&society.admins(), &body),
    )
}

pub fn admin_left(member: MemberMail<'_>, society: SocietyMail<'_>) -> Outgoing {
    let body = format!(
        "Your admin access to the shared account {} has been removed.",
        society.name,
    );
    Outgoing::new(
        vec![member.recipient()],
        format!("Access removed from {}", society.name),
        layout::wrap(member.name, &body),
    )
}

pub fn admin_removed(society: SocietyMail<'_>, member: MemberMail<'_>) -> Outgoing {
    let body = format!(
        "{} ({}) is no longer an admin of {}.",
        member.name, member.crsid, society.name,
    );
    Outgoing::new(
        vec![society.recipient()],
        format!("{}: Access removed for {}", society.name, member.crsid),
        layout::wrap(&society.admins(), &body),
    )
}

/// Rename notice naming both identifiers. Copied to the sysadmins as an
/// audit record.
pub fn society_renamed(society: SocietyMail<'_>, old_name: &str) -> Outgoing {
    let website = Owner::society(society.name).website_domain();
    let body = format!(
        "The shared account previously named {} is now {}. Its home \
         directory, website address and database names have been updated \
         to match, and the account's website is now served at https://{}/. \
         The old address no longer resolves.",
        old_name, society.name, website,
    );
    Outgoing::new(
        vec![society.recipient()],
        format!("{}: Shared account renamed", society.name),
        layout::wrap(&society.admins(), &body),
    )
    .with_sysadmins_copy()
}

// ---------------------------------------------------------------------------
// Custom domains
// ---------------------------------------------------------------------------

pub fn vhost_added(account: Account<'_>, domain: &str, root: &str) -> Outgoing {
    let body = format!(
        "The custom domain {} has been attached to {} and requests for it \
         are served from the {} directory.\n\nAn HTTPS certificate will be \
         issued automatically once the domain resolves to our web servers.",
        domain,
        account.possessive(),
        root,
    );
    to_account(&account, "Custom domain added", &body)
}

pub fn vhost_docroot_changed(account: Account<'_>, domain: &str, root: &str) -> Outgoing {
    let body = format!(
        "Requests for {} are now served from the {} directory.",
        domain, root,
    );
    to_account(&account, "Custom domain document root changed", &body)
}

pub fn vhost_removed(account: Account<'_>, domain: &str) -> Outgoing {
    let body = format!(
        "The custom domain {} has been detached from {} and requests for \
         it are no longer served.",
        domain,
        account.possessive(),
    );
    to_account(&account, "Custom domain removed", &body)
}

// ---------------------------------------------------------------------------
// Mailing lists
// ---------------------------------------------------------------------------

pub fn list_created(account: Account<'_>, listname: &str, password: &Password) -> Outgoing {
    let body = format!(
        "The mailing list {} has been created. Manage it at \
         https://lists.scf.net/ with the list password:\n\n  Password: {}",
        listname,
        password.reveal(),
    );
    to_account(&account, "Mailing list created", &body)
}

pub fn list_password_reset(account: Account<'_>, listname: &str, password: &Password) -> Outgoing {
    let body = format!(
        "The admin password for the mailing list {} has been reset:\n\n  \
         Password: {}",
        listname,
        password.reveal(),
    );
    to_account(&account, "Mailing list password reset", &body)
}

// ---------------------------------------------------------------------------
// Databases
// ---------------------------------------------------------------------------

/// Database creation notice. `password` is set when a database account
/// was created alongside, and absent when the existing account password
/// still applies.
pub fn database_created(
    account: Account<'_>,
    engine: &str,
    database: &str,
    username: &str,
    password: Option<&Password>,
) -> Outgoing {
    let credentials = match password {
        Some(password) => format!(
            "  Username: {}\n  Password: {}",
            username,
            password.reveal(),
        ),
        None => format!(
            "  Username: {}\n\nYour existing {} password is unchanged.",
            username, engine,
        ),
    };
    let body = format!(
        "A {} database named {} has been created for you.\n\n{}\n\nConnect \
         from any shell server with the usual client tools.",
        engine, database, credentials,
    );
    to_account(&account, &format!("{engine} database created"), &body)
}

pub fn database_dropped(account: Account<'_>, engine: &str, database: &str) -> Outgoing {
    let body = format!(
        "The {} database {} has been dropped and its contents deleted. \
         Your cluster account and any other databases are unaffected.",
        engine, database,
    );
    to_account(&account, &format!("{engine} database dropped"), &body)
}

pub fn database_password_reset(
    account: Account<'_>,
    engine: &str,
    username: &str,
    password: &Password,
) -> Outgoing {
    let body = format!(
        "The password for your {} account {} has been reset:\n\n  \
         Password: {}",
        engine,
        username,
        password.reveal(),
    );
    to_account(&account, &format!("{engine} password reset"), &body)
}

// ---------------------------------------------------------------------------
// Approval
// ---------------------------------------------------------------------------

/// Asks the sysadmins to review a held job.
pub fn approval_request(job_id: i64, kind: &str, actor: &str) -> Outgoing {
    let body = format!(
        "Job #{} ({}), submitted by {}, needs a sysadmin's review before \
         it runs.\n\nApprove it with:\n\n  \
         scf-admin job approve {}\n\nor abandon it with:\n\n  scf-admin job \
         withdraw {}",
        job_id, kind, actor, job_id, job_id,
    );
    Outgoing::new(
        vec![Recipient::sysadmins()],
        format!("Job #{job_id} awaiting approval"),
        layout::wrap("Sysadmins", &body),
    )
}
