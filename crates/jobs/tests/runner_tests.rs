//! Runner contract tests against a real schema, with the host, cluster
//! and mail seams replaced by recording fakes.

mod support;

use std::sync::Arc;

use assert_matches::assert_matches;
use sqlx::PgPool;

use scf_core::{MailHandler, Owner};
use scf_db::models::member::UpdateMember;
use scf_db::models::status::{JobState, MemberStatus};
use scf_db::repositories::{DomainRepo, GrantRepo, HttpsCertRepo, JobRepo, MemberRepo, SocietyRepo};
use scf_jobs::spec::{
    AddVhostArgs, CreateDatabaseArgs, DropDatabaseArgs, ListArgs, MemberArgs, RenameSocietyArgs,
    SignupArgs,
};
use scf_jobs::{submit, Engine, JobError, JobOutcome, JobSpec, Runner};

use support::{seed_member, seed_society, FakeBackend, FakeCluster, RecordingNotifier};

struct Harness {
    pool: PgPool,
    backend: Arc<FakeBackend>,
    notifier: Arc<RecordingNotifier>,
    mysql: Arc<FakeCluster>,
    runner: Runner,
}

fn harness(pool: PgPool) -> Harness {
    let backend = Arc::new(FakeBackend::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let mysql = Arc::new(FakeCluster::mysql());
    let runner = Runner::new(pool.clone(), backend.clone(), notifier.clone())
        .with_mysql(mysql.clone());
    Harness {
        pool,
        backend,
        notifier,
        mysql,
        runner,
    }
}

impl Harness {
    async fn submit(&self, spec: JobSpec) -> scf_db::models::job::Job {
        submit(
            &self.pool,
            &*self.backend,
            &*self.notifier,
            &spec,
            Some("op123"),
            "test",
        )
        .await
        .unwrap()
    }

    async fn job(&self, id: i64) -> scf_db::models::job::Job {
        JobRepo::find_by_id(&self.pool, id).await.unwrap().unwrap()
    }
}

fn signup_spec(crsid: &str) -> JobSpec {
    JobSpec::Signup(SignupArgs {
        crsid: crsid.to_string(),
        preferred_name: "Ada".to_string(),
        surname: "Bernoulli".to_string(),
        email: format!("{crsid}@example.test"),
        mail_handler: MailHandler::Forward,
        social: false,
    })
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn signup_provisions_member(pool: PgPool) {
    let h = harness(pool);
    h.backend.add_person("ab123", "Ada Bernoulli");

    let job = h.submit(signup_spec("ab123")).await;
    assert_eq!(job.state_id, JobState::Queued.id());

    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Done);

    let member = MemberRepo::find_by_crsid(&h.pool, "ab123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.status_id, MemberStatus::Normal.id());
    assert!(member.uid.is_some());

    let sent = h.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("ab123"));
    assert_eq!(sent[0].to[0].email, "ab123@example.test");

    let job = h.job(job.id).await;
    assert_eq!(job.state_id, JobState::Done.id());
    assert_eq!(job.state_message.as_deref(), Some("member ab123 provisioned"));

    let logs = JobRepo::logs(&h.pool, job.id).await.unwrap();
    assert!(logs
        .iter()
        .any(|l| l.message.contains("UNIX account and home directories created")));

    let calls = h.backend.calls.lock().unwrap().clone();
    assert!(calls.contains(&"subscribe_to_list scf-announce ab123@example.test".to_string()));
    assert!(!calls
        .iter()
        .any(|c| c.starts_with("subscribe_to_list scf-social")));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn signup_of_existing_member_is_a_precondition(pool: PgPool) {
    let h = harness(pool);
    h.backend.add_person("ab123", "Ada Bernoulli");
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;

    let job = h.submit(signup_spec("ab123")).await;
    let submit_calls = h.backend.call_count();

    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::PreconditionFailed);

    // no external effect ran during the job itself
    assert_eq!(h.backend.call_count(), submit_calls);
    let job = h.job(job.id).await;
    assert_eq!(job.state_id, JobState::Failed.id());
    assert!(job
        .state_message
        .unwrap()
        .starts_with("precondition violated:"));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cancelling_a_cancelled_member_is_a_precondition(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Cancelled).await;

    let job = h
        .submit(JobSpec::CancelMember(MemberArgs {
            crsid: "ab123".to_string(),
        }))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();

    assert_eq!(outcome, JobOutcome::PreconditionFailed);
    assert_eq!(h.backend.call_count(), 0);
    assert!(h.notifier.sent.lock().unwrap().is_empty());

    let member = MemberRepo::find_by_crsid(&h.pool, "ab123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.status_id, MemberStatus::Cancelled.id());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cancellation_disables_login_and_copies_sysadmins(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;

    let job = h
        .submit(JobSpec::CancelMember(MemberArgs {
            crsid: "ab123".to_string(),
        }))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Done);

    let calls = h.backend.calls.lock().unwrap().clone();
    assert!(calls.contains(&"set_login ab123 enabled=false".to_string()));
    assert!(calls.contains(&"slay_sessions ab123".to_string()));

    let sent = h.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].copy_sysadmins);
}

// ---------------------------------------------------------------------------
// Notification failures
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn notification_failure_never_changes_the_outcome(pool: PgPool) {
    let h = harness(pool);
    h.backend.add_person("ab123", "Ada Bernoulli");
    h.notifier.fail_sends();

    let job = h.submit(signup_spec("ab123")).await;
    let outcome = h.runner.run_job(job.id).await.unwrap();

    assert_eq!(outcome, JobOutcome::Done);
    assert_eq!(h.job(job.id).await.state_id, JobState::Done.id());

    let logs = JobRepo::logs(&h.pool, job.id).await.unwrap();
    assert!(logs
        .iter()
        .any(|l| l.message.contains("Notification failed")));
}

// ---------------------------------------------------------------------------
// Society rename
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn society_rename_updates_rows_and_mails_both_names(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;
    seed_society(&h.pool, "oldname", "ab123").await;

    let job = h
        .submit(JobSpec::RenameSociety(RenameSocietyArgs {
            society: "oldname".to_string(),
            new_name: "newname".to_string(),
        }))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Done);

    assert!(SocietyRepo::find_by_name(&h.pool, "oldname")
        .await
        .unwrap()
        .is_none());
    assert!(SocietyRepo::find_by_name(&h.pool, "newname")
        .await
        .unwrap()
        .is_some());
    // admin rows follow the rename
    assert_eq!(
        SocietyRepo::admins(&h.pool, "newname").await.unwrap(),
        vec!["ab123".to_string()]
    );

    let sent = h.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("oldname"));
    assert!(sent[0].body.contains("newname"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn society_rename_host_failure_leaves_the_society_unchanged(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;
    seed_society(&h.pool, "oldname", "ab123").await;
    h.backend.fail_on("rename_account");

    let job = h
        .submit(JobSpec::RenameSociety(RenameSocietyArgs {
            society: "oldname".to_string(),
            new_name: "newname".to_string(),
        }))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Failed);

    // the transaction rolled back: the row rename never committed
    assert!(SocietyRepo::find_by_name(&h.pool, "oldname")
        .await
        .unwrap()
        .is_some());
    assert!(SocietyRepo::find_by_name(&h.pool, "newname")
        .await
        .unwrap()
        .is_none());

    let job = h.job(job.id).await;
    assert_eq!(job.state_id, JobState::Failed.id());
    assert!(job.state_message.unwrap().contains("injected failure"));
    assert!(h.notifier.sent.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Withdrawal and approval
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn withdrawn_jobs_never_run(pool: PgPool) {
    let h = harness(pool);
    h.backend.add_person("ab123", "Ada Bernoulli");

    let job = h.submit(signup_spec("ab123")).await;
    assert!(JobRepo::withdraw(&h.pool, job.id).await.unwrap());

    assert_matches!(h.runner.run_job(job.id).await, Err(JobError::State(_)));
    assert_eq!(h.job(job.id).await.state_id, JobState::Withdrawn.id());
    assert!(MemberRepo::find_by_crsid(&h.pool, "ab123")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dangerous_subjects_are_held_for_approval(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;
    MemberRepo::update(
        &h.pool,
        "ab123",
        &UpdateMember {
            danger: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let job = h
        .submit(JobSpec::CancelMember(MemberArgs {
            crsid: "ab123".to_string(),
        }))
        .await;
    assert_eq!(job.state_id, JobState::Unapproved.id());

    // the approval request went to the sysadmins
    let subjects = h.notifier.subjects();
    assert!(subjects.iter().any(|s| s.contains("awaiting approval")));

    // held jobs cannot be claimed until approved
    assert_matches!(h.runner.run_job(job.id).await, Err(JobError::State(_)));

    assert!(JobRepo::approve(&h.pool, job.id).await.unwrap());
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Done);
}

// ---------------------------------------------------------------------------
// Hosting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn vhost_jobs_are_always_held_then_provision_on_approval(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;

    let job = h
        .submit(JobSpec::AddVhost(AddVhostArgs {
            owner: Owner::member("ab123"),
            domain: "ada.example.org".to_string(),
            docroot: None,
        }))
        .await;
    assert_eq!(job.state_id, JobState::Unapproved.id());

    assert!(JobRepo::approve(&h.pool, job.id).await.unwrap());
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Done);

    assert!(DomainRepo::find_by_domain(&h.pool, "ada.example.org")
        .await
        .unwrap()
        .is_some());
    assert!(HttpsCertRepo::find_by_domain(&h.pool, "ada.example.org")
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Mailing lists
// ---------------------------------------------------------------------------

fn list_spec(owner: Owner, suffix: &str) -> ListArgs {
    ListArgs {
        owner,
        suffix: suffix.to_string(),
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn creating_an_existing_list_is_a_precondition(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;
    // already on the list server, whatever the membership schema thinks
    h.backend
        .lists
        .lock()
        .unwrap()
        .insert("ab123-members".to_string());

    let job = h
        .submit(JobSpec::CreateMailingList(list_spec(
            Owner::member("ab123"),
            "members",
        )))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::PreconditionFailed);

    let calls = h.backend.calls.lock().unwrap().clone();
    assert!(!calls.iter().any(|c| c.starts_with("create_list")));
    assert!(h.notifier.sent.lock().unwrap().is_empty());

    let job = h.job(job.id).await;
    assert_eq!(job.state_id, JobState::Failed.id());
    assert!(job
        .state_message
        .unwrap()
        .starts_with("precondition violated:"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_password_reset_mails_the_owner(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;

    let create = h
        .submit(JobSpec::CreateMailingList(list_spec(
            Owner::member("ab123"),
            "members",
        )))
        .await;
    assert_eq!(h.runner.run_job(create.id).await.unwrap(), JobOutcome::Done);
    assert!(h.backend.lists.lock().unwrap().contains("ab123-members"));

    let reset = h
        .submit(JobSpec::ResetMailingListPassword(list_spec(
            Owner::member("ab123"),
            "members",
        )))
        .await;
    assert_eq!(h.runner.run_job(reset.id).await.unwrap(), JobOutcome::Done);

    let sent = h.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].to[0].email, "ab123@example.test");
    assert!(sent[1].body.contains("ab123-members"));
    assert!(sent[1].body.contains("Password:"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn resetting_an_unowned_list_is_a_precondition(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;

    let job = h
        .submit(JobSpec::ResetMailingListPassword(list_spec(
            Owner::member("ab123"),
            "members",
        )))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::PreconditionFailed);

    let calls = h.backend.calls.lock().unwrap().clone();
    assert!(!calls.iter().any(|c| c.starts_with("reset_list_password")));
}

// ---------------------------------------------------------------------------
// Databases
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn database_creation_records_the_grant(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;
    seed_society(&h.pool, "chess-club", "ab123").await;

    let job = h
        .submit(JobSpec::CreateDatabase(CreateDatabaseArgs {
            owner: Owner::society("chess-club"),
            engine: Engine::Mysql,
            suffix: None,
        }))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Done);

    // MySQL names swap dashes for underscores
    assert!(GrantRepo::exists(&h.pool, "mysql", "chess_club")
        .await
        .unwrap());
    assert!(h.mysql.databases.lock().unwrap().contains("chess_club"));

    let sent = h.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("chess_club"));
    // the first database created the cluster account, so the mail
    // carries its password
    assert!(sent[0].body.contains("Password:"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dropping_a_database_removes_the_grant_and_the_database(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;

    let create = h
        .submit(JobSpec::CreateDatabase(CreateDatabaseArgs {
            owner: Owner::member("ab123"),
            engine: Engine::Mysql,
            suffix: Some("blog".to_string()),
        }))
        .await;
    assert_eq!(h.runner.run_job(create.id).await.unwrap(), JobOutcome::Done);
    assert!(GrantRepo::exists(&h.pool, "mysql", "ab123/blog")
        .await
        .unwrap());

    let drop = h
        .submit(JobSpec::DropDatabase(DropDatabaseArgs {
            owner: Owner::member("ab123"),
            engine: Engine::Mysql,
            suffix: Some("blog".to_string()),
        }))
        .await;
    assert_eq!(h.runner.run_job(drop.id).await.unwrap(), JobOutcome::Done);

    assert!(!GrantRepo::exists(&h.pool, "mysql", "ab123/blog")
        .await
        .unwrap());
    assert!(!h.mysql.databases.lock().unwrap().contains("ab123/blog"));

    let sent = h.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].body.contains("ab123/blog"));
    assert!(sent[1].body.contains("dropped"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dropping_an_unrecorded_database_is_a_precondition(pool: PgPool) {
    let h = harness(pool);
    seed_member(&h.pool, "ab123", MemberStatus::Normal).await;

    let job = h
        .submit(JobSpec::DropDatabase(DropDatabaseArgs {
            owner: Owner::member("ab123"),
            engine: Engine::Mysql,
            suffix: None,
        }))
        .await;
    let outcome = h.runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::PreconditionFailed);

    let calls = h.mysql.calls.lock().unwrap().clone();
    assert!(!calls.iter().any(|c| c.starts_with("drop_database")));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_cluster_fails_the_job(pool: PgPool) {
    let backend = Arc::new(FakeBackend::new());
    let notifier = Arc::new(RecordingNotifier::new());
    // runner with no clusters attached
    let runner = Runner::new(pool.clone(), backend.clone(), notifier.clone());
    seed_member(&pool, "ab123", MemberStatus::Normal).await;

    let job = submit(
        &pool,
        &*backend,
        &*notifier,
        &JobSpec::CreateDatabase(CreateDatabaseArgs {
            owner: Owner::member("ab123"),
            engine: Engine::Mysql,
            suffix: None,
        }),
        Some("op123"),
        "test",
    )
    .await
    .unwrap();

    let outcome = runner.run_job(job.id).await.unwrap();
    assert_eq!(outcome, JobOutcome::Failed);

    let job = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(job.state_id, JobState::Failed.id());
    assert!(job
        .state_message
        .unwrap()
        .contains("no mysql cluster configured"));
}
