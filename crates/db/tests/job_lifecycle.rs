use sqlx::PgPool;

use scf_db::models::job::{JobListQuery, SubmitJob};
use scf_db::models::status::{JobState, LogLevel};
use scf_db::repositories::JobRepo;

fn submit_input(kind: &str, requires_approval: bool) -> SubmitJob {
    SubmitJob {
        kind: kind.to_string(),
        actor_crsid: Some("ab123".to_string()),
        args: serde_json::json!({"crsid": "ab123"}),
        environment: "test".to_string(),
        requires_approval,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn submit_initial_states(pool: PgPool) {
    let queued = JobRepo::submit(&pool, &submit_input("signup", false))
        .await
        .unwrap();
    assert_eq!(queued.state_id, JobState::Queued.id());
    assert!(queued.claimed_at.is_none());

    let held = JobRepo::submit(&pool, &submit_input("cancel_member", true))
        .await
        .unwrap();
    assert_eq!(held.state_id, JobState::Unapproved.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn approve_only_moves_unapproved_jobs(pool: PgPool) {
    let held = JobRepo::submit(&pool, &submit_input("cancel_member", true))
        .await
        .unwrap();

    assert!(JobRepo::approve(&pool, held.id).await.unwrap());
    // approving twice reports no change
    assert!(!JobRepo::approve(&pool, held.id).await.unwrap());

    let job = JobRepo::find_by_id(&pool, held.id).await.unwrap().unwrap();
    assert_eq!(job.state_id, JobState::Queued.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn withdraw_is_unstarted_only(pool: PgPool) {
    let queued = JobRepo::submit(&pool, &submit_input("signup", false))
        .await
        .unwrap();
    let held = JobRepo::submit(&pool, &submit_input("signup", true))
        .await
        .unwrap();

    // both unstarted states may be withdrawn
    assert!(JobRepo::withdraw(&pool, queued.id).await.unwrap());
    assert!(JobRepo::withdraw(&pool, held.id).await.unwrap());

    // a withdrawn job can never be claimed or completed
    assert!(JobRepo::claim(&pool, queued.id).await.unwrap().is_none());
    assert!(!JobRepo::complete(&pool, queued.id, None).await.unwrap());
    let job = JobRepo::find_by_id(&pool, queued.id).await.unwrap().unwrap();
    assert_eq!(job.state_id, JobState::Withdrawn.id());
    assert!(job.completed_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn running_jobs_cannot_be_withdrawn(pool: PgPool) {
    let job = JobRepo::submit(&pool, &submit_input("signup", false))
        .await
        .unwrap();

    let claimed = JobRepo::claim(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(claimed.state_id, JobState::Running.id());
    assert!(claimed.claimed_at.is_some());

    assert!(!JobRepo::withdraw(&pool, job.id).await.unwrap());
    // claiming twice finds nothing queued
    assert!(JobRepo::claim(&pool, job.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_next_takes_oldest_queued(pool: PgPool) {
    let held = JobRepo::submit(&pool, &submit_input("first", true))
        .await
        .unwrap();
    let a = JobRepo::submit(&pool, &submit_input("second", false))
        .await
        .unwrap();
    let b = JobRepo::submit(&pool, &submit_input("third", false))
        .await
        .unwrap();

    // the unapproved job is skipped
    let first = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(first.id, a.id);

    let second = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(second.id, b.id);

    assert!(JobRepo::claim_next(&pool).await.unwrap().is_none());

    let held = JobRepo::find_by_id(&pool, held.id).await.unwrap().unwrap();
    assert_eq!(held.state_id, JobState::Unapproved.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn terminal_states_are_immutable(pool: PgPool) {
    let job = JobRepo::submit(&pool, &submit_input("signup", false))
        .await
        .unwrap();
    JobRepo::claim(&pool, job.id).await.unwrap().unwrap();

    assert!(JobRepo::complete(&pool, job.id, Some("member provisioned")).await.unwrap());

    // a completed job cannot fail, complete again, or be withdrawn
    assert!(!JobRepo::fail(&pool, job.id, "late error").await.unwrap());
    assert!(!JobRepo::complete(&pool, job.id, None).await.unwrap());
    assert!(!JobRepo::withdraw(&pool, job.id).await.unwrap());

    let done = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.state_id, JobState::Done.id());
    assert_eq!(done.state_message.as_deref(), Some("member provisioned"));
    assert!(done.completed_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_jobs_preserve_the_error(pool: PgPool) {
    let job = JobRepo::submit(&pool, &submit_input("signup", false))
        .await
        .unwrap();
    JobRepo::claim(&pool, job.id).await.unwrap().unwrap();

    assert!(JobRepo::fail(&pool, job.id, "nis rebuild failed: exit status 1")
        .await
        .unwrap());

    let failed = JobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(failed.state_id, JobState::Failed.id());
    assert_eq!(
        failed.state_message.as_deref(),
        Some("nis rebuild failed: exit status 1")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn audit_trail_in_insertion_order(pool: PgPool) {
    let job = JobRepo::submit(&pool, &submit_input("signup", false))
        .await
        .unwrap();

    JobRepo::append_log(&pool, job.id, LogLevel::Info, "created", None)
        .await
        .unwrap();
    JobRepo::append_log(
        &pool,
        job.id,
        LogLevel::Warning,
        "mail delivery failed",
        Some("connection refused"),
    )
    .await
    .unwrap();

    let logs = JobRepo::logs(&pool, job.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].message, "created");
    assert_eq!(logs[0].level_id, LogLevel::Info.id());
    assert_eq!(logs[1].detail.as_deref(), Some("connection refused"));
}

#[sqlx::test(migrations = "./migrations")]
async fn list_filters_by_state_and_actor(pool: PgPool) {
    let a = JobRepo::submit(&pool, &submit_input("signup", false))
        .await
        .unwrap();
    let mut other = submit_input("signup", false);
    other.actor_crsid = Some("cd456".to_string());
    JobRepo::submit(&pool, &other).await.unwrap();

    JobRepo::claim(&pool, a.id).await.unwrap().unwrap();

    let running = JobRepo::list(
        &pool,
        &JobListQuery {
            state_id: Some(JobState::Running.id()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].id, a.id);

    let by_actor = JobRepo::list(
        &pool,
        &JobListQuery {
            actor_crsid: Some("cd456".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_actor.len(), 1);
    assert_eq!(by_actor[0].actor_crsid.as_deref(), Some("cd456"));
}
