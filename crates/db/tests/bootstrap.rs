use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify lookup seed data.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    scf_db::health_check(&pool).await.unwrap();

    let tables = ["member_statuses", "job_states", "log_levels"];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert!(count.0 > 0, "{table} should have seed data, got 0 rows");
    }
}

/// Seed rows must sit at the ids the Rust enums assume.
#[sqlx::test(migrations = "./migrations")]
async fn test_lookup_seed_order(pool: PgPool) {
    let expectations = [
        ("member_statuses", vec!["new", "normal", "cancelled"]),
        (
            "job_states",
            vec!["unapproved", "queued", "running", "done", "failed", "withdrawn"],
        ),
        ("log_levels", vec!["debug", "info", "warning", "error"]),
    ];

    for (table, names) in expectations {
        let rows: Vec<(i16, String)> =
            sqlx::query_as(&format!("SELECT id, name FROM {table} ORDER BY id"))
                .fetch_all(&pool)
                .await
                .unwrap();
        let got: Vec<(i16, String)> = rows;
        let want: Vec<(i16, String)> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (i as i16 + 1, name.to_string()))
            .collect();
        assert_eq!(got, want, "{table} seed data out of order");
    }
}

/// uid/gid sequences start in their reserved ranges.
#[sqlx::test(migrations = "./migrations")]
async fn test_id_sequences_start_in_range(pool: PgPool) {
    let member: (i64,) = sqlx::query_as("SELECT nextval('member_uid_seq')")
        .fetch_one(&pool)
        .await
        .unwrap();
    let society: (i64,) = sqlx::query_as("SELECT nextval('society_uid_seq')")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(member.0, 10000);
    assert_eq!(society.0, 50000);
}
