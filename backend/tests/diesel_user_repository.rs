//! Integration tests for `DieselUserRepository` against embedded PostgreSQL.
//!
//! Each test boots its own cluster through `pg-embedded-setup-unpriv`,
//! recreates a scratch database, and lets `ensure_schema` create the table
//! exactly as the server does at startup. Set `SKIP_TEST_CLUSTER=1` where the
//! cluster cannot start.

use std::time::Duration;

use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use users_api::domain::ports::{ConnectivityProbe, UserPersistenceError, UserRepository};
use users_api::domain::{User, UserDraft, UserId};
use users_api::outbound::persistence::{
    DbPool, DieselConnectivityProbe, DieselUserRepository, PoolConfig, ensure_schema,
};

#[path = "support/pg_embed.rs"]
mod pg_embed;

mod support;

use pg_embed::test_cluster;
use support::{drop_users_table, handle_cluster_setup_failure, insert_raw_user, reset_database};

const TEST_DB: &str = "diesel_user_repository_test";

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    database_url: String,
    pool: DbPool,
    repository: DieselUserRepository,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    reset_database(&cluster, TEST_DB)?;
    let database_url = cluster.connection().database_url(TEST_DB);

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1))
        .with_connection_timeout(Duration::from_secs(5));
    let pool = runtime
        .block_on(async {
            let pool = DbPool::connect(config).await.map_err(|err| err.to_string())?;
            ensure_schema(&pool).await.map_err(|err| err.to_string())?;
            Ok::<_, String>(pool)
        })?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        database_url,
        repository: DieselUserRepository::new(pool.clone()),
        pool,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn draft(name: &str, email: &str) -> UserDraft {
    UserDraft::try_new(name, email).expect("valid draft")
}

#[rstest]
fn create_then_find_returns_stored_values(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: create_then_find_returns_stored_values skipped");
        return;
    };
    let repo = ctx.repository.clone();

    let (created, fetched) = ctx.runtime.block_on(async {
        let created = repo
            .create(&draft("Ada", "ada@example.com"))
            .await
            .expect("create user");
        let fetched = repo.find_by_id(created.id()).await.expect("find user");
        (created, fetched)
    });

    assert_eq!(created.name(), "Ada");
    assert_eq!(created.email(), "ada@example.com");
    assert_eq!(created.created_at(), created.updated_at());
    assert_eq!(fetched, Some(created));
}

#[rstest]
fn duplicate_email_is_conflict_and_leaves_first_user(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_email_is_conflict_and_leaves_first_user skipped");
        return;
    };
    let repo = ctx.repository.clone();

    let (first, second, users) = ctx.runtime.block_on(async {
        let first = repo
            .create(&draft("Ada", "ada@example.com"))
            .await
            .expect("first create");
        let second = repo.create(&draft("Imposter", "ada@example.com")).await;
        let users = repo.list_all().await.expect("list users");
        (first, second, users)
    });

    assert!(matches!(second, Err(UserPersistenceError::Conflict { .. })));
    assert_eq!(users, vec![first]);
}

#[rstest]
fn update_of_missing_id_is_not_found_and_creates_nothing(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_of_missing_id_is_not_found_and_creates_nothing skipped");
        return;
    };
    let repo = ctx.repository.clone();

    let (result, users) = ctx.runtime.block_on(async {
        let result = repo
            .update(UserId::new(9_999), &draft("Ghost", "ghost@example.com"))
            .await;
        let users = repo.list_all().await.expect("list users");
        (result, users)
    });

    assert_eq!(result, Err(UserPersistenceError::not_found(9_999)));
    assert!(users.is_empty());
}

#[rstest]
fn update_moves_updated_at_and_keeps_created_at(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_moves_updated_at_and_keeps_created_at skipped");
        return;
    };
    let repo = ctx.repository.clone();

    let (created, updated) = ctx.runtime.block_on(async {
        let created = repo
            .create(&draft("Ada", "ada@example.com"))
            .await
            .expect("create user");
        let updated = repo
            .update(created.id(), &draft("Ada Lovelace", "ada@lovelace.dev"))
            .await
            .expect("update user");
        (created, updated)
    });

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.name(), "Ada Lovelace");
    assert_eq!(updated.email(), "ada@lovelace.dev");
    assert_eq!(updated.created_at(), created.created_at());
    assert!(updated.updated_at() >= created.updated_at());
}

#[rstest]
fn delete_removes_user_and_second_delete_is_not_found(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: delete_removes_user_and_second_delete_is_not_found skipped");
        return;
    };
    let repo = ctx.repository.clone();

    let (id, fetched, second) = ctx.runtime.block_on(async {
        let created = repo
            .create(&draft("Ada", "ada@example.com"))
            .await
            .expect("create user");
        repo.delete(created.id()).await.expect("first delete");
        let fetched = repo.find_by_id(created.id()).await.expect("find user");
        let second = repo.delete(created.id()).await;
        (created.id(), fetched, second)
    });

    assert_eq!(fetched, None);
    assert_eq!(second, Err(UserPersistenceError::not_found(id.value())));
}

#[rstest]
fn list_returns_newest_first(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: list_returns_newest_first skipped");
        return;
    };
    let repo = ctx.repository.clone();

    let names: Vec<String> = ctx.runtime.block_on(async {
        repo.create(&draft("A", "a@example.com"))
            .await
            .expect("create A");
        repo.create(&draft("B", "b@example.com"))
            .await
            .expect("create B");
        repo.list_all()
            .await
            .expect("list users")
            .iter()
            .map(|user| user.name().to_owned())
            .collect()
    });

    assert_eq!(names, vec!["B".to_owned(), "A".to_owned()]);
}

#[rstest]
fn blank_rows_written_elsewhere_are_listed_and_found(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: blank_rows_written_elsewhere_are_listed_and_found skipped");
        return;
    };
    insert_raw_user(&ctx.database_url, "   ", "legacy@example.com").expect("insert raw row");
    let repo = ctx.repository.clone();

    let (users, fetched) = ctx.runtime.block_on(async {
        let users = repo.list_all().await.expect("list users");
        let id = users.first().map(User::id).expect("one row");
        let fetched = repo.find_by_id(id).await.expect("find user");
        (users, fetched)
    });

    assert_eq!(users.len(), 1);
    assert_eq!(users.first().map(User::name), Some("   "));
    assert_eq!(fetched.as_ref(), users.first());
}

#[rstest]
fn missing_table_surfaces_as_query_error(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: missing_table_surfaces_as_query_error skipped");
        return;
    };
    drop_users_table(&ctx.database_url).expect("drop users table");
    let repo = ctx.repository.clone();

    let result = ctx.runtime.block_on(async { repo.list_all().await });

    assert!(matches!(result, Err(UserPersistenceError::Query { .. })));
}

#[rstest]
fn connectivity_probe_reports_database_clock(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: connectivity_probe_reports_database_clock skipped");
        return;
    };
    let probe = DieselConnectivityProbe::new(ctx.pool.clone());

    let (ping, now) = ctx
        .runtime
        .block_on(async { (probe.ping().await, probe.current_time().await) });

    assert_eq!(ping, Ok(()));
    let skew = chrono::Utc::now() - now.expect("database time");
    assert!(skew.num_seconds().abs() < 60, "clock skew {skew}");
}
