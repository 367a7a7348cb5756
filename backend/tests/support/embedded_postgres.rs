//! Embedded PostgreSQL harness for the Diesel adapter suites.
//!
//! Each test gets its own database cloned from a template that already has
//! the embedded migrations applied. The template name carries a hash of the
//! migrations directory so schema edits never reuse a stale template.
//!
//! Set `SKIP_TEST_CLUSTER=1` to skip these suites where PostgreSQL cannot be
//! started; otherwise a setup failure fails the test.

use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use chrono::Utc;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use litrevu::domain::ports::{NewAccount, UserRepository};
use litrevu::domain::{User, UserId, Username};
use litrevu::outbound::persistence::{DbPool, DieselUserRepository, MIGRATIONS, PoolConfig};
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

const TEMPLATE_NAME_PREFIX: &str = "litrevu_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// A migrated database, a pool over it and a runtime to drive the adapters.
pub struct PgContext {
    pub pool: DbPool,
    runtime: Runtime,
    database_url: String,
    _database: TemporaryDatabase,
}

impl PgContext {
    /// Drive `future` to completion on the context's runtime.
    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Register `name` through the user adapter and return their id.
    pub fn seed_user(&self, name: &str) -> UserId {
        let user = User::new(
            UserId::random(),
            Username::new(name).expect("valid username"),
        );
        let id = user.id().clone();
        let users = DieselUserRepository::new(self.pool.clone());
        self.run(users.create(&NewAccount {
            user,
            password_hash: "hash".to_owned(),
            created_at: Utc::now(),
        }))
        .expect("seed user");
        id
    }

    /// Count rows in `table` with a raw query, bypassing the adapters.
    pub fn count_rows(&self, table: &str) -> i64 {
        let mut client = Client::connect(&self.database_url, NoTls)
            .unwrap_or_else(|err| panic!("connect for row count: {}", format_postgres_error(&err)));
        let row = client
            .query_one(&format!("SELECT count(*) FROM {table}"), &[])
            .unwrap_or_else(|err| panic!("count {table}: {}", format_postgres_error(&err)));
        row.get(0)
    }
}

/// Whether `SKIP_TEST_CLUSTER` is set to `1`, `true` or `yes`.
fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, otherwise fail loudly.
fn handle_cluster_setup_failure<T>(reason: impl Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Render a PostgreSQL error with its SQLSTATE and detail.
fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

fn template_database_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migrate: {err}"))?;
    Ok(())
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _guard = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        migrate_schema(&cluster.connection().database_url(&template_name))?;
    }
    Ok(template_name)
}

fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("no provisioning attempt made");
    for attempt in 1..=PROVISION_RETRIES {
        let provisioned = ensure_template_database(cluster).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4().simple());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone template: {err:?}"))
        });
        match provisioned {
            Ok(database) => return Ok(database),
            Err(error) => last_error = format!("attempt {attempt}/{PROVISION_RETRIES}: {error}"),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// Provision a fresh database, or `None` when the cluster is skipped.
pub fn pg_context() -> Option<PgContext> {
    let cluster = match shared_cluster_handle() {
        Ok(cluster) => cluster,
        Err(error) => return handle_cluster_setup_failure(error),
    };
    let database = match provision_database(cluster) {
        Ok(database) => database,
        Err(error) => return handle_cluster_setup_failure(error),
    };
    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => return handle_cluster_setup_failure(error),
    };
    let database_url = database.url().to_owned();
    let pool = match runtime.block_on(DbPool::new(
        PoolConfig::new(database_url.as_str())
            .with_max_size(2)
            .with_min_idle(Some(1)),
    )) {
        Ok(pool) => pool,
        Err(error) => return handle_cluster_setup_failure(error),
    };
    Some(PgContext {
        pool,
        runtime,
        database_url,
        _database: database,
    })
}
