//! Postgres for database-backed tests.
//!
//! A single Postgres 16 container is started on first use and migrated once;
//! every test gets its own pool on it. Set `TEST_DATABASE_URL` to run against
//! an existing database instead. These tests are `#[ignore]`d by default:
//!
//! ```text
//! cargo test -p server -- --ignored
//! ```

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::TestApp;
use server_core::kernel::TestDependencies;

struct SharedDatabase {
    url: String,
    // Dropping the handle stops the container
    _container: Option<ContainerAsync<Postgres>>,
}

static DATABASE: OnceCell<SharedDatabase> = OnceCell::const_new();

async fn start_container() -> Result<(String, ContainerAsync<Postgres>)> {
    let container = Postgres::default()
        .with_tag("16")
        .with_cmd(["-c", "max_connections=200"])
        .start()
        .await
        .context("Postgres container did not start (is Docker running?)")?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
    Ok((url, container))
}

async fn prepare() -> Result<SharedDatabase> {
    // RUST_LOG=server_core=debug cargo test -- --ignored --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (url, container) = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => (url, None),
        Err(_) => {
            let (url, container) = start_container().await?;
            (url, Some(container))
        }
    };

    let pool = PgPool::connect(&url)
        .await
        .context("Cannot reach the test database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Migrations failed on the test database")?;
    pool.close().await;

    Ok(SharedDatabase {
        url,
        _container: container,
    })
}

/// Per-test context holding a pool on the shared database.
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("test database unavailable")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let database = DATABASE
            .get_or_try_init(prepare)
            .await
            .context("Shared test database could not be prepared")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database.url)
            .await
            .context("Cannot open a pool on the test database")?;

        Ok(Self { db_pool })
    }

    /// Router over this test's pool and the given mocks
    pub fn app(&self, deps: TestDependencies) -> TestApp {
        TestApp::new(deps, self.db_pool.clone())
    }
}
