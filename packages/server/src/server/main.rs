// Registry API binary: config, database, migrations, alert scheduler, HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use server_core::{kernel::scheduled_tasks::start_scheduler, server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,server_core=debug,sqlx=warn";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Database ready, migrations applied");

    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(port = config.port, alerts = config.alerts_enabled, "Starting registry API");

    if config.jwt_secret.is_none() {
        warn!("JWT_SECRET not set: bearer tokens are decoded without signature verification");
    }

    let pool = connect_database(&config).await?;
    let (app, deps) = build_app(&config, pool).context("Failed to build application")?;

    // Dropping the scheduler stops the alert jobs
    let _scheduler = match config.alerts_enabled {
        true => Some(
            start_scheduler(deps)
                .await
                .context("Failed to start alert scheduler")?,
        ),
        false => {
            info!("Alert scheduler disabled");
            None
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")
}
