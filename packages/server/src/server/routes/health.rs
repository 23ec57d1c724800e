//! `GET /health`: database round-trip and pool usage, no authentication.

use std::time::{Duration, Instant};

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `healthy` or `unhealthy`
    status: &'static str,
    database: DatabaseCheck,
    connection_pool: PoolUsage,
    /// `verified` when bearer tokens are signature-checked, `decode_only` otherwise
    auth_mode: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    status: CheckStatus,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PoolUsage {
    size: u32,
    idle_connections: usize,
    max_connections: u32,
}

async fn ping(pool: &PgPool) -> DatabaseCheck {
    let started = Instant::now();
    let error = match tokio::time::timeout(DB_PING_TIMEOUT, sqlx::query("SELECT 1").execute(pool))
        .await
    {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("Query failed: {}", e)),
        Err(_) => Some(format!("No answer within {}s", DB_PING_TIMEOUT.as_secs())),
    };

    DatabaseCheck {
        status: if error.is_none() {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        latency_ms: started.elapsed().as_millis() as u64,
        error,
    }
}

/// 200 when the database answers, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthReport>) {
    let pool = &state.deps.db_pool;
    let database = ping(pool).await;

    if let Some(error) = &database.error {
        tracing::warn!(error = %error, "Health check: database unavailable");
    }

    let (status_code, status) = match database.status {
        CheckStatus::Ok => (StatusCode::OK, "healthy"),
        CheckStatus::Error => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    let report = HealthReport {
        status,
        connection_pool: PoolUsage {
            size: pool.size(),
            idle_connections: pool.num_idle(),
            max_connections: pool.options().get_max_connections(),
        },
        database,
        auth_mode: if state.deps.jwt_service.verifies_signature() {
            "verified"
        } else {
            "decode_only"
        },
    };

    (status_code, Json(report))
}
