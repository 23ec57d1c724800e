use axum::{extract::Extension, Json};

use crate::common::{ApiJson, ApiResult};
use crate::domains::alerts::{self, AlertRunReport};
use crate::domains::analytics::{self, AnalyticsAnswer, AskInput};
use crate::domains::dashboard::{activities::dashboard_stats, DashboardStats};
use crate::server::app::AppState;
use crate::server::middleware::{AdminUser, AuthUser};

/// Natural-language question answered from a generated read-only query
pub async fn ask_handler(
    Extension(state): Extension<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(input): ApiJson<AskInput>,
) -> ApiResult<Json<AnalyticsAnswer>> {
    tracing::info!(user_id = %admin.user_id, "Analytics question received");
    Ok(Json(analytics::ask(input, &state.deps).await?))
}

pub async fn dashboard_stats_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(dashboard_stats(user.user_id, &state.deps).await?))
}

/// Manual run of every alert check
pub async fn run_alerts_handler(
    Extension(state): Extension<AppState>,
    AdminUser(_admin): AdminUser,
) -> Json<AlertRunReport> {
    Json(alerts::run_all_checks(&state.deps).await)
}
