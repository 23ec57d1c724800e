use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::common::{parse_id, ApiJson, ApiQuery, ApiResult, Paginated};
use crate::domains::messaging::{self, DeliveryReport, SendNotificationInput};
use crate::domains::notifications::activities::{self, MarkAllReadResult, NotificationListQuery};
use crate::domains::notifications::Notification;
use crate::server::app::AppState;
use crate::server::middleware::{AdminUser, AuthUser};

/// Notifications addressed to the caller plus broadcasts
pub async fn list_notifications_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<NotificationListQuery>,
) -> ApiResult<Json<Paginated<Notification>>> {
    Ok(Json(
        activities::list_notifications(user.user_id, query, &state.deps).await?,
    ))
}

pub async fn mark_read_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    let id = parse_id(&id)?;
    Ok(Json(
        activities::mark_read(id, user.user_id, &state.deps).await?,
    ))
}

pub async fn mark_all_read_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<Json<MarkAllReadResult>> {
    Ok(Json(
        activities::mark_all_read(user.user_id, &state.deps).await?,
    ))
}

/// Outbound e-mail and/or SMS
pub async fn send_notification_handler(
    Extension(state): Extension<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(input): ApiJson<SendNotificationInput>,
) -> ApiResult<Json<DeliveryReport>> {
    tracing::info!(sender = %admin.user_id, "Outbound notification requested");
    Ok(Json(
        messaging::activities::send_notification(input, &state.deps).await?,
    ))
}
