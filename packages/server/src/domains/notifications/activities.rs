//! Notification activities: creation with de-duplication, inbox queries.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::{ApiError, ApiResult, NotificationId, Paginated, PaginationArgs, UserId};
use crate::domains::notifications::models::{NewNotification, Notification};
use crate::kernel::stream_hub::NOTIFICATIONS_TOPIC;
use crate::kernel::ServerDeps;

/// Event name carried by the SSE feed for a new notification
pub const NOTIFICATION_CREATED: &str = "notification_created";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkAllReadResult {
    pub updated: u64,
}

/// Insert a notification and push it on the realtime feed.
pub async fn create_notification(
    input: NewNotification,
    deps: &ServerDeps,
) -> anyhow::Result<Notification> {
    let notification = Notification::create(&input, &deps.db_pool).await?;
    publish(&notification, deps).await;
    Ok(notification)
}

/// Insert unless the same alert (type, center, title) was raised within `window`.
pub async fn create_notification_if_absent(
    input: NewNotification,
    window: Duration,
    deps: &ServerDeps,
) -> anyhow::Result<Option<Notification>> {
    let since = Utc::now() - window;
    match Notification::create_if_absent(&input, since, &deps.db_pool).await? {
        Some(notification) => {
            info!(
                notification_id = %notification.id,
                kind = %notification.kind,
                priority = %notification.priority,
                "Notification created"
            );
            publish(&notification, deps).await;
            Ok(Some(notification))
        }
        None => {
            debug!(kind = %input.kind, title = %input.title, "Duplicate notification skipped");
            Ok(None)
        }
    }
}

async fn publish(notification: &Notification, deps: &ServerDeps) {
    deps.stream_hub
        .publish_event(NOTIFICATIONS_TOPIC, NOTIFICATION_CREATED, notification)
        .await;
}

pub async fn list_notifications(
    user_id: UserId,
    query: NotificationListQuery,
    deps: &ServerDeps,
) -> ApiResult<Paginated<Notification>> {
    let page = PaginationArgs {
        page: query.page,
        limit: query.limit,
    }
    .validate()?;
    let (rows, total) =
        Notification::find_for_user(user_id, query.unread_only, page, &deps.db_pool).await?;
    Ok(Paginated::new(rows, page, total))
}

pub async fn mark_read(
    id: NotificationId,
    user_id: UserId,
    deps: &ServerDeps,
) -> ApiResult<Notification> {
    Notification::mark_read(id, user_id, &deps.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification introuvable"))
}

pub async fn mark_all_read(user_id: UserId, deps: &ServerDeps) -> ApiResult<MarkAllReadResult> {
    let updated = Notification::mark_all_read(user_id, &deps.db_pool).await?;
    debug!(%user_id, updated, "Notifications marked as read");
    Ok(MarkAllReadResult { updated })
}
