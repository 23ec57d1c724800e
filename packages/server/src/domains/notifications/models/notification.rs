use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{NotificationId, OrphanageId, Page, UserId};

crate::text_enum! {
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// Kinds of notification raised by the service itself
pub mod kinds {
    pub const DISEASE_OUTBREAK: &str = "disease_outbreak";
    pub const SEVERE_MALNUTRITION: &str = "severe_malnutrition";
    pub const CAPACITY: &str = "capacity";
    pub const VACCINATION_GAP: &str = "vaccination_gap";
    pub const DOCUMENT_EXPIRY: &str = "document_expiry";
    pub const LEGAL_STATUS: &str = "legal_status";
    pub const PARTNER_REQUEST: &str = "partner_request";
}

/// In-app notification. `user_id = NULL` means broadcast to every admin.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: Option<UserId>,
    pub orphanage_id: Option<OrphanageId>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Option<UserId>,
    pub orphanage_id: Option<OrphanageId>,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
}

impl NewNotification {
    /// Broadcast notification about a care center
    pub fn about_center(
        orphanage_id: OrphanageId,
        kind: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            user_id: None,
            orphanage_id: Some(orphanage_id),
            kind: kind.to_string(),
            title: title.into(),
            message: message.into(),
            priority,
        }
    }
}

impl Notification {
    pub async fn create(input: &NewNotification, pool: &PgPool) -> Result<Self> {
        let notification = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO notifications (user_id, orphanage_id, type, title, message, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.user_id)
        .bind(input.orphanage_id)
        .bind(&input.kind)
        .bind(&input.title)
        .bind(&input.message)
        .bind(input.priority)
        .fetch_one(pool)
        .await?;
        Ok(notification)
    }

    /// Insert unless a notification with the same type, center and title was
    /// created after `since`. Returns `None` when skipped.
    ///
    /// Writers of the same key are serialized by a transaction-scoped
    /// advisory lock.
    pub async fn create_if_absent(
        input: &NewNotification,
        since: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let dedup_key = format!(
            "{}|{}|{}",
            input.kind,
            input
                .orphanage_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            input.title
        );
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&dedup_key)
            .execute(&mut *tx)
            .await?;

        let notification = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO notifications (user_id, orphanage_id, type, title, message, priority)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (
                SELECT 1 FROM notifications
                WHERE type = $3
                  AND title = $4
                  AND orphanage_id IS NOT DISTINCT FROM $2
                  AND created_at > $7
            )
            RETURNING *
            "#,
        )
        .bind(input.user_id)
        .bind(input.orphanage_id)
        .bind(&input.kind)
        .bind(&input.title)
        .bind(&input.message)
        .bind(input.priority)
        .bind(since)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(notification)
    }

    /// Notifications addressed to the user or broadcast, newest first
    pub async fn find_for_user(
        user_id: UserId,
        unread_only: bool,
        page: Page,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE (user_id = $1 OR user_id IS NULL) AND ($2 = FALSE OR is_read = FALSE)
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM notifications
            WHERE (user_id = $1 OR user_id IS NULL) AND ($2 = FALSE OR is_read = FALSE)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows, total))
    }

    /// Returns `None` when the notification does not exist or is addressed to someone else
    pub async fn mark_read(
        id: NotificationId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let notification = sqlx::query_as::<_, Self>(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE id = $1 AND (user_id = $2 OR user_id IS NULL)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(notification)
    }

    pub async fn mark_all_read(user_id: UserId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE (user_id = $1 OR user_id IS NULL) AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_unread(user_id: UserId, pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE (user_id = $1 OR user_id IS NULL) AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_kind_as_type() {
        let notification = Notification {
            id: NotificationId::new(),
            user_id: None,
            orphanage_id: None,
            kind: kinds::CAPACITY.to_string(),
            title: "Capacité dépassée".into(),
            message: "…".into(),
            priority: Priority::High,
            is_read: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "capacity");
        assert_eq!(json["priority"], "high");
        assert!(json["user_id"].is_null());
    }

    #[test]
    fn test_about_center_is_broadcast() {
        let id = OrphanageId::new();
        let n = NewNotification::about_center(id, kinds::CAPACITY, "t", "m", Priority::Medium);
        assert_eq!(n.user_id, None);
        assert_eq!(n.orphanage_id, Some(id));
    }
}
