use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{Page, PartnerRequestId, UserId};

crate::text_enum! {
    pub enum PartnerStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Request from an NGO or institution to access the platform
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PartnerRequest {
    pub id: PartnerRequestId,
    pub organization_name: String,
    pub organization_type: Option<String>,
    pub contact_person: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub status: PartnerStatus,
    pub review_note: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePartnerRequest {
    pub organization_name: String,
    pub organization_type: Option<String>,
    pub contact_person: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl PartnerRequest {
    pub async fn create(input: CreatePartnerRequest, pool: &PgPool) -> Result<Self> {
        let request = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO partner_requests (
                organization_name, organization_type, contact_person, email, phone, message
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.organization_name)
        .bind(&input.organization_type)
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.message)
        .fetch_one(pool)
        .await?;
        Ok(request)
    }

    pub async fn find_by_id(id: PartnerRequestId, pool: &PgPool) -> Result<Option<Self>> {
        let request = sqlx::query_as::<_, Self>("SELECT * FROM partner_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(request)
    }

    pub async fn find_paginated(
        status: Option<PartnerStatus>,
        page: Page,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM partner_requests WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM partner_requests
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows, total))
    }

    /// Records the decision only while the request is still pending.
    /// Returns `None` when it was not pending (or does not exist).
    pub async fn review(
        id: PartnerRequestId,
        status: PartnerStatus,
        note: Option<String>,
        reviewer: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let request = sqlx::query_as::<_, Self>(
            r#"
            UPDATE partner_requests
            SET status = $2, review_note = $3, reviewed_by = $4, reviewed_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(note)
        .bind(reviewer)
        .fetch_optional(pool)
        .await?;
        Ok(request)
    }

    pub async fn count_pending(pool: &PgPool) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM partner_requests WHERE status = 'pending'")
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
