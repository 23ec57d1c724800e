use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::document::DocumentRecord;
use crate::common::{like_pattern, OrphanageId, Page, UserId};

crate::text_enum! {
    /// Legitimacy review state of a care center
    pub enum LegalStatus {
        Pending => "pending",
        Verified => "verified",
        Rejected => "rejected",
    }
}

/// Care center row, with the number of children currently registered
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Orphanage {
    pub id: OrphanageId,
    pub name: String,
    pub province: String,
    pub city: String,
    pub address: Option<String>,
    pub contact_person: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub legal_status: LegalStatus,
    pub documents: Json<Vec<DocumentRecord>>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub children_count: i64,
}

/// Input for creating a new care center
#[derive(Debug, Clone)]
pub struct CreateOrphanage {
    pub name: String,
    pub province: String,
    pub city: String,
    pub address: Option<String>,
    pub contact_person: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub created_by: Option<UserId>,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateOrphanage {
    pub name: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct OrphanageFilter {
    pub province: Option<String>,
    pub legal_status: Option<LegalStatus>,
    pub search: Option<String>,
}

const SELECT_WITH_COUNT: &str = r#"
    SELECT o.*,
           (SELECT COUNT(*) FROM children c WHERE c.orphanage_id = o.id) AS children_count
    FROM orphanages o
"#;

impl OrphanageFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE 1=1");
        if let Some(province) = &self.province {
            builder.push(" AND o.province = ").push_bind(province.clone());
        }
        if let Some(status) = self.legal_status {
            builder.push(" AND o.legal_status = ").push_bind(status);
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (o.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR o.city ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

impl Orphanage {
    pub async fn find_by_id(id: OrphanageId, pool: &PgPool) -> Result<Option<Self>> {
        let orphanage = sqlx::query_as::<_, Self>(&format!("{} WHERE o.id = $1", SELECT_WITH_COUNT))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(orphanage)
    }

    pub async fn exists(id: OrphanageId, pool: &PgPool) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orphanages WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// One page of centers (newest first) plus the total matching count
    pub async fn find_paginated(
        filter: &OrphanageFilter,
        page: Page,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orphanages o");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_WITH_COUNT);
        filter.push_where(&mut query);
        query
            .push(" ORDER BY o.created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = query.build_query_as::<Self>().fetch_all(pool).await?;

        Ok((rows, total))
    }

    pub async fn create(input: CreateOrphanage, pool: &PgPool) -> Result<Self> {
        let orphanage = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO orphanages (
                name, province, city, address, contact_person,
                phone, email, description, capacity, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *, 0::bigint AS children_count
            "#,
        )
        .bind(&input.name)
        .bind(&input.province)
        .bind(&input.city)
        .bind(&input.address)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.description)
        .bind(input.capacity)
        .bind(input.created_by)
        .fetch_one(pool)
        .await?;
        Ok(orphanage)
    }

    /// Returns `None` when the center does not exist
    pub async fn update(
        id: OrphanageId,
        input: UpdateOrphanage,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let updated: Option<OrphanageId> = sqlx::query_scalar(
            r#"
            UPDATE orphanages SET
                name = COALESCE($2, name),
                province = COALESCE($3, province),
                city = COALESCE($4, city),
                address = COALESCE($5, address),
                contact_person = COALESCE($6, contact_person),
                phone = COALESCE($7, phone),
                email = COALESCE($8, email),
                description = COALESCE($9, description),
                capacity = COALESCE($10, capacity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.province)
        .bind(&input.city)
        .bind(&input.address)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.description)
        .bind(input.capacity)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(id, pool).await,
            None => Ok(None),
        }
    }

    pub async fn set_legal_status(
        id: OrphanageId,
        status: LegalStatus,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orphanages SET legal_status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Children, their health/nutrition records and alerts go by FK cascade
    pub async fn delete(id: OrphanageId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orphanages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn append_document(
        id: OrphanageId,
        document: &DocumentRecord,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orphanages
            SET documents = documents || jsonb_build_array($2::jsonb), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(document))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drops one document record in a single statement and returns it.
    /// The list is rebuilt from the row version being updated, so a
    /// concurrent `append_document` is never overwritten.
    pub async fn remove_document(
        id: OrphanageId,
        document_id: Uuid,
        pool: &PgPool,
    ) -> Result<Option<DocumentRecord>> {
        let removed = sqlx::query_scalar::<_, Json<DocumentRecord>>(
            r#"
            WITH target AS (
                SELECT o.id, d.value AS document
                FROM orphanages o, jsonb_array_elements(o.documents) AS d(value)
                WHERE o.id = $1 AND d.value->>'id' = $2
            )
            UPDATE orphanages o
            SET documents = (
                    SELECT COALESCE(jsonb_agg(d.value ORDER BY d.position), '[]'::jsonb)
                    FROM jsonb_array_elements(o.documents) WITH ORDINALITY AS d(value, position)
                    WHERE d.value->>'id' <> $2
                ),
                updated_at = NOW()
            FROM target
            WHERE o.id = target.id
              AND o.documents @> jsonb_build_array(jsonb_build_object('id', $2::text))
            RETURNING target.document
            "#,
        )
        .bind(id)
        .bind(document_id.to_string())
        .fetch_optional(pool)
        .await?;
        Ok(removed.map(|Json(document)| document))
    }

    pub fn is_over_capacity(&self) -> bool {
        self.capacity
            .is_some_and(|capacity| self.children_count > i64::from(capacity))
    }
}
