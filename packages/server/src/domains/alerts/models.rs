//! Aggregate reads used by the alert checks

use anyhow::Result;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::OrphanageId;
use crate::domains::orphanages::models::DocumentRecord;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CapacityUsage {
    pub orphanage_id: OrphanageId,
    pub orphanage_name: String,
    pub capacity: i32,
    pub children: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VaccinationCoverage {
    pub orphanage_id: OrphanageId,
    pub orphanage_name: String,
    pub total_children: i64,
    pub not_up_to_date: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CenterDocuments {
    pub orphanage_id: OrphanageId,
    pub orphanage_name: String,
    pub documents: Json<Vec<DocumentRecord>>,
}

impl CapacityUsage {
    /// Centers with a declared capacity
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT o.id AS orphanage_id,
                   o.name AS orphanage_name,
                   o.capacity,
                   (SELECT COUNT(*) FROM children c WHERE c.orphanage_id = o.id) AS children
            FROM orphanages o
            WHERE o.capacity IS NOT NULL AND o.capacity > 0
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

impl VaccinationCoverage {
    /// Per center: children whose latest check-up is not `up_to_date`
    /// (or who never had one)
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT o.id AS orphanage_id,
                   o.name AS orphanage_name,
                   COUNT(c.id) AS total_children,
                   COUNT(c.id) FILTER (
                       WHERE latest.vaccination_status IS DISTINCT FROM 'up_to_date'
                   ) AS not_up_to_date
            FROM orphanages o
            JOIN children c ON c.orphanage_id = o.id
            LEFT JOIN LATERAL (
                SELECT h.vaccination_status
                FROM health_records h
                WHERE h.child_id = c.id
                ORDER BY h.date DESC, h.created_at DESC
                LIMIT 1
            ) latest ON TRUE
            GROUP BY o.id, o.name
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

impl CenterDocuments {
    pub async fn find_with_expiry(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT id AS orphanage_id, name AS orphanage_name, documents
            FROM orphanages
            WHERE EXISTS (
                SELECT 1 FROM jsonb_array_elements(documents) d
                WHERE d ->> 'expires_at' IS NOT NULL
            )
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
