use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::common::{like_pattern, ChildId, DiseaseId, HealthRecordId, OrphanageId, Page};

crate::text_enum! {
    pub enum Severity {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
    }
}

/// Disease diagnosed for a child, optionally during a check-up
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChildDisease {
    pub id: DiseaseId,
    pub child_id: ChildId,
    pub health_record_id: Option<HealthRecordId>,
    pub disease_name: String,
    pub diagnosed_date: NaiveDate,
    pub severity: Severity,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDisease {
    pub disease_name: String,
    pub diagnosed_date: NaiveDate,
    pub severity: Severity,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DiseaseFilter {
    pub child_id: Option<ChildId>,
    pub orphanage_id: Option<OrphanageId>,
    pub disease_name: Option<String>,
    pub severity: Option<Severity>,
}

impl DiseaseFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE 1=1");
        if let Some(child_id) = self.child_id {
            builder.push(" AND d.child_id = ").push_bind(child_id);
        }
        if let Some(orphanage_id) = self.orphanage_id {
            builder.push(" AND c.orphanage_id = ").push_bind(orphanage_id);
        }
        if let Some(name) = &self.disease_name {
            builder
                .push(" AND d.disease_name ILIKE ")
                .push_bind(like_pattern(name));
        }
        if let Some(severity) = self.severity {
            builder.push(" AND d.severity = ").push_bind(severity);
        }
    }
}

/// Case count of one disease in one center over a period
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiseaseCluster {
    pub orphanage_id: OrphanageId,
    pub orphanage_name: String,
    pub disease_name: String,
    pub cases: i64,
}

impl ChildDisease {
    pub async fn insert(
        child_id: ChildId,
        health_record_id: Option<HealthRecordId>,
        disease: &NewDisease,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let row = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO child_diseases (
                child_id, health_record_id, disease_name, diagnosed_date, severity, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(child_id)
        .bind(health_record_id)
        .bind(&disease.disease_name)
        .bind(disease.diagnosed_date)
        .bind(disease.severity)
        .bind(&disease.notes)
        .fetch_one(conn)
        .await?;
        Ok(row)
    }

    pub async fn find_by_records(
        record_ids: &[HealthRecordId],
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Self>(
            "SELECT * FROM child_diseases WHERE health_record_id = ANY($1) ORDER BY diagnosed_date DESC",
        )
        .bind(record_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_paginated(
        filter: &DiseaseFilter,
        page: Page,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let from = " FROM child_diseases d JOIN children c ON c.id = d.child_id";

        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*){}", from));
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT d.*{}", from));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY d.diagnosed_date DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = query.build_query_as::<Self>().fetch_all(pool).await?;

        Ok((rows, total))
    }

    /// Cases per (center, disease) diagnosed on or after `since`
    pub async fn clusters_since(since: NaiveDate, pool: &PgPool) -> Result<Vec<DiseaseCluster>> {
        let rows = sqlx::query_as::<_, DiseaseCluster>(
            r#"
            SELECT o.id AS orphanage_id,
                   o.name AS orphanage_name,
                   LOWER(TRIM(d.disease_name)) AS disease_name,
                   COUNT(*) AS cases
            FROM child_diseases d
            JOIN children c ON c.id = d.child_id
            JOIN orphanages o ON o.id = c.orphanage_id
            WHERE d.diagnosed_date >= $1
            GROUP BY o.id, o.name, LOWER(TRIM(d.disease_name))
            "#,
        )
        .bind(since)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
