use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::disease::{ChildDisease, NewDisease};
use crate::common::{ChildId, HealthRecordId, OrphanageId, Page};

crate::text_enum! {
    pub enum VaccinationStatus {
        UpToDate => "up_to_date",
        Incomplete => "incomplete",
        NotVaccinated => "not_vaccinated",
        Unknown => "unknown",
    }
}

/// Medical check-up of a child
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthRecord {
    pub id: HealthRecordId,
    pub child_id: ChildId,
    pub orphanage_id: OrphanageId,
    pub child_name: String,
    pub date: NaiveDate,
    pub vaccination_status: VaccinationStatus,
    pub chronic_conditions: Option<String>,
    pub medications: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateHealthRecord {
    pub child_id: ChildId,
    pub date: NaiveDate,
    pub vaccination_status: VaccinationStatus,
    pub chronic_conditions: Option<String>,
    pub medications: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HealthRecordFilter {
    pub child_id: Option<ChildId>,
    pub orphanage_id: Option<OrphanageId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

const SELECT_RECORD: &str = r#"
    SELECT h.*, c.orphanage_id, c.first_name || ' ' || c.last_name AS child_name
    FROM health_records h
    JOIN children c ON c.id = h.child_id
"#;

impl HealthRecordFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE 1=1");
        if let Some(child_id) = self.child_id {
            builder.push(" AND h.child_id = ").push_bind(child_id);
        }
        if let Some(orphanage_id) = self.orphanage_id {
            builder.push(" AND c.orphanage_id = ").push_bind(orphanage_id);
        }
        if let Some(from) = self.from {
            builder.push(" AND h.date >= ").push_bind(from);
        }
        if let Some(to) = self.to {
            builder.push(" AND h.date <= ").push_bind(to);
        }
    }
}

impl HealthRecord {
    pub async fn find_by_id(id: HealthRecordId, pool: &PgPool) -> Result<Option<Self>> {
        let record = sqlx::query_as::<_, Self>(&format!("{} WHERE h.id = $1", SELECT_RECORD))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(record)
    }

    /// Newest check-ups first
    pub async fn find_paginated(
        filter: &HealthRecordFilter,
        page: Page,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM health_records h JOIN children c ON c.id = h.child_id",
        );
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_RECORD);
        filter.push_where(&mut query);
        query
            .push(" ORDER BY h.date DESC, h.created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = query.build_query_as::<Self>().fetch_all(pool).await?;

        Ok((rows, total))
    }

    /// Inserts the record and its diagnosed diseases atomically.
    pub async fn create_with_diseases(
        input: CreateHealthRecord,
        diseases: Vec<NewDisease>,
        pool: &PgPool,
    ) -> Result<(Self, Vec<ChildDisease>)> {
        let mut tx = pool.begin().await?;

        let id: HealthRecordId = sqlx::query_scalar(
            r#"
            INSERT INTO health_records (
                child_id, date, vaccination_status, chronic_conditions, medications, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.child_id)
        .bind(input.date)
        .bind(input.vaccination_status)
        .bind(&input.chronic_conditions)
        .bind(&input.medications)
        .bind(&input.remarks)
        .fetch_one(&mut *tx)
        .await?;

        let mut inserted = Vec::with_capacity(diseases.len());
        for disease in diseases {
            let row = ChildDisease::insert(input.child_id, Some(id), &disease, &mut *tx).await?;
            inserted.push(row);
        }

        tx.commit().await?;

        let record = Self::find_by_id(id, pool)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Health record {} vanished after insert", id))?;
        Ok((record, inserted))
    }

    /// Linked diseases go first, then the record. Returns false when missing.
    pub async fn delete(id: HealthRecordId, pool: &PgPool) -> Result<bool> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM child_diseases WHERE health_record_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM health_records WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }
}
