use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::common::{ChildId, NutritionRecordId, OrphanageId, Page};

crate::text_enum! {
    pub enum NutritionStatus {
        Normal => "normal",
        ModerateMalnutrition => "moderate_malnutrition",
        SevereMalnutrition => "severe_malnutrition",
        Overweight => "overweight",
    }
}

/// BMI below this is severe malnutrition
pub const SEVERE_BMI: f64 = 13.0;
/// BMI below this is moderate malnutrition
pub const MODERATE_BMI: f64 = 15.0;
/// BMI above this is overweight
pub const OVERWEIGHT_BMI: f64 = 25.0;

/// `weight / (height in m)^2`, rounded to two decimals
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    (bmi * 100.0).round() / 100.0
}

pub fn classify_bmi(bmi: f64) -> NutritionStatus {
    if bmi < SEVERE_BMI {
        NutritionStatus::SevereMalnutrition
    } else if bmi < MODERATE_BMI {
        NutritionStatus::ModerateMalnutrition
    } else if bmi > OVERWEIGHT_BMI {
        NutritionStatus::Overweight
    } else {
        NutritionStatus::Normal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NutritionRecord {
    pub id: NutritionRecordId,
    pub child_id: ChildId,
    pub orphanage_id: OrphanageId,
    pub child_name: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub nutrition_status: NutritionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fully computed row values (BMI and status already resolved)
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionValues {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub nutrition_status: NutritionStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NutritionFilter {
    pub child_id: Option<ChildId>,
    pub orphanage_id: Option<OrphanageId>,
    pub status: Option<NutritionStatus>,
}

/// Child whose most recent measurement is severe malnutrition
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SevereCase {
    pub child_id: ChildId,
    pub child_name: String,
    pub orphanage_id: OrphanageId,
    pub orphanage_name: String,
    pub date: NaiveDate,
    pub bmi: f64,
}

const SELECT_RECORD: &str = r#"
    SELECT n.*, c.orphanage_id, c.first_name || ' ' || c.last_name AS child_name
    FROM nutrition_records n
    JOIN children c ON c.id = n.child_id
"#;

impl NutritionFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE 1=1");
        if let Some(child_id) = self.child_id {
            builder.push(" AND n.child_id = ").push_bind(child_id);
        }
        if let Some(orphanage_id) = self.orphanage_id {
            builder.push(" AND c.orphanage_id = ").push_bind(orphanage_id);
        }
        if let Some(status) = self.status {
            builder.push(" AND n.nutrition_status = ").push_bind(status);
        }
    }
}

impl NutritionRecord {
    pub async fn find_by_id(id: NutritionRecordId, pool: &PgPool) -> Result<Option<Self>> {
        let record = sqlx::query_as::<_, Self>(&format!("{} WHERE n.id = $1", SELECT_RECORD))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(record)
    }

    pub async fn find_paginated(
        filter: &NutritionFilter,
        page: Page,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM nutrition_records n JOIN children c ON c.id = n.child_id",
        );
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_RECORD);
        filter.push_where(&mut query);
        query
            .push(" ORDER BY n.date DESC, n.created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = query.build_query_as::<Self>().fetch_all(pool).await?;

        Ok((rows, total))
    }

    pub async fn create(child_id: ChildId, values: &NutritionValues, pool: &PgPool) -> Result<Self> {
        let id: NutritionRecordId = sqlx::query_scalar(
            r#"
            INSERT INTO nutrition_records (
                child_id, date, weight_kg, height_cm, bmi, nutrition_status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(child_id)
        .bind(values.date)
        .bind(values.weight_kg)
        .bind(values.height_cm)
        .bind(values.bmi)
        .bind(values.nutrition_status)
        .bind(&values.notes)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(id, pool)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Nutrition record {} vanished after insert", id))
    }

    /// Overwrites every measured value. Returns `None` when missing.
    pub async fn update(
        id: NutritionRecordId,
        values: &NutritionValues,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let updated: Option<NutritionRecordId> = sqlx::query_scalar(
            r#"
            UPDATE nutrition_records SET
                date = $2, weight_kg = $3, height_cm = $4, bmi = $5,
                nutrition_status = $6, notes = $7
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(values.date)
        .bind(values.weight_kg)
        .bind(values.height_cm)
        .bind(values.bmi)
        .bind(values.nutrition_status)
        .bind(&values.notes)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(id, pool).await,
            None => Ok(None),
        }
    }

    pub async fn delete(id: NutritionRecordId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM nutrition_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Children whose latest record is severe malnutrition
    pub async fn latest_severe_cases(pool: &PgPool) -> Result<Vec<SevereCase>> {
        let rows = sqlx::query_as::<_, SevereCase>(
            r#"
            SELECT latest.child_id,
                   c.first_name || ' ' || c.last_name AS child_name,
                   o.id AS orphanage_id,
                   o.name AS orphanage_name,
                   latest.date,
                   latest.bmi
            FROM (
                SELECT DISTINCT ON (child_id) child_id, date, bmi, nutrition_status
                FROM nutrition_records
                ORDER BY child_id, date DESC, created_at DESC
            ) latest
            JOIN children c ON c.id = latest.child_id
            JOIN orphanages o ON o.id = c.orphanage_id
            WHERE latest.nutrition_status = 'severe_malnutrition'
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
