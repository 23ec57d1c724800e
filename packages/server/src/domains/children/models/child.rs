use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::common::{like_pattern, ChildId, OrphanageId, Page};

crate::text_enum! {
    pub enum Gender {
        Male => "M",
        Female => "F",
    }
}

crate::text_enum! {
    /// Family situation of a child at intake
    pub enum ParentStatus {
        TotalOrphan => "total_orphan",
        PartialOrphan => "partial_orphan",
        Abandoned => "abandoned",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Child {
    pub id: ChildId,
    pub orphanage_id: OrphanageId,
    pub orphanage_name: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub estimated_age: Option<i32>,
    pub entry_date: NaiveDate,
    pub parent_status: ParentStatus,
    pub internal_code: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateChild {
    pub orphanage_id: OrphanageId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub estimated_age: Option<i32>,
    pub entry_date: NaiveDate,
    pub parent_status: ParentStatus,
    pub internal_code: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateChild {
    pub orphanage_id: Option<OrphanageId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub estimated_age: Option<i32>,
    pub entry_date: Option<NaiveDate>,
    pub parent_status: Option<ParentStatus>,
    pub internal_code: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChildFilter {
    pub orphanage_id: Option<OrphanageId>,
    pub gender: Option<Gender>,
    pub parent_status: Option<ParentStatus>,
    pub search: Option<String>,
}

const SELECT_CHILD: &str = r#"
    SELECT c.*, o.name AS orphanage_name
    FROM children c
    JOIN orphanages o ON o.id = c.orphanage_id
"#;

impl ChildFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE 1=1");
        if let Some(orphanage_id) = self.orphanage_id {
            builder.push(" AND c.orphanage_id = ").push_bind(orphanage_id);
        }
        if let Some(gender) = self.gender {
            builder.push(" AND c.gender = ").push_bind(gender);
        }
        if let Some(parent_status) = self.parent_status {
            builder.push(" AND c.parent_status = ").push_bind(parent_status);
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (c.first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.internal_code ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

impl Child {
    /// Age in whole years: from the birth date when known, else the estimate.
    pub fn age_years(&self, today: NaiveDate) -> Option<i32> {
        match self.birth_date {
            Some(birth) => {
                let mut age = today.year() - birth.year();
                if (today.month(), today.day()) < (birth.month(), birth.day()) {
                    age -= 1;
                }
                Some(age.max(0))
            }
            None => self.estimated_age,
        }
    }

    pub async fn find_by_id(id: ChildId, pool: &PgPool) -> Result<Option<Self>> {
        let child = sqlx::query_as::<_, Self>(&format!("{} WHERE c.id = $1", SELECT_CHILD))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(child)
    }

    pub async fn exists(id: ChildId, pool: &PgPool) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM children WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    pub async fn find_paginated(
        filter: &ChildFilter,
        page: Page,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM children c");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_CHILD);
        filter.push_where(&mut query);
        query
            .push(" ORDER BY c.last_name, c.first_name LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = query.build_query_as::<Self>().fetch_all(pool).await?;

        Ok((rows, total))
    }

    pub async fn create(input: CreateChild, pool: &PgPool) -> Result<Self> {
        let id: ChildId = sqlx::query_scalar(
            r#"
            INSERT INTO children (
                orphanage_id, first_name, last_name, gender, birth_date,
                estimated_age, entry_date, parent_status, internal_code, photo_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(input.orphanage_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.gender)
        .bind(input.birth_date)
        .bind(input.estimated_age)
        .bind(input.entry_date)
        .bind(input.parent_status)
        .bind(&input.internal_code)
        .bind(&input.photo_url)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(id, pool)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Child {} vanished after insert", id))
    }

    pub async fn update(id: ChildId, input: UpdateChild, pool: &PgPool) -> Result<Option<Self>> {
        let updated: Option<ChildId> = sqlx::query_scalar(
            r#"
            UPDATE children SET
                orphanage_id = COALESCE($2, orphanage_id),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                gender = COALESCE($5, gender),
                birth_date = COALESCE($6, birth_date),
                estimated_age = COALESCE($7, estimated_age),
                entry_date = COALESCE($8, entry_date),
                parent_status = COALESCE($9, parent_status),
                internal_code = COALESCE($10, internal_code),
                photo_url = COALESCE($11, photo_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(input.orphanage_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.gender)
        .bind(input.birth_date)
        .bind(input.estimated_age)
        .bind(input.entry_date)
        .bind(input.parent_status)
        .bind(&input.internal_code)
        .bind(&input.photo_url)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(id, pool).await,
            None => Ok(None),
        }
    }

    /// Removes diseases, health records, nutrition records, then the child,
    /// all in one transaction. Returns false when the child did not exist.
    pub async fn delete_with_records(id: ChildId, pool: &PgPool) -> Result<bool> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM child_diseases WHERE child_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM health_records WHERE child_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM nutrition_records WHERE child_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM children WHERE id = $1")
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

#[cfg(test)]
mod tests {
    use super::*;

    fn child(birth_date: Option<NaiveDate>, estimated_age: Option<i32>) -> Child {
        Child {
            id: ChildId::new(),
            orphanage_id: OrphanageId::new(),
            orphanage_name: "Centre".into(),
            first_name: "Grâce".into(),
            last_name: "M.".into(),
            gender: Gender::Female,
            birth_date,
            estimated_age,
            entry_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            parent_status: ParentStatus::Abandoned,
            internal_code: None,
            photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_age_from_birth_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let before_birthday = child(NaiveDate::from_ymd_opt(2015, 7, 1), None);
        let after_birthday = child(NaiveDate::from_ymd_opt(2015, 6, 1), None);
        assert_eq!(before_birthday.age_years(today), Some(9));
        assert_eq!(after_birthday.age_years(today), Some(10));
    }

    #[test]
    fn test_age_falls_back_to_estimate() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(child(None, Some(7)).age_years(today), Some(7));
        assert_eq!(child(None, None).age_years(today), None);
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::Male.as_str(), "M");
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(
            serde_json::to_string(&ParentStatus::PartialOrphan).unwrap(),
            "\"partial_orphan\""
        );
    }
}
