use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

use crate::domains::children::models::{Gender, ParentStatus};
use crate::domains::orphanages::models::LegalStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub total_orphanages: i64,
    pub orphanages_by_legal_status: BTreeMap<String, i64>,
    pub total_children: i64,
    pub children_by_gender: BTreeMap<String, i64>,
    pub children_by_parent_status: BTreeMap<String, i64>,
    /// Sum of declared capacities
    pub total_capacity: i64,
    pub unread_notifications: i64,
    pub pending_partner_requests: i64,
}

/// `(value, count)` pairs for a TEXT column, missing values included as zero
async fn count_by(
    table: &str,
    column: &str,
    values: impl Iterator<Item = &'static str>,
    pool: &PgPool,
) -> Result<BTreeMap<String, i64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
        "SELECT {column}, COUNT(*) FROM {table} GROUP BY {column}"
    ))
    .fetch_all(pool)
    .await?;

    let mut counts: BTreeMap<String, i64> = values.map(|v| (v.to_string(), 0)).collect();
    for (value, count) in rows {
        counts.insert(value, count);
    }
    Ok(counts)
}

impl DashboardStats {
    /// Registry-wide figures; notification and partner counts are filled by the caller
    pub async fn load_registry(pool: &PgPool) -> Result<Self> {
        let (total_orphanages, total_capacity): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(capacity), 0)::bigint FROM orphanages",
        )
        .fetch_one(pool)
        .await?;

        let total_children: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM children")
            .fetch_one(pool)
            .await?;

        Ok(Self {
            total_orphanages,
            orphanages_by_legal_status: count_by(
                "orphanages",
                "legal_status",
                LegalStatus::ALL.iter().map(|s| s.as_str()),
                pool,
            )
            .await?,
            total_children,
            children_by_gender: count_by(
                "children",
                "gender",
                Gender::ALL.iter().map(|g| g.as_str()),
                pool,
            )
            .await?,
            children_by_parent_status: count_by(
                "children",
                "parent_status",
                ParentStatus::ALL.iter().map(|s| s.as_str()),
                pool,
            )
            .await?,
            total_capacity,
            ..Default::default()
        })
    }
}
