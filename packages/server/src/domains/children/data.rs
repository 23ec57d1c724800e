use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ChildId, OrphanageId, PaginationArgs};
use crate::domains::children::models::{Child, Gender, ParentStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChildListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub orphanage_id: Option<OrphanageId>,
    pub gender: Option<Gender>,
    pub parent_status: Option<ParentStatus>,
    pub search: Option<String>,
}

impl ChildListQuery {
    pub fn pagination(&self) -> PaginationArgs {
        PaginationArgs {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Body of `POST /api/children`
#[derive(Debug, Clone, Deserialize)]
pub struct ChildInput {
    pub orphanage_id: OrphanageId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub estimated_age: Option<i32>,
    pub entry_date: NaiveDate,
    pub parent_status: ParentStatus,
    pub internal_code: Option<String>,
    pub photo_url: Option<String>,
}

/// Body of `PUT /api/children/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChildPatch {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildData {
    pub id: ChildId,
    pub orphanage_id: OrphanageId,
    pub orphanage_name: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub estimated_age: Option<i32>,
    /// Whole years, from the birth date or the estimate
    pub age: Option<i32>,
    pub entry_date: NaiveDate,
    pub parent_status: ParentStatus,
    pub internal_code: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Child> for ChildData {
    fn from(child: Child) -> Self {
        let age = child.age_years(Utc::now().date_naive());
        Self {
            id: child.id,
            orphanage_id: child.orphanage_id,
            orphanage_name: child.orphanage_name,
            first_name: child.first_name,
            last_name: child.last_name,
            gender: child.gender,
            birth_date: child.birth_date,
            estimated_age: child.estimated_age,
            age,
            entry_date: child.entry_date,
            parent_status: child.parent_status,
            internal_code: child.internal_code,
            photo_url: child.photo_url,
            created_at: child.created_at,
            updated_at: child.updated_at,
        }
    }
}
