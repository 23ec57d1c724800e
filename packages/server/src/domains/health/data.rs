use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::{ChildId, OrphanageId, PaginationArgs};
use crate::domains::health::models::{ChildDisease, HealthRecord, Severity, VaccinationStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthRecordListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub child_id: Option<ChildId>,
    pub orphanage_id: Option<OrphanageId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HealthRecordListQuery {
    pub fn pagination(&self) -> PaginationArgs {
        PaginationArgs {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiseaseListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub child_id: Option<ChildId>,
    pub orphanage_id: Option<OrphanageId>,
    pub disease_name: Option<String>,
    pub severity: Option<Severity>,
}

impl DiseaseListQuery {
    pub fn pagination(&self) -> PaginationArgs {
        PaginationArgs {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Body of `POST /api/health-records`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthRecordInput {
    pub child_id: ChildId,
    pub date: NaiveDate,
    pub vaccination_status: Option<VaccinationStatus>,
    pub chronic_conditions: Option<String>,
    pub medications: Option<String>,
    pub remarks: Option<String>,
    #[serde(default)]
    pub diseases: Vec<DiseaseInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiseaseInput {
    #[serde(default)]
    pub disease_name: String,
    /// Defaults to the check-up date
    pub diagnosed_date: Option<NaiveDate>,
    pub severity: Option<Severity>,
    pub notes: Option<String>,
}

/// A check-up with the diseases diagnosed during it
#[derive(Debug, Clone, Serialize)]
pub struct HealthRecordData {
    #[serde(flatten)]
    pub record: HealthRecord,
    pub diseases: Vec<ChildDisease>,
}
