use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{OrphanageId, PaginationArgs, UserId};
use crate::domains::orphanages::models::{DocumentRecord, LegalStatus, Orphanage};

/// Query string of `GET /api/orphanages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrphanageListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub province: Option<String>,
    pub legal_status: Option<LegalStatus>,
    pub search: Option<String>,
}

impl OrphanageListQuery {
    pub fn pagination(&self) -> PaginationArgs {
        PaginationArgs {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Body of `POST /api/orphanages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrphanageInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    pub address: Option<String>,
    #[serde(default)]
    pub contact_person: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}

/// Body of `PUT /api/orphanages/:id`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrphanagePatch {
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

/// Body of `PATCH /api/orphanages/:id/legal-status`
#[derive(Debug, Clone, Deserialize)]
pub struct LegalStatusInput {
    pub status: LegalStatus,
    pub note: Option<String>,
}

/// Parsed multipart upload, before validation
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    pub document_type: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Option<Vec<u8>>,
    pub expires_at: Option<NaiveDate>,
}

/// Care center as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanageData {
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
    pub documents: Vec<DocumentRecord>,
    pub children_count: i64,
    /// True when more children are registered than the declared capacity
    pub over_capacity: bool,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Orphanage> for OrphanageData {
    fn from(orphanage: Orphanage) -> Self {
        let over_capacity = orphanage.is_over_capacity();
        Self {
            id: orphanage.id,
            name: orphanage.name,
            province: orphanage.province,
            city: orphanage.city,
            address: orphanage.address,
            contact_person: orphanage.contact_person,
            phone: orphanage.phone,
            email: orphanage.email,
            description: orphanage.description,
            capacity: orphanage.capacity,
            legal_status: orphanage.legal_status,
            documents: orphanage.documents.0,
            children_count: orphanage.children_count,
            over_capacity,
            created_by: orphanage.created_by,
            created_at: orphanage.created_at,
            updated_at: orphanage.updated_at,
        }
    }
}
