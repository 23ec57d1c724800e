use chrono::NaiveDate;
use serde::Deserialize;

use crate::common::{ChildId, OrphanageId, PaginationArgs};
use crate::domains::nutrition::models::NutritionStatus;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NutritionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub child_id: Option<ChildId>,
    pub orphanage_id: Option<OrphanageId>,
    pub status: Option<NutritionStatus>,
}

impl NutritionListQuery {
    pub fn pagination(&self) -> PaginationArgs {
        PaginationArgs {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Body of `POST /api/nutrition-records`
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionInput {
    pub child_id: ChildId,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub height_cm: f64,
    /// Derived from the BMI when absent
    pub nutrition_status: Option<NutritionStatus>,
    pub notes: Option<String>,
}

/// Body of `PUT /api/nutrition-records/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NutritionPatch {
    pub date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub nutrition_status: Option<NutritionStatus>,
    pub notes: Option<String>,
}
