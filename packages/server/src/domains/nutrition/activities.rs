//! Nutrition record activities

use chrono::NaiveDate;
use tracing::info;

use crate::common::{not_in_future, optional, ApiError, ApiResult, NutritionRecordId, Paginated};
use crate::domains::children::models::Child;
use crate::domains::nutrition::data::{NutritionInput, NutritionListQuery, NutritionPatch};
use crate::domains::nutrition::models::{
    classify_bmi, compute_bmi, NutritionFilter, NutritionRecord, NutritionStatus, NutritionValues,
};
use crate::kernel::ServerDeps;

pub const MAX_WEIGHT_KG: f64 = 200.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;

fn record_not_found() -> ApiError {
    ApiError::not_found("Mesure nutritionnelle introuvable")
}

pub fn validate_measurements(weight_kg: f64, height_cm: f64) -> ApiResult<()> {
    if !(weight_kg > 0.0 && weight_kg <= MAX_WEIGHT_KG) {
        return Err(ApiError::bad_request(format!(
            "Le poids doit être compris entre 0 et {} kg",
            MAX_WEIGHT_KG
        )));
    }
    if !(height_cm > 0.0 && height_cm <= MAX_HEIGHT_CM) {
        return Err(ApiError::bad_request(format!(
            "La taille doit être comprise entre 0 et {} cm",
            MAX_HEIGHT_CM
        )));
    }
    Ok(())
}

/// Validated values with BMI computed and the status defaulted from it
pub fn nutrition_values(
    date: NaiveDate,
    weight_kg: f64,
    height_cm: f64,
    status: Option<NutritionStatus>,
    notes: Option<String>,
) -> ApiResult<NutritionValues> {
    not_in_future(date, "date")?;
    validate_measurements(weight_kg, height_cm)?;

    let bmi = compute_bmi(weight_kg, height_cm);
    Ok(NutritionValues {
        date,
        weight_kg,
        height_cm,
        bmi,
        nutrition_status: status.unwrap_or_else(|| classify_bmi(bmi)),
        notes: optional(notes),
    })
}

/// Applies a patch on top of the stored values. The status is re-derived
/// when a measurement changes and the client did not provide one.
pub fn patched_values(
    existing: &NutritionRecord,
    patch: NutritionPatch,
) -> ApiResult<NutritionValues> {
    let measurements_changed = patch.weight_kg.is_some() || patch.height_cm.is_some();
    let status = match patch.nutrition_status {
        Some(status) => Some(status),
        None if measurements_changed => None,
        None => Some(existing.nutrition_status),
    };

    nutrition_values(
        patch.date.unwrap_or(existing.date),
        patch.weight_kg.unwrap_or(existing.weight_kg),
        patch.height_cm.unwrap_or(existing.height_cm),
        status,
        patch.notes.or_else(|| existing.notes.clone()),
    )
}

pub async fn create_nutrition_record(
    input: NutritionInput,
    deps: &ServerDeps,
) -> ApiResult<NutritionRecord> {
    let values = nutrition_values(
        input.date,
        input.weight_kg,
        input.height_cm,
        input.nutrition_status,
        input.notes,
    )?;

    if !Child::exists(input.child_id, &deps.db_pool).await? {
        return Err(ApiError::not_found("Enfant introuvable"));
    }

    let record = NutritionRecord::create(input.child_id, &values, &deps.db_pool).await?;
    info!(
        nutrition_record_id = %record.id,
        child_id = %record.child_id,
        bmi = record.bmi,
        status = %record.nutrition_status,
        "Nutrition record created"
    );
    Ok(record)
}

pub async fn update_nutrition_record(
    id: NutritionRecordId,
    patch: NutritionPatch,
    deps: &ServerDeps,
) -> ApiResult<NutritionRecord> {
    let existing = NutritionRecord::find_by_id(id, &deps.db_pool)
        .await?
        .ok_or_else(record_not_found)?;
    let values = patched_values(&existing, patch)?;

    NutritionRecord::update(id, &values, &deps.db_pool)
        .await?
        .ok_or_else(record_not_found)
}

pub async fn delete_nutrition_record(id: NutritionRecordId, deps: &ServerDeps) -> ApiResult<()> {
    if !NutritionRecord::delete(id, &deps.db_pool).await? {
        return Err(record_not_found());
    }
    info!(nutrition_record_id = %id, "Nutrition record deleted");
    Ok(())
}

pub async fn list_nutrition_records(
    query: NutritionListQuery,
    deps: &ServerDeps,
) -> ApiResult<Paginated<NutritionRecord>> {
    let page = query.pagination().validate()?;
    let filter = NutritionFilter {
        child_id: query.child_id,
        orphanage_id: query.orphanage_id,
        status: query.status,
    };
    let (rows, total) = NutritionRecord::find_paginated(&filter, page, &deps.db_pool).await?;
    Ok(Paginated::new(rows, page, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ChildId, OrphanageId};
    use chrono::Utc;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn existing() -> NutritionRecord {
        NutritionRecord {
            id: NutritionRecordId::new(),
            child_id: ChildId::new(),
            orphanage_id: OrphanageId::new(),
            child_name: "Jean B.".into(),
            date: date(),
            weight_kg: 20.0,
            height_cm: 110.0,
            bmi: 16.53,
            nutrition_status: NutritionStatus::Normal,
            notes: Some("suivi".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_defaults_from_bmi() {
        let values = nutrition_values(date(), 12.0, 100.0, None, None).unwrap();
        assert_eq!(values.bmi, 12.0);
        assert_eq!(values.nutrition_status, NutritionStatus::SevereMalnutrition);
    }

    #[test]
    fn test_explicit_status_kept() {
        let values =
            nutrition_values(date(), 12.0, 100.0, Some(NutritionStatus::Normal), None).unwrap();
        assert_eq!(values.nutrition_status, NutritionStatus::Normal);
    }

    #[test]
    fn test_measurement_bounds() {
        assert!(nutrition_values(date(), 0.0, 100.0, None, None).is_err());
        assert!(nutrition_values(date(), 201.0, 100.0, None, None).is_err());
        assert!(nutrition_values(date(), 20.0, 0.0, None, None).is_err());
        assert!(nutrition_values(date(), 20.0, 251.0, None, None).is_err());
        assert!(nutrition_values(date(), f64::NAN, 100.0, None, None).is_err());
        assert!(nutrition_values(date(), 200.0, 250.0, None, None).is_ok());
    }

    #[test]
    fn test_patch_recomputes_bmi_and_status() {
        let patch = NutritionPatch {
            weight_kg: Some(12.0),
            height_cm: Some(100.0),
            ..Default::default()
        };
        let values = patched_values(&existing(), patch).unwrap();
        assert_eq!(values.bmi, 12.0);
        assert_eq!(values.nutrition_status, NutritionStatus::SevereMalnutrition);
        assert_eq!(values.notes.as_deref(), Some("suivi"));
    }

    #[test]
    fn test_patch_without_measurements_keeps_status() {
        let patch = NutritionPatch {
            notes: Some("contrôle".into()),
            ..Default::default()
        };
        let values = patched_values(&existing(), patch).unwrap();
        assert_eq!(values.nutrition_status, NutritionStatus::Normal);
        assert_eq!(values.bmi, 16.53);
    }
}
