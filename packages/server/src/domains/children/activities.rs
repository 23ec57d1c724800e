//! Child registration activities

use chrono::NaiveDate;
use tracing::info;

use crate::common::{
    not_in_future, optional, required, ApiError, ApiResult, ChildId, Paginated,
};
use crate::domains::children::data::{ChildData, ChildInput, ChildListQuery, ChildPatch};
use crate::domains::children::models::{Child, ChildFilter, CreateChild, UpdateChild};
use crate::domains::orphanages::models::Orphanage;
use crate::kernel::ServerDeps;

pub const MAX_ESTIMATED_AGE: i32 = 25;

pub(crate) fn child_not_found() -> ApiError {
    ApiError::not_found("Enfant introuvable")
}

/// A child needs either a birth date or an age estimate. The birth date can
/// not be in the future nor after the entry date.
pub fn validate_child_dates(
    birth_date: Option<NaiveDate>,
    estimated_age: Option<i32>,
    entry_date: NaiveDate,
) -> ApiResult<()> {
    not_in_future(entry_date, "entry_date")?;

    if let Some(birth_date) = birth_date {
        not_in_future(birth_date, "birth_date")?;
        if birth_date > entry_date {
            return Err(ApiError::bad_request(
                "La date de naissance doit précéder la date d'entrée",
            ));
        }
    }

    if let Some(age) = estimated_age {
        if !(0..=MAX_ESTIMATED_AGE).contains(&age) {
            return Err(ApiError::bad_request(format!(
                "L'âge estimé doit être compris entre 0 et {} ans",
                MAX_ESTIMATED_AGE
            )));
        }
    }

    if birth_date.is_none() && estimated_age.is_none() {
        return Err(ApiError::bad_request(
            "La date de naissance ou l'âge estimé est obligatoire",
        ));
    }

    Ok(())
}

pub fn validate_new_child(input: ChildInput) -> ApiResult<CreateChild> {
    validate_child_dates(input.birth_date, input.estimated_age, input.entry_date)?;

    Ok(CreateChild {
        orphanage_id: input.orphanage_id,
        first_name: required(&input.first_name, "first_name")?,
        last_name: required(&input.last_name, "last_name")?,
        gender: input.gender,
        birth_date: input.birth_date,
        estimated_age: input.estimated_age,
        entry_date: input.entry_date,
        parent_status: input.parent_status,
        internal_code: optional(input.internal_code),
        photo_url: optional(input.photo_url),
    })
}

pub async fn list_children(
    query: ChildListQuery,
    deps: &ServerDeps,
) -> ApiResult<Paginated<ChildData>> {
    let page = query.pagination().validate()?;
    let filter = ChildFilter {
        orphanage_id: query.orphanage_id,
        gender: query.gender,
        parent_status: query.parent_status,
        search: optional(query.search),
    };

    let (rows, total) = Child::find_paginated(&filter, page, &deps.db_pool).await?;
    Ok(Paginated::new(rows, page, total).map(ChildData::from))
}

pub async fn get_child(id: ChildId, deps: &ServerDeps) -> ApiResult<ChildData> {
    Child::find_by_id(id, &deps.db_pool)
        .await?
        .map(ChildData::from)
        .ok_or_else(child_not_found)
}

pub async fn add_child(input: ChildInput, deps: &ServerDeps) -> ApiResult<ChildData> {
    let input = validate_new_child(input)?;

    if !Orphanage::exists(input.orphanage_id, &deps.db_pool).await? {
        return Err(ApiError::not_found("Centre introuvable"));
    }

    let child = Child::create(input, &deps.db_pool).await?;
    info!(child_id = %child.id, orphanage_id = %child.orphanage_id, "Child registered");
    Ok(child.into())
}

pub async fn update_child(
    id: ChildId,
    patch: ChildPatch,
    deps: &ServerDeps,
) -> ApiResult<ChildData> {
    let existing = Child::find_by_id(id, &deps.db_pool)
        .await?
        .ok_or_else(child_not_found)?;

    // Cross-field rules apply to the record as it will be after the update
    validate_child_dates(
        patch.birth_date.or(existing.birth_date),
        patch.estimated_age.or(existing.estimated_age),
        patch.entry_date.unwrap_or(existing.entry_date),
    )?;

    if let Some(orphanage_id) = patch.orphanage_id {
        if !Orphanage::exists(orphanage_id, &deps.db_pool).await? {
            return Err(ApiError::not_found("Centre introuvable"));
        }
    }

    let required_if_present = |value: Option<String>, field: &str| -> ApiResult<Option<String>> {
        value.map(|v| required(&v, field)).transpose()
    };

    let update = UpdateChild {
        orphanage_id: patch.orphanage_id,
        first_name: required_if_present(patch.first_name, "first_name")?,
        last_name: required_if_present(patch.last_name, "last_name")?,
        gender: patch.gender,
        birth_date: patch.birth_date,
        estimated_age: patch.estimated_age,
        entry_date: patch.entry_date,
        parent_status: patch.parent_status,
        internal_code: optional(patch.internal_code),
        photo_url: optional(patch.photo_url),
    };

    Child::update(id, update, &deps.db_pool)
        .await?
        .map(ChildData::from)
        .ok_or_else(child_not_found)
}

pub async fn delete_child(id: ChildId, deps: &ServerDeps) -> ApiResult<()> {
    if !Child::delete_with_records(id, &deps.db_pool).await? {
        return Err(child_not_found());
    }
    info!(child_id = %id, "Child and related records deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_birth_date_or_estimate_required() {
        assert!(validate_child_dates(None, None, date(2024, 1, 1)).is_err());
        assert!(validate_child_dates(None, Some(6), date(2024, 1, 1)).is_ok());
        assert!(validate_child_dates(Some(date(2018, 3, 2)), None, date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_birth_after_entry_rejected() {
        assert!(validate_child_dates(Some(date(2024, 2, 1)), None, date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_future_dates_rejected() {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        assert!(validate_child_dates(None, Some(3), tomorrow).is_err());
    }

    #[test]
    fn test_estimated_age_range() {
        assert!(validate_child_dates(None, Some(-1), date(2024, 1, 1)).is_err());
        assert!(validate_child_dates(None, Some(26), date(2024, 1, 1)).is_err());
        assert!(validate_child_dates(None, Some(25), date(2024, 1, 1)).is_ok());
    }
}
