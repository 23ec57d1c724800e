//! Center registry: listing, creation, edits, legal review

use tracing::{info, warn};

use crate::common::{
    optional, required, validate_email, ApiError, ApiResult, OrphanageId, Paginated, UserId,
};
use crate::domains::notifications::activities::create_notification;
use crate::domains::notifications::models::{kinds, NewNotification, Priority};
use crate::domains::orphanages::data::{
    LegalStatusInput, OrphanageData, OrphanageInput, OrphanageListQuery, OrphanagePatch,
};
use crate::domains::orphanages::models::{
    CreateOrphanage, LegalStatus, Orphanage, OrphanageFilter, UpdateOrphanage,
};
use crate::kernel::ServerDeps;

pub(crate) fn center_not_found() -> ApiError {
    ApiError::not_found("Centre introuvable")
}

fn validate_capacity(capacity: Option<i32>) -> ApiResult<()> {
    match capacity {
        Some(c) if c < 0 => Err(ApiError::bad_request(
            "La capacité doit être un nombre positif",
        )),
        _ => Ok(()),
    }
}

fn validate_optional_email(email: &Option<String>) -> ApiResult<()> {
    match email {
        Some(email) => validate_email(email),
        None => Ok(()),
    }
}

/// Checks and normalizes a creation request
pub fn validate_new_orphanage(
    input: OrphanageInput,
    created_by: Option<UserId>,
) -> ApiResult<CreateOrphanage> {
    let email = optional(input.email);
    validate_optional_email(&email)?;
    validate_capacity(input.capacity)?;

    Ok(CreateOrphanage {
        name: required(&input.name, "name")?,
        province: required(&input.province, "province")?,
        city: required(&input.city, "city")?,
        address: optional(input.address),
        contact_person: required(&input.contact_person, "contact_person")?,
        phone: optional(input.phone),
        email,
        description: optional(input.description),
        capacity: input.capacity,
        created_by,
    })
}

/// Same rules as creation, applied only to the fields present
pub fn validate_orphanage_patch(patch: OrphanagePatch) -> ApiResult<UpdateOrphanage> {
    let required_if_present = |value: Option<String>, field: &str| -> ApiResult<Option<String>> {
        value.map(|v| required(&v, field)).transpose()
    };

    let email = optional(patch.email);
    validate_optional_email(&email)?;
    validate_capacity(patch.capacity)?;

    Ok(UpdateOrphanage {
        name: required_if_present(patch.name, "name")?,
        province: required_if_present(patch.province, "province")?,
        city: required_if_present(patch.city, "city")?,
        address: optional(patch.address),
        contact_person: required_if_present(patch.contact_person, "contact_person")?,
        phone: optional(patch.phone),
        email,
        description: optional(patch.description),
        capacity: patch.capacity,
    })
}

pub async fn list_orphanages(
    query: OrphanageListQuery,
    deps: &ServerDeps,
) -> ApiResult<Paginated<OrphanageData>> {
    let page = query.pagination().validate()?;
    let filter = OrphanageFilter {
        province: optional(query.province),
        legal_status: query.legal_status,
        search: optional(query.search),
    };

    let (rows, total) = Orphanage::find_paginated(&filter, page, &deps.db_pool).await?;
    Ok(Paginated::new(rows, page, total).map(OrphanageData::from))
}

pub async fn get_orphanage(id: OrphanageId, deps: &ServerDeps) -> ApiResult<OrphanageData> {
    Orphanage::find_by_id(id, &deps.db_pool)
        .await?
        .map(OrphanageData::from)
        .ok_or_else(center_not_found)
}

pub async fn create_orphanage(
    input: OrphanageInput,
    created_by: UserId,
    deps: &ServerDeps,
) -> ApiResult<OrphanageData> {
    let input = validate_new_orphanage(input, Some(created_by))?;
    let orphanage = Orphanage::create(input, &deps.db_pool).await?;
    info!(orphanage_id = %orphanage.id, name = %orphanage.name, "Care center registered");
    Ok(orphanage.into())
}

pub async fn update_orphanage(
    id: OrphanageId,
    patch: OrphanagePatch,
    deps: &ServerDeps,
) -> ApiResult<OrphanageData> {
    let update = validate_orphanage_patch(patch)?;
    Orphanage::update(id, update, &deps.db_pool)
        .await?
        .map(OrphanageData::from)
        .ok_or_else(center_not_found)
}

pub async fn delete_orphanage(id: OrphanageId, deps: &ServerDeps) -> ApiResult<()> {
    if !Orphanage::delete(id, &deps.db_pool).await? {
        return Err(center_not_found());
    }
    info!(orphanage_id = %id, "Care center deleted");
    Ok(())
}

/// Admin review of a center's legitimacy. The creator is notified.
pub async fn update_legal_status(
    id: OrphanageId,
    input: LegalStatusInput,
    deps: &ServerDeps,
) -> ApiResult<OrphanageData> {
    if !Orphanage::set_legal_status(id, input.status, &deps.db_pool).await? {
        return Err(center_not_found());
    }
    let orphanage = Orphanage::find_by_id(id, &deps.db_pool)
        .await?
        .ok_or_else(center_not_found)?;

    info!(orphanage_id = %id, status = %input.status, "Legal status updated");

    if let Some(creator) = orphanage.created_by {
        let (title, priority) = match input.status {
            LegalStatus::Verified => ("Centre vérifié", Priority::Low),
            LegalStatus::Rejected => ("Centre rejeté", Priority::High),
            LegalStatus::Pending => ("Centre en attente de vérification", Priority::Medium),
        };
        let mut message = format!(
            "Le statut légal du centre « {} » est maintenant : {}.",
            orphanage.name,
            legal_status_label(input.status)
        );
        if let Some(note) = optional(input.note) {
            message.push_str(&format!(" Note : {}", note));
        }

        let notification = NewNotification {
            user_id: Some(creator),
            orphanage_id: Some(id),
            kind: kinds::LEGAL_STATUS.to_string(),
            title: title.to_string(),
            message,
            priority,
        };
        if let Err(e) = create_notification(notification, deps).await {
            warn!(orphanage_id = %id, error = %e, "Failed to notify center creator");
        }
    }

    Ok(orphanage.into())
}

pub fn legal_status_label(status: LegalStatus) -> &'static str {
    match status {
        LegalStatus::Pending => "en attente",
        LegalStatus::Verified => "vérifié",
        LegalStatus::Rejected => "rejeté",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> OrphanageInput {
        OrphanageInput {
            name: " Maison de l'Espoir ".into(),
            province: "Kinshasa".into(),
            city: "Kinshasa".into(),
            contact_person: "Marie K.".into(),
            email: Some("contact@espoir.cd".into()),
            capacity: Some(40),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let create = validate_new_orphanage(input(), None).unwrap();
        assert_eq!(create.name, "Maison de l'Espoir");
        assert_eq!(create.capacity, Some(40));
    }

    #[test]
    fn test_required_fields() {
        let mut missing_name = input();
        missing_name.name = "  ".into();
        assert!(validate_new_orphanage(missing_name, None).is_err());

        let mut missing_contact = input();
        missing_contact.contact_person = String::new();
        assert!(validate_new_orphanage(missing_contact, None).is_err());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let mut bad = input();
        bad.capacity = Some(-1);
        assert!(validate_new_orphanage(bad, None).is_err());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut bad = input();
        bad.email = Some("pas-un-email".into());
        assert!(validate_new_orphanage(bad, None).is_err());

        let mut blank = input();
        blank.email = Some("  ".into());
        assert_eq!(validate_new_orphanage(blank, None).unwrap().email, None);
    }

    #[test]
    fn test_patch_rejects_blanking_required_field() {
        let patch = OrphanagePatch {
            city: Some(" ".into()),
            ..Default::default()
        };
        assert!(validate_orphanage_patch(patch).is_err());

        let patch = OrphanagePatch {
            capacity: Some(12),
            ..Default::default()
        };
        let update = validate_orphanage_patch(patch).unwrap();
        assert_eq!(update.capacity, Some(12));
        assert_eq!(update.name, None);
    }
}
