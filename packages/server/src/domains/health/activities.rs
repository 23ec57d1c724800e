//! Health record activities

use std::collections::HashMap;

use tracing::info;

use crate::common::{
    not_in_future, optional, required, ApiError, ApiResult, HealthRecordId, Paginated,
};
use crate::domains::children::models::Child;
use crate::domains::health::data::{
    DiseaseListQuery, HealthRecordData, HealthRecordInput, HealthRecordListQuery,
};
use crate::domains::health::models::{
    ChildDisease, CreateHealthRecord, DiseaseFilter, HealthRecord, HealthRecordFilter,
    NewDisease, Severity, VaccinationStatus,
};
use crate::kernel::ServerDeps;

/// Checks the record and its diseases; diagnosed dates default to the record date.
pub fn validate_health_record(
    input: HealthRecordInput,
) -> ApiResult<(CreateHealthRecord, Vec<NewDisease>)> {
    not_in_future(input.date, "date")?;

    let diseases = input
        .diseases
        .into_iter()
        .map(|disease| {
            let diagnosed_date = disease.diagnosed_date.unwrap_or(input.date);
            not_in_future(diagnosed_date, "diagnosed_date")?;
            Ok(NewDisease {
                disease_name: required(&disease.disease_name, "disease_name")?,
                diagnosed_date,
                severity: disease.severity.unwrap_or(Severity::Mild),
                notes: optional(disease.notes),
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let record = CreateHealthRecord {
        child_id: input.child_id,
        date: input.date,
        vaccination_status: input
            .vaccination_status
            .unwrap_or(VaccinationStatus::Unknown),
        chronic_conditions: optional(input.chronic_conditions),
        medications: optional(input.medications),
        remarks: optional(input.remarks),
    };

    Ok((record, diseases))
}

pub async fn create_health_record(
    input: HealthRecordInput,
    deps: &ServerDeps,
) -> ApiResult<HealthRecordData> {
    let (record, diseases) = validate_health_record(input)?;

    if !Child::exists(record.child_id, &deps.db_pool).await? {
        return Err(ApiError::not_found("Enfant introuvable"));
    }

    let (record, diseases) =
        HealthRecord::create_with_diseases(record, diseases, &deps.db_pool).await?;
    info!(
        health_record_id = %record.id,
        child_id = %record.child_id,
        diseases = diseases.len(),
        "Health record created"
    );
    Ok(HealthRecordData { record, diseases })
}

pub async fn list_health_records(
    query: HealthRecordListQuery,
    deps: &ServerDeps,
) -> ApiResult<Paginated<HealthRecordData>> {
    let page = query.pagination().validate()?;
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::bad_request(
                "La date de début doit précéder la date de fin",
            ));
        }
    }

    let filter = HealthRecordFilter {
        child_id: query.child_id,
        orphanage_id: query.orphanage_id,
        from: query.from,
        to: query.to,
    };
    let (records, total) = HealthRecord::find_paginated(&filter, page, &deps.db_pool).await?;

    let ids: Vec<HealthRecordId> = records.iter().map(|r| r.id).collect();
    let mut by_record: HashMap<HealthRecordId, Vec<ChildDisease>> = HashMap::new();
    for disease in ChildDisease::find_by_records(&ids, &deps.db_pool).await? {
        if let Some(record_id) = disease.health_record_id {
            by_record.entry(record_id).or_default().push(disease);
        }
    }

    let data = records
        .into_iter()
        .map(|record| HealthRecordData {
            diseases: by_record.remove(&record.id).unwrap_or_default(),
            record,
        })
        .collect();
    Ok(Paginated::new(data, page, total))
}

pub async fn delete_health_record(id: HealthRecordId, deps: &ServerDeps) -> ApiResult<()> {
    if !HealthRecord::delete(id, &deps.db_pool).await? {
        return Err(ApiError::not_found("Dossier médical introuvable"));
    }
    info!(health_record_id = %id, "Health record deleted");
    Ok(())
}

pub async fn list_diseases(
    query: DiseaseListQuery,
    deps: &ServerDeps,
) -> ApiResult<Paginated<ChildDisease>> {
    let page = query.pagination().validate()?;
    let filter = DiseaseFilter {
        child_id: query.child_id,
        orphanage_id: query.orphanage_id,
        disease_name: optional(query.disease_name),
        severity: query.severity,
    };
    let (rows, total) = ChildDisease::find_paginated(&filter, page, &deps.db_pool).await?;
    Ok(Paginated::new(rows, page, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChildId;
    use crate::domains::health::data::DiseaseInput;
    use chrono::NaiveDate;

    fn input(diseases: Vec<DiseaseInput>) -> HealthRecordInput {
        HealthRecordInput {
            child_id: ChildId::new(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            vaccination_status: None,
            chronic_conditions: Some("  ".into()),
            medications: None,
            remarks: Some("RAS".into()),
            diseases,
        }
    }

    #[test]
    fn test_defaults_applied() {
        let (record, diseases) = validate_health_record(input(vec![DiseaseInput {
            disease_name: "Paludisme".into(),
            ..Default::default()
        }]))
        .unwrap();

        assert_eq!(record.vaccination_status, VaccinationStatus::Unknown);
        assert_eq!(record.chronic_conditions, None);
        assert_eq!(diseases[0].diagnosed_date, record.date);
        assert_eq!(diseases[0].severity, Severity::Mild);
    }

    #[test]
    fn test_blank_disease_name_rejected() {
        let result = validate_health_record(input(vec![DiseaseInput {
            disease_name: " ".into(),
            ..Default::default()
        }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_future_date_rejected() {
        let mut future = input(vec![]);
        future.date = chrono::Utc::now().date_naive() + chrono::Duration::days(2);
        assert!(validate_health_record(future).is_err());
    }
}
