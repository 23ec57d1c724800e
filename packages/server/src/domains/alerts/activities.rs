//! Alert checks. Each scan turns threshold breaches into de-duplicated
//! broadcast notifications.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::models::{CapacityUsage, CenterDocuments, VaccinationCoverage};
use super::thresholds::*;
use crate::common::OrphanageId;
use crate::domains::health::models::ChildDisease;
use crate::domains::notifications::activities::create_notification_if_absent;
use crate::domains::notifications::models::{kinds, NewNotification, Priority};
use crate::domains::nutrition::models::NutritionRecord;
use crate::domains::orphanages::models::DocumentRecord;
use crate::kernel::ServerDeps;

/// Outcome of one check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub check: &'static str,
    /// Notifications actually inserted (duplicates excluded)
    pub created: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertRunReport {
    pub checks: Vec<CheckResult>,
}

impl AlertRunReport {
    pub fn total_created(&self) -> usize {
        self.checks.iter().map(|c| c.created).sum()
    }
}

fn dedup_window() -> Duration {
    Duration::hours(DEDUP_WINDOW_HOURS)
}

async fn raise_all(alerts: Vec<NewNotification>, deps: &ServerDeps) -> anyhow::Result<usize> {
    let mut created = 0;
    for alert in alerts {
        if create_notification_if_absent(alert, dedup_window(), deps)
            .await?
            .is_some()
        {
            created += 1;
        }
    }
    Ok(created)
}

pub async fn check_disease_outbreaks(deps: &ServerDeps) -> anyhow::Result<usize> {
    let since = Utc::now().date_naive() - Duration::days(OUTBREAK_WINDOW_DAYS);
    let clusters = ChildDisease::clusters_since(since, &deps.db_pool).await?;

    let alerts = clusters
        .into_iter()
        .filter_map(|cluster| {
            let priority = outbreak_priority(cluster.cases)?;
            Some(NewNotification::about_center(
                cluster.orphanage_id,
                kinds::DISEASE_OUTBREAK,
                format!(
                    "Foyer épidémique possible : {} ({})",
                    cluster.disease_name, cluster.orphanage_name
                ),
                format!(
                    "{} cas de {} diagnostiqués au centre « {} » ces {} derniers jours.",
                    cluster.cases, cluster.disease_name, cluster.orphanage_name, OUTBREAK_WINDOW_DAYS
                ),
                priority,
            ))
        })
        .collect();

    raise_all(alerts, deps).await
}

pub async fn check_severe_malnutrition(deps: &ServerDeps) -> anyhow::Result<usize> {
    let cases = NutritionRecord::latest_severe_cases(&deps.db_pool).await?;

    let alerts = cases
        .into_iter()
        .map(|case| {
            NewNotification::about_center(
                case.orphanage_id,
                kinds::SEVERE_MALNUTRITION,
                format!("Malnutrition sévère : {}", case.child_name),
                format!(
                    "{} ({}) présente une malnutrition sévère (IMC {:.2} au {}).",
                    case.child_name,
                    case.orphanage_name,
                    case.bmi,
                    case.date.format("%d/%m/%Y")
                ),
                Priority::High,
            )
        })
        .collect();

    raise_all(alerts, deps).await
}

pub async fn check_capacity(deps: &ServerDeps) -> anyhow::Result<usize> {
    let usage = CapacityUsage::find_all(&deps.db_pool).await?;

    let alerts = usage
        .into_iter()
        .filter_map(|center| {
            let priority = capacity_priority(center.children, center.capacity)?;
            let title = if priority == Priority::High {
                "Capacité dépassée"
            } else {
                "Capacité presque atteinte"
            };
            Some(NewNotification::about_center(
                center.orphanage_id,
                kinds::CAPACITY,
                format!("{} : {}", title, center.orphanage_name),
                format!(
                    "Le centre « {} » accueille {} enfants pour une capacité de {}.",
                    center.orphanage_name, center.children, center.capacity
                ),
                priority,
            ))
        })
        .collect();

    raise_all(alerts, deps).await
}

pub async fn check_vaccination_gaps(deps: &ServerDeps) -> anyhow::Result<usize> {
    let coverage = VaccinationCoverage::find_all(&deps.db_pool).await?;

    let alerts = coverage
        .into_iter()
        .filter(|c| has_vaccination_gap(c.not_up_to_date, c.total_children))
        .map(|center| {
            let percent = center.not_up_to_date * 100 / center.total_children;
            NewNotification::about_center(
                center.orphanage_id,
                kinds::VACCINATION_GAP,
                format!("Couverture vaccinale insuffisante : {}", center.orphanage_name),
                format!(
                    "{} enfants sur {} ({} %) ne sont pas à jour de leurs vaccins au centre « {} ».",
                    center.not_up_to_date, center.total_children, percent, center.orphanage_name
                ),
                Priority::Medium,
            )
        })
        .collect();

    raise_all(alerts, deps).await
}

/// Alert for one document of a center; `None` while it stays valid past
/// the warning window. The title names the file so that two documents of the
/// same type are de-duplicated separately.
pub fn document_expiry_alert(
    orphanage_id: OrphanageId,
    orphanage_name: &str,
    document: &DocumentRecord,
    today: NaiveDate,
) -> Option<NewNotification> {
    let priority =
        document_expiry_priority(document.expiry_state(today, DOCUMENT_WARNING_DAYS))?;
    let expires_at = document
        .expires_at
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default();

    let (title, message) = if priority == Priority::High {
        (
            format!(
                "Document expiré : {} ({})",
                document.document_type, document.file_name
            ),
            format!(
                "Le document « {} » du centre « {} » a expiré le {}.",
                document.file_name, orphanage_name, expires_at
            ),
        )
    } else {
        (
            format!(
                "Document bientôt expiré : {} ({})",
                document.document_type, document.file_name
            ),
            format!(
                "Le document « {} » du centre « {} » expire le {}.",
                document.file_name, orphanage_name, expires_at
            ),
        )
    };

    Some(NewNotification::about_center(
        orphanage_id,
        kinds::DOCUMENT_EXPIRY,
        title,
        message,
        priority,
    ))
}

pub async fn check_document_expiry(deps: &ServerDeps) -> anyhow::Result<usize> {
    let today = Utc::now().date_naive();
    let centers = CenterDocuments::find_with_expiry(&deps.db_pool).await?;

    let alerts = centers
        .iter()
        .flat_map(|center| {
            center.documents.0.iter().filter_map(move |document| {
                document_expiry_alert(center.orphanage_id, &center.orphanage_name, document, today)
            })
        })
        .collect();

    raise_all(alerts, deps).await
}

async fn run_check<F>(name: &'static str, check: F) -> CheckResult
where
    F: std::future::Future<Output = anyhow::Result<usize>>,
{
    match check.await {
        Ok(created) => {
            info!(check = name, created, "Alert check completed");
            CheckResult {
                check: name,
                created,
                error: None,
            }
        }
        Err(e) => {
            error!(check = name, error = %e, "Alert check failed");
            CheckResult {
                check: name,
                created: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Every 30 minutes: outbreaks and severe malnutrition
pub async fn run_frequent_checks(deps: &ServerDeps) -> AlertRunReport {
    AlertRunReport {
        checks: vec![
            run_check("disease_outbreak", check_disease_outbreaks(deps)).await,
            run_check("severe_malnutrition", check_severe_malnutrition(deps)).await,
        ],
    }
}

/// Hourly: capacity, vaccination coverage, document expiry
pub async fn run_hourly_checks(deps: &ServerDeps) -> AlertRunReport {
    AlertRunReport {
        checks: vec![
            run_check("capacity", check_capacity(deps)).await,
            run_check("vaccination_gap", check_vaccination_gaps(deps)).await,
            run_check("document_expiry", check_document_expiry(deps)).await,
        ],
    }
}

pub async fn run_all_checks(deps: &ServerDeps) -> AlertRunReport {
    let mut report = run_frequent_checks(deps).await;
    report.checks.extend(run_hourly_checks(deps).await.checks);
    info!(created = report.total_created(), "Alert run finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn document(file_name: &str, expires_at: Option<NaiveDate>) -> DocumentRecord {
        DocumentRecord {
            id: Uuid::new_v4(),
            document_type: "agrement".into(),
            file_name: file_name.into(),
            content_type: "application/pdf".into(),
            size: 10,
            storage_path: format!("centre/agrement/{}", file_name),
            url: String::new(),
            uploaded_at: Utc::now(),
            expires_at,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expired_documents_of_one_type_get_distinct_titles() {
        let center = OrphanageId::new();
        let today = day(2025, 6, 1);
        let first = document_expiry_alert(
            center,
            "Centre Lemba",
            &document("agrement_2019.pdf", Some(day(2025, 5, 1))),
            today,
        )
        .unwrap();
        let second = document_expiry_alert(
            center,
            "Centre Lemba",
            &document("agrement_2020.pdf", Some(day(2025, 5, 20))),
            today,
        )
        .unwrap();

        assert_eq!(first.priority, Priority::High);
        assert_eq!(second.priority, Priority::High);
        assert_eq!(first.kind, kinds::DOCUMENT_EXPIRY);
        assert_ne!(first.title, second.title);
        assert_eq!(first.title, "Document expiré : agrement (agrement_2019.pdf)");
    }

    #[test]
    fn test_expiry_warning_window() {
        let center = OrphanageId::new();
        let today = day(2025, 6, 1);

        let soon = document_expiry_alert(
            center,
            "Centre Lemba",
            &document("a.pdf", Some(day(2025, 7, 1))),
            today,
        )
        .unwrap();
        assert_eq!(soon.priority, Priority::Medium);
        assert!(soon.message.contains("01/07/2025"));

        let later = document("b.pdf", Some(day(2025, 7, 2)));
        assert!(document_expiry_alert(center, "Centre Lemba", &later, today).is_none());
        assert!(document_expiry_alert(center, "Centre Lemba", &document("c.pdf", None), today).is_none());
    }
}
