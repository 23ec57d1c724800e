//! Alert thresholds. Pure functions, no I/O.

use crate::domains::notifications::models::Priority;
use crate::domains::orphanages::models::ExpiryState;

/// Same alert is not raised twice within this many hours
pub const DEDUP_WINDOW_HOURS: i64 = 24;

/// Look-back period for outbreak detection
pub const OUTBREAK_WINDOW_DAYS: i64 = 14;
pub const OUTBREAK_MIN_CASES: i64 = 3;
pub const OUTBREAK_HIGH_CASES: i64 = 5;

/// Occupancy ratio raising a medium alert
pub const CAPACITY_WARNING_RATIO: f64 = 0.9;

/// Share of children not up to date raising a vaccination alert
pub const VACCINATION_GAP_RATIO: f64 = 0.3;

pub const DOCUMENT_WARNING_DAYS: i64 = 30;

pub fn outbreak_priority(cases: i64) -> Option<Priority> {
    if cases >= OUTBREAK_HIGH_CASES {
        Some(Priority::High)
    } else if cases >= OUTBREAK_MIN_CASES {
        Some(Priority::Medium)
    } else {
        None
    }
}

/// `None` below 90 % occupancy or when no capacity is declared
pub fn capacity_priority(children: i64, capacity: i32) -> Option<Priority> {
    if capacity <= 0 {
        return None;
    }
    let ratio = children as f64 / f64::from(capacity);
    if ratio > 1.0 {
        Some(Priority::High)
    } else if ratio >= CAPACITY_WARNING_RATIO {
        Some(Priority::Medium)
    } else {
        None
    }
}

pub fn has_vaccination_gap(not_up_to_date: i64, total_children: i64) -> bool {
    total_children > 0 && (not_up_to_date as f64 / total_children as f64) >= VACCINATION_GAP_RATIO
}

pub fn document_expiry_priority(state: ExpiryState) -> Option<Priority> {
    match state {
        ExpiryState::Expired => Some(Priority::High),
        ExpiryState::ExpiringSoon { .. } => Some(Priority::Medium),
        ExpiryState::Valid => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbreak_priority() {
        assert_eq!(outbreak_priority(2), None);
        assert_eq!(outbreak_priority(3), Some(Priority::Medium));
        assert_eq!(outbreak_priority(4), Some(Priority::Medium));
        assert_eq!(outbreak_priority(5), Some(Priority::High));
        assert_eq!(outbreak_priority(12), Some(Priority::High));
    }

    #[test]
    fn test_capacity_priority() {
        assert_eq!(capacity_priority(89, 100), None);
        assert_eq!(capacity_priority(90, 100), Some(Priority::Medium));
        assert_eq!(capacity_priority(100, 100), Some(Priority::Medium));
        assert_eq!(capacity_priority(101, 100), Some(Priority::High));
        assert_eq!(capacity_priority(5, 0), None);
    }

    #[test]
    fn test_vaccination_gap() {
        assert!(!has_vaccination_gap(0, 0));
        assert!(!has_vaccination_gap(2, 10));
        assert!(has_vaccination_gap(3, 10));
        assert!(has_vaccination_gap(10, 10));
    }

    #[test]
    fn test_document_expiry_priority() {
        assert_eq!(document_expiry_priority(ExpiryState::Expired), Some(Priority::High));
        assert_eq!(
            document_expiry_priority(ExpiryState::ExpiringSoon { days_left: 3 }),
            Some(Priority::Medium)
        );
        assert_eq!(document_expiry_priority(ExpiryState::Valid), None);
    }
}
