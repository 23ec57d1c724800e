//! Typed ID definitions for all domain entities.

pub use super::id::Id;

/// Marker type for care centers.
pub struct Orphanage;

/// Marker type for children registered in a center.
pub struct Child;

/// Marker type for health check-ups.
pub struct HealthRecord;

/// Marker type for diagnosed diseases.
pub struct ChildDisease;

/// Marker type for nutrition measurements.
pub struct NutritionRecord;

pub struct Notification;

pub struct PartnerRequest;

/// Marker type for authenticated users (JWT `sub`).
pub struct User;

pub type OrphanageId = Id<Orphanage>;
pub type ChildId = Id<Child>;
pub type HealthRecordId = Id<HealthRecord>;
pub type DiseaseId = Id<ChildDisease>;
pub type NutritionRecordId = Id<NutritionRecord>;
pub type NotificationId = Id<Notification>;
pub type PartnerRequestId = Id<PartnerRequest>;
pub type UserId = Id<User>;
