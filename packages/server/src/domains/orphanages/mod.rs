// Orphanages domain - registry of care centers
//
// Responsibilities:
// - CRUD over centers, with children counts
// - Legal status review (admin), notifying the center's creator
// - Legal documents: validated upload to object storage, expiry tracking

pub mod activities;
pub mod data;
pub mod models;

pub use data::*;
pub use models::*;
