// Health domain - check-ups, vaccination status and diagnosed diseases

pub mod activities;
pub mod data;
pub mod models;

pub use data::*;
pub use models::*;
