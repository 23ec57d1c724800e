// Nutrition domain - weight/height measurements, BMI and malnutrition status

pub mod activities;
pub mod data;
pub mod models;

pub use data::*;
pub use models::*;
