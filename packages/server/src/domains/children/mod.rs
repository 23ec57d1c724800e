// Children domain - children registered in care centers

pub mod activities;
pub mod data;
pub mod models;

pub use data::*;
pub use models::*;
