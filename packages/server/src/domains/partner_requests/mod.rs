// Partner requests domain - organizations asking to join the platform

pub mod activities;
pub mod models;

pub use activities::{PartnerRequestInput, PartnerRequestListQuery, ReviewInput};
pub use models::*;
