pub mod document;
pub mod orphanage;

pub use document::*;
pub use orphanage::*;
