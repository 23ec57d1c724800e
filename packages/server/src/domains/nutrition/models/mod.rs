pub mod nutrition_record;

pub use nutrition_record::*;
