pub mod disease;
pub mod health_record;

pub use disease::*;
pub use health_record::*;
