// HTTP routes
pub mod analytics;
pub mod children;
pub mod health;
pub mod health_records;
pub mod notifications;
pub mod nutrition;
pub mod orphanages;
pub mod partner_requests;
pub mod stream;

pub use analytics::*;
pub use children::*;
pub use health::*;
pub use health_records::*;
pub use notifications::*;
pub use nutrition::*;
pub use orphanages::*;
pub use partner_requests::*;
pub use stream::*;
