// Common types and utilities shared across domains

pub mod entity_ids;
pub mod errors;
pub mod extract;
pub mod id;
pub mod pagination;
pub mod text_enum;
pub mod validation;

pub use entity_ids::*;
pub use errors::{ApiError, ApiResult};
pub use extract::{ApiJson, ApiQuery};
pub use pagination::{Page, PageInfo, Paginated, PaginationArgs};
pub use validation::*;
