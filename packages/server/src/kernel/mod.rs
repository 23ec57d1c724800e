//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod deps;
pub mod email;
pub mod scheduled_tasks;
pub mod storage;
pub mod stream_hub;
pub mod test_dependencies;
pub mod traits;

pub use ai::OpenAIAdapter;
pub use deps::{AnalyticsOptions, ServerDeps, TwilioAdapter, Unconfigured};
pub use email::EmailClient;
pub use storage::HttpObjectStorage;
pub use stream_hub::StreamHub;
pub use test_dependencies::TestDependencies;
pub use traits::*;
