pub mod documents;
pub mod registry;

pub use documents::*;
pub use registry::*;
