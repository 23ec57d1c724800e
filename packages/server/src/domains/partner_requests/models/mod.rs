pub mod partner_request;

pub use partner_request::*;
