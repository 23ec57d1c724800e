// Shared test utilities
#![allow(dead_code)]

pub mod api;
pub mod harness;

pub use api::*;
pub use harness::*;
