// Orphanage Registry - API Core
//
// This crate provides the backend API for registering orphanages and the
// children they host, tracking health and nutrition, and raising alerts
// for the monitoring teams.
//
// Business logic is organized per-domain in domains/*/activities.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
