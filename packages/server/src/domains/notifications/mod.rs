// Notifications domain - in-app alerts for admins and center managers
//
// Every created notification is also pushed on the StreamHub
// `notifications` topic for the SSE feed.

pub mod activities;
pub mod models;

pub use models::*;
