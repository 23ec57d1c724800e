// Alerts domain - periodic scans raising notifications on threshold breaches
//
// Scheduled from kernel::scheduled_tasks; admins can also trigger a run.

pub mod activities;
pub mod models;
pub mod thresholds;

pub use activities::{run_all_checks, run_frequent_checks, run_hourly_checks, AlertRunReport};
