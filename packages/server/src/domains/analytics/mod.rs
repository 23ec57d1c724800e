// Analytics domain - natural-language questions answered from the database
//
// Flow: question -> model writes a SELECT -> sanitizer -> read-only execution
// -> model restates the rows in French.

pub mod activities;
pub mod prompts;
pub mod sanitize;

pub use activities::{ask, AnalyticsAnswer, AskInput};
pub use sanitize::sanitize_sql;
