//! Guard for model-written SQL.
//!
//! Only a single `SELECT` / `WITH` statement passes. Execution additionally
//! happens in a read-only transaction under a SELECT-only role.

use lazy_static::lazy_static;
use regex::Regex;

use crate::common::ApiError;

pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "GRANT", "REVOKE", "TRUNCATE", "CREATE",
];

lazy_static! {
    static ref FORBIDDEN_REGEX: Regex = Regex::new(&format!(
        r"(?i)\b({})\b",
        FORBIDDEN_KEYWORDS.join("|")
    ))
    .unwrap();

    static ref LEADING_REGEX: Regex = Regex::new(r"(?i)^(SELECT|WITH)\b").unwrap();
}

fn rejected() -> ApiError {
    ApiError::bad_request("Requête non autorisée")
}

/// Returns the cleaned statement, or 400 `Requête non autorisée`.
pub fn sanitize_sql(raw: &str) -> Result<String, ApiError> {
    let sql = openai_client::strip_code_blocks(raw)
        .trim()
        .trim_end_matches(';')
        .trim();

    if sql.is_empty() {
        return Err(rejected());
    }
    if FORBIDDEN_REGEX.is_match(sql) {
        return Err(rejected());
    }
    if !LEADING_REGEX.is_match(sql) {
        return Err(rejected());
    }
    if sql.contains(';') {
        return Err(rejected());
    }

    Ok(sql.to_string())
}
