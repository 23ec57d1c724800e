//! Natural-language analytics over the registry

use anyhow::Context;
use openai_client::OpenAIError;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info, warn};

use super::prompts::{sql_system_prompt, summary_user_prompt, SUMMARY_SYSTEM_PROMPT};
use super::sanitize::sanitize_sql;
use crate::common::{required, ApiError, ApiResult};
use crate::kernel::ServerDeps;

pub const MAX_QUESTION_CHARS: usize = 1000;
/// Rows kept from a generated query
pub const MAX_ROWS: usize = 200;
/// Role holding SELECT on the registry tables only
pub const READER_ROLE: &str = "analytics_reader";
const STATEMENT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskInput {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsAnswer {
    pub answer: String,
    pub sql: String,
    pub rows: serde_json::Value,
}

pub fn validate_question(input: &AskInput) -> ApiResult<String> {
    let question = required(&input.question, "question")?;
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ApiError::bad_request(format!(
            "La question ne doit pas dépasser {} caractères",
            MAX_QUESTION_CHARS
        )));
    }
    Ok(question)
}

/// Whether to wait before trying the next model. Rate limits and transient
/// failures get the pause; rejected requests move on at once.
pub fn pause_after(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<OpenAIError>()
        .map_or(true, OpenAIError::is_retryable)
}

/// Tries each configured model once, pausing between attempts unless the
/// previous failure cannot be cured by waiting.
pub async fn complete_with_fallback(
    system_prompt: &str,
    user_prompt: &str,
    deps: &ServerDeps,
) -> ApiResult<String> {
    let options = &deps.analytics;
    let mut pause = false;

    for (attempt, model) in options.models.iter().enumerate() {
        if pause && !options.retry_delay.is_zero() {
            tokio::time::sleep(options.retry_delay).await;
        }

        match deps.ai.complete(model, system_prompt, user_prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(model = %model, attempt, "Completion succeeded");
                return Ok(text);
            }
            Ok(_) => {
                warn!(model = %model, attempt, "Model returned an empty completion");
                pause = true;
            }
            Err(e) => {
                warn!(model = %model, attempt, error = %e, "Model call failed");
                pause = pause_after(&e);
            }
        }
    }

    Err(ApiError::Upstream(
        "Le service d'analyse est momentanément indisponible".to_string(),
    ))
}

/// Wraps a statement so at most `MAX_ROWS` rows come back as one JSON array.
/// The statement sits on its own lines: a trailing `--` comment must not
/// swallow the closing parentheses.
pub fn row_limited(sql: &str) -> String {
    format!(
        "SELECT COALESCE(json_agg(q), '[]'::json) FROM (SELECT * FROM (\n{}\n) AS generated LIMIT {}) AS q",
        sql, MAX_ROWS
    )
}

/// Runs a sanitized SELECT in a read-only transaction under the reader role
/// and returns at most `MAX_ROWS` rows as a JSON array.
pub async fn execute_read_only(sql: &str, pool: &PgPool) -> anyhow::Result<serde_json::Value> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET TRANSACTION READ ONLY")
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!("SET LOCAL statement_timeout = '{}'", STATEMENT_TIMEOUT))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!("SET LOCAL ROLE {}", READER_ROLE))
        .execute(&mut *tx)
        .await
        .context("Failed to assume analytics reader role")?;

    let rows: serde_json::Value = sqlx::query_scalar(&row_limited(sql))
        .fetch_one(&mut *tx)
        .await?;

    tx.rollback().await?;
    Ok(rows)
}

/// Question → SQL → rows → French answer
pub async fn ask(input: AskInput, deps: &ServerDeps) -> ApiResult<AnalyticsAnswer> {
    let question = validate_question(&input)?;

    let raw_sql = complete_with_fallback(&sql_system_prompt(), &question, deps).await?;
    let sql = match sanitize_sql(&raw_sql) {
        Ok(sql) => sql,
        Err(e) => {
            warn!(generated = %raw_sql, "Generated SQL rejected");
            return Err(e);
        }
    };
    debug!(sql = %sql, "Executing generated SQL");

    let rows = execute_read_only(&sql, &deps.db_pool).await.map_err(|e| {
        // Errors reported by Postgres come from the generated query; anything
        // else (pool, network) is ours
        match e.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(_)) => {
                warn!(sql = %sql, error = %e, "Generated SQL failed");
                ApiError::bad_request("La question n'a pas pu être traduite en une requête valide")
            }
            _ => ApiError::Internal(e),
        }
    })?;

    let row_count = rows.as_array().map(Vec::len).unwrap_or_default();
    let answer = complete_with_fallback(
        SUMMARY_SYSTEM_PROMPT,
        &summary_user_prompt(&question, &sql, &rows),
        deps,
    )
    .await?;

    info!(rows = row_count, "Analytics question answered");
    Ok(AnalyticsAnswer {
        answer: answer.trim().to_string(),
        sql,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_required() {
        assert!(validate_question(&AskInput { question: "  ".into() }).is_err());
    }

    #[test]
    fn test_question_length_limit() {
        let long = AskInput {
            question: "é".repeat(MAX_QUESTION_CHARS + 1),
        };
        assert!(validate_question(&long).is_err());

        let max = AskInput {
            question: "é".repeat(MAX_QUESTION_CHARS),
        };
        assert!(validate_question(&max).is_ok());
    }

    #[test]
    fn test_row_limited_keeps_trailing_comment_on_its_own_line() {
        let wrapped = row_limited("SELECT COUNT(*) FROM children -- total");
        let comment_line = wrapped
            .lines()
            .find(|line| line.contains("-- total"))
            .unwrap();
        assert_eq!(comment_line, "SELECT COUNT(*) FROM children -- total");
        assert!(wrapped.ends_with(&format!(") AS generated LIMIT {}) AS q", MAX_ROWS)));
    }

    #[test]
    fn test_pause_only_when_waiting_can_help() {
        let rate_limited = anyhow::Error::from(OpenAIError::Api {
            status: 429,
            message: "slow down".into(),
        });
        let bad_request = anyhow::Error::from(OpenAIError::Api {
            status: 400,
            message: "context too long".into(),
        });
        assert!(pause_after(&rate_limited));
        assert!(!pause_after(&bad_request));
        assert!(pause_after(&anyhow::anyhow!("connection reset")));
    }
}
