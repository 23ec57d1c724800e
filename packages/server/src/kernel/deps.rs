//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! activities. All external services use trait abstractions to enable testing.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use twilio::TwilioService;

use crate::domains::auth::JwtService;
use crate::kernel::{
    stream_hub::StreamHub, BaseAI, BaseEmailService, BaseObjectStorage, BaseSmsService,
    EmailMessage, StoredObject,
};

// =============================================================================
// TwilioService Adapter (implements BaseSmsService trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseSmsService trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseSmsService for TwilioAdapter {
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<String> {
        self.0
            .send_sms(phone_number, body)
            .await
            .map(|message| message.sid)
            .map_err(|e| anyhow!("{}", e))
    }
}

// =============================================================================
// Placeholders for services missing from the environment
// =============================================================================

/// Stands in for an external service whose credentials are not configured.
/// Every call fails, so the caller reports the channel as failed.
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl BaseEmailService for Unconfigured {
    async fn send(&self, _message: EmailMessage) -> Result<String> {
        Err(anyhow!("{} is not configured", self.0))
    }
}

#[async_trait]
impl BaseSmsService for Unconfigured {
    async fn send_sms(&self, _phone_number: &str, _body: &str) -> Result<String> {
        Err(anyhow!("{} is not configured", self.0))
    }
}

#[async_trait]
impl BaseObjectStorage for Unconfigured {
    async fn put(&self, _path: &str, _content_type: &str, _bytes: Vec<u8>) -> Result<StoredObject> {
        Err(anyhow!("{} is not configured", self.0))
    }

    async fn delete(&self, _path: &str) -> Result<()> {
        Err(anyhow!("{} is not configured", self.0))
    }
}

// =============================================================================
// Analytics options
// =============================================================================

/// Model fallback policy for the analytics assistant.
#[derive(Debug, Clone)]
pub struct AnalyticsOptions {
    /// Models tried in order; each gets one attempt.
    pub models: Vec<String>,
    /// Fixed pause between two attempts.
    pub retry_delay: Duration,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            models: vec!["gpt-4o-mini".to_string(), "gpt-3.5-turbo".to_string()],
            retry_delay: Duration::from_secs(1),
        }
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to activities (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub ai: Arc<dyn BaseAI>,
    pub email: Arc<dyn BaseEmailService>,
    pub sms: Arc<dyn BaseSmsService>,
    pub storage: Arc<dyn BaseObjectStorage>,
    /// In-process pub/sub hub feeding the notification SSE stream
    pub stream_hub: StreamHub,
    pub jwt_service: Arc<JwtService>,
    pub analytics: AnalyticsOptions,
}

impl ServerDeps {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db_pool: PgPool,
        ai: Arc<dyn BaseAI>,
        email: Arc<dyn BaseEmailService>,
        sms: Arc<dyn BaseSmsService>,
        storage: Arc<dyn BaseObjectStorage>,
        stream_hub: StreamHub,
        jwt_service: Arc<JwtService>,
        analytics: AnalyticsOptions,
    ) -> Self {
        Self {
            db_pool,
            ai,
            email,
            sms,
            storage,
            stream_hub,
            jwt_service,
            analytics,
        }
    }
}
