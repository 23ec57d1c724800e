// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (which prompt, which recipients) lives in the domains.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseEmailService)

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// AI Trait (Infrastructure - LLM completion)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a system + user prompt with the given model (returns raw text).
    async fn complete(&self, model: &str, system_prompt: &str, user_prompt: &str)
        -> Result<String>;
}

// =============================================================================
// E-mail Trait (Infrastructure - transactional e-mail)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait BaseEmailService: Send + Sync {
    /// Send one e-mail, returning the provider's message id.
    async fn send(&self, message: EmailMessage) -> Result<String>;
}

// =============================================================================
// SMS Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseSmsService: Send + Sync {
    /// Send an SMS, returning the provider's message id.
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<String>;
}

// =============================================================================
// Object Storage Trait (Infrastructure - uploaded documents)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait BaseObjectStorage: Send + Sync {
    /// Store bytes at `path`, overwriting any existing object.
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<StoredObject>;

    async fn delete(&self, path: &str) -> Result<()>;
}
