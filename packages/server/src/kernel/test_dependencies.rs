// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{
    AnalyticsOptions, BaseAI, BaseEmailService, BaseObjectStorage, BaseSmsService, EmailMessage,
    ServerDeps, StoredObject, StreamHub,
};
use crate::domains::auth::JwtService;

/// Secret used by `TestDependencies` to sign and verify tokens.
pub const TEST_JWT_SECRET: &str = "test_jwt_secret";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Mock AI
// =============================================================================

/// A recorded completion request
#[derive(Debug, Clone)]
pub struct AiCall {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

pub struct MockAI {
    responses: Arc<Mutex<Vec<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<AiCall>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        lock(&self.responses).push(Ok(response.into()));
        self
    }

    /// Queue a failed call
    pub fn with_failure(self, error: impl Into<String>) -> Self {
        lock(&self.responses).push(Err(error.into()));
        self
    }

    pub fn calls(&self) -> Vec<AiCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Models used, in call order
    pub fn models_called(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.model.clone()).collect()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        lock(&self.calls).push(AiCall {
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        let mut responses = lock(&self.responses);
        if responses.is_empty() {
            return Ok("Mock AI response".to_string());
        }
        responses.remove(0).map_err(|e| anyhow!(e))
    }
}

// =============================================================================
// Mock E-mail
// =============================================================================

pub struct MockEmailService {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail: bool,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Every send fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseEmailService for MockEmailService {
    async fn send(&self, message: EmailMessage) -> Result<String> {
        if self.fail {
            return Err(anyhow!("Mock e-mail failure"));
        }
        let mut sent = lock(&self.sent);
        sent.push(message);
        Ok(format!("mock-email-{}", sent.len()))
    }
}

// =============================================================================
// Mock SMS
// =============================================================================

pub struct MockSmsService {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// `(phone, body)` pairs
    pub fn sent(&self) -> Vec<(String, String)> {
        lock(&self.sent).clone()
    }
}

impl Default for MockSmsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSmsService for MockSmsService {
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<String> {
        if self.fail {
            return Err(anyhow!("Mock SMS failure"));
        }
        let mut sent = lock(&self.sent);
        sent.push((phone_number.to_string(), body.to_string()));
        Ok(format!("SM{:032}", sent.len()))
    }
}

// =============================================================================
// Mock Object Storage
// =============================================================================

pub struct MockObjectStorage {
    objects: Arc<Mutex<Vec<(String, String, usize)>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `(path, content_type, size)` of every stored object
    pub fn objects(&self) -> Vec<(String, String, usize)> {
        lock(&self.objects).clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

impl Default for MockObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseObjectStorage for MockObjectStorage {
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<StoredObject> {
        lock(&self.objects).push((path.to_string(), content_type.to_string(), bytes.len()));
        Ok(StoredObject {
            path: path.to_string(),
            url: format!("https://storage.test/{}", path),
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        lock(&self.deleted).push(path.to_string());
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub ai: Arc<MockAI>,
    pub email: Arc<MockEmailService>,
    pub sms: Arc<MockSmsService>,
    pub storage: Arc<MockObjectStorage>,
    pub stream_hub: StreamHub,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            ai: Arc::new(MockAI::new()),
            email: Arc::new(MockEmailService::new()),
            sms: Arc::new(MockSmsService::new()),
            storage: Arc::new(MockObjectStorage::new()),
            stream_hub: StreamHub::new(),
        }
    }

    /// Set a mock AI
    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    pub fn mock_email(mut self, email: MockEmailService) -> Self {
        self.email = Arc::new(email);
        self
    }

    pub fn mock_sms(mut self, sms: MockSmsService) -> Self {
        self.sms = Arc::new(sms);
        self
    }

    /// Convert into ServerDeps. Tokens are signed with `TEST_JWT_SECRET` and
    /// model fallback does not sleep.
    pub fn into_server_deps(&self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            self.ai.clone(),
            self.email.clone(),
            self.sms.clone(),
            self.storage.clone(),
            self.stream_hub.clone(),
            Arc::new(JwtService::new(TEST_JWT_SECRET)),
            AnalyticsOptions {
                retry_delay: Duration::ZERO,
                ..AnalyticsOptions::default()
            },
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
