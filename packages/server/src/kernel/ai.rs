// AI implementation using the OpenAI chat-completions API
//
// This is the infrastructure implementation of BaseAI.
// Prompts live in the analytics domain.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::OpenAIClient;

use super::BaseAI;

/// Sampling temperature for every call: SQL generation and summaries both
/// want deterministic output.
const TEMPERATURE: f32 = 0.0;

#[derive(Clone)]
pub struct OpenAIAdapter {
    client: OpenAIClient,
}

impl OpenAIAdapter {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let client = OpenAIClient::new(api_key);
        let client = match base_url {
            Some(url) => client.with_base_url(url),
            None => client,
        };
        Self { client }
    }
}

#[async_trait]
impl BaseAI for OpenAIAdapter {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        self.client
            .complete(model, system_prompt, user_prompt, Some(TEMPERATURE))
            .await
            .map_err(Into::into)
    }
}
