//! OpenAI-compatible chat-completion client.
//!
//! Any provider speaking the OpenAI chat-completion protocol works here; the
//! default configuration points at Groq.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::base::{config::Config, types::Res};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.llm_api_key.clone()).with_api_base(config.llm_api_base.clone());

        // A zero retry window turns off the client's built-in retries on 429/5xx.
        let no_retries = ExponentialBackoffBuilder::new().with_max_elapsed_time(Some(Duration::ZERO)).build();

        Self {
            client: Client::with_config(cfg).with_backoff(no_retries),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::get_chat_completion", skip_all, fields(model = %self.config.llm_model))]
    async fn get_chat_completion(&self, prompt: &str) -> Res<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default().content(prompt.to_string()).build()?.into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.llm_model)
            .messages(messages)
            .temperature(self.config.llm_temperature)
            .build()?;

        // A failed or slow round trip surfaces to the caller as is.
        let limit = Duration::from_secs(self.config.llm_timeout_secs);
        let response = timeout(limit, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow!("LLM request timed out after {} seconds", self.config.llm_timeout_secs))??;

        info!("LLM response has {} choices.", response.choices.len());

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("LLM response contained no message content"))?;

        debug!("LLM reply: {content}");

        Ok(content.trim().to_string())
    }
}

// Tests.
