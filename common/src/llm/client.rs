use crate::credential::ApiKey;
use crate::error::{Result, SqlGenError};
use crate::llm::model::{Generator, Message, ModelConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// openai-compatible chat completions client
pub struct ChatClient {
    client: Client,
    api_key: ApiKey,
    config: ModelConfig,
}

impl ChatClient {
    pub fn new(api_key: ApiKey, config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SqlGenError::Service(format!("failed to create http client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl Generator for ChatClient {
    #[tracing::instrument(skip(self, messages), fields(model = %self.config.model, message_count = messages.len()))]
    async fn complete(&self, messages: Vec<Message>) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| SqlGenError::Service(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SqlGenError::Service(format!("api error ({}): {}", status, body)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SqlGenError::Service(format!("malformed response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SqlGenError::Service("response carried no message content".to_string()))?;

        tracing::debug!(chars = content.len(), "completion received");
        Ok(content.trim().to_string())
    }
}
