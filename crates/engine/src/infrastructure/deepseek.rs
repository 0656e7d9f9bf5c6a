//! DeepSeek LLM client (OpenAI-compatible chat-completion API)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{
    ChatMessage, LlmError, LlmPort, LlmRequest, LlmResponse, MessageRole,
};

/// Default DeepSeek base URL.
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Default model for DeepSeek.
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

/// Client for DeepSeek's OpenAI-compatible API.
///
/// The API key is optional on purpose: a missing credential is a
/// configuration problem the caller degrades on, not a startup failure.
#[derive(Clone)]
pub struct DeepSeekClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl DeepSeekClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        // Use 120 second timeout for LLM requests (they can be slow)
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Create client from environment variables.
    ///
    /// Uses `DEEPSEEK_BASE_URL`, `DEEPSEEK_MODEL`, and `DEEPSEEK_API_KEY`,
    /// falling back to defaults for the first two. A missing key yields a
    /// client whose every call returns [`LlmError::MissingCredential`].
    pub fn from_env() -> Self {
        let base_url = std::env::var("DEEPSEEK_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_DEEPSEEK_BASE_URL.to_string());
        let model =
            std::env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| DEFAULT_DEEPSEEK_MODEL.to_string());
        let api_key = std::env::var("DEEPSEEK_API_KEY").ok();
        Self::new(&base_url, &model, api_key)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl LlmPort for DeepSeekClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingCredential)?;

        let api_request = OpenAIChatRequest {
            model: self.model.clone(),
            messages: build_messages(&request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(format!(
                "{status} {error_text}"
            )));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        convert_response(api_response)
    }
}

fn build_messages(request: &LlmRequest) -> Vec<OpenAIMessage> {
    let mut messages = Vec::new();

    if let Some(system) = &request.system_prompt {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: Some(system.clone()),
        });
    }

    for ChatMessage { role, content } in &request.messages {
        messages.push(OpenAIMessage {
            role: match role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::System => "system",
            }
            .to_string(),
            content: Some(content.clone()),
        });
    }

    messages
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

    let content = choice
        .message
        .content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("No content received from LLM".to_string()))?;

    Ok(LlmResponse { content })
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::LlmRequest;

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let client = DeepSeekClient::new("http://localhost:1", "deepseek-chat", None);
        assert!(!client.has_credential());

        let err = client
            .generate(LlmRequest::new("system", "开始游戏"))
            .await
            .expect_err("no credential");
        assert!(matches!(err, LlmError::MissingCredential));
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let client = DeepSeekClient::new(
            DEFAULT_DEEPSEEK_BASE_URL,
            DEFAULT_DEEPSEEK_MODEL,
            Some(String::new()),
        );
        assert!(!client.has_credential());
    }

    #[test]
    fn system_prompt_is_first_message() {
        let request = LlmRequest::new("you are a dungeon narrator", "向北走");
        let messages = build_messages(&request);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content.as_deref(), Some("向北走"));
    }

    #[test]
    fn empty_content_is_an_invalid_response() {
        let response = OpenAIChatResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIMessage {
                    role: "assistant".to_string(),
                    content: Some(String::new()),
                },
            }],
        };
        assert!(matches!(
            convert_response(response),
            Err(LlmError::InvalidResponse(_))
        ));
    }
}
