//! Content generation against the LLM contract.
//!
//! The model is an untrusted collaborator: its output is free text that
//! should contain one JSON object matching the `GameState` shape, but nothing
//! guarantees it does. Every response goes through span extraction, parsing,
//! and schema validation; any failure along the way degrades to a fallback
//! state instead of surfacing an error to the player.

use std::sync::Arc;

use dungeonmind_domain::{GameState, ValidationError};

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest};
use crate::use_cases::prompt;

/// Internal failure while consulting the model. Never escapes
/// [`ContentGenerator::generate`]; recorded here for logging.
#[derive(Debug, thiserror::Error)]
enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("no JSON object in model output")]
    NoJsonObject,
    #[error("model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model output does not match the game state schema: {0}")]
    Schema(#[from] ValidationError),
}

/// Talks to the external language model and enforces the response contract.
pub struct ContentGenerator {
    llm: Arc<dyn LlmPort>,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    /// Produce the next canonical state for a player command.
    ///
    /// Never fails outward: on any internal failure (missing credential,
    /// transport error, unparsable or non-conforming model output) the
    /// result is a fallback built from `current` - same hp, inventory,
    /// exits, objects, enemy, and loot, with `room` naming the attempted
    /// command and `effect` set to a fixed unavailability message.
    pub async fn generate(&self, command: &str, current: &GameState) -> GameState {
        match self.try_generate(command, current).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(command, error = %e, "content generation failed, using fallback state");
                fallback_state(command, current)
            }
        }
    }

    async fn try_generate(
        &self,
        command: &str,
        current: &GameState,
    ) -> Result<GameState, GenerationError> {
        let request = LlmRequest::new(prompt::system_prompt(current), command)
            .with_temperature(0.7)
            .with_max_tokens(1000);

        let response = self.llm.generate(request).await?;

        let span = extract_json_span(&response.content).ok_or(GenerationError::NoJsonObject)?;
        let candidate: serde_json::Value = serde_json::from_str(span)?;

        // The validated snapshot replaces the previous state wholesale;
        // nothing is merged field-by-field.
        Ok(GameState::from_value(&candidate)?)
    }
}

/// Build the degraded state returned when the model cannot be consulted.
fn fallback_state(command: &str, current: &GameState) -> GameState {
    let mut state = current.clone();
    state.room = prompt::fallback_room(command);
    state.effect = Some(prompt::FALLBACK_EFFECT.to_string());
    state
}

/// Extract the first `{` through the last `}` of the model's free text,
/// tolerating commentary or code fences around the JSON object.
fn extract_json_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end >= start).then(|| &content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::infrastructure::ports::LlmResponse;

    /// Mock LLM that returns a configurable response
    struct MockLlm {
        response: String,
    }

    impl MockLlm {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
            }
        }
    }

    #[async_trait]
    impl LlmPort for MockLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                content: self.response.clone(),
            })
        }
    }

    /// Mock LLM that fails every call
    struct FailingLlm {
        error: fn() -> LlmError,
    }

    #[async_trait]
    impl LlmPort for FailingLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Err((self.error)())
        }
    }

    fn current_state() -> GameState {
        prompt::initial_state()
    }

    fn valid_model_json() -> String {
        json!({
            "room": "你来到一条阴暗的走廊，火把的光在石壁上摇曳。",
            "objects": ["火把", "锈蚀的铁门"],
            "exits": ["south"],
            "enemy": {"name": "哥布林", "hp": 5, "maxHp": 5},
            "loot": null,
            "effect": null,
            "playerHp": 12,
            "playerMaxHp": 12,
            "inventory": ["勇者徽章"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn clean_json_becomes_the_new_state() {
        let generator = ContentGenerator::new(Arc::new(MockLlm::new(valid_model_json())));
        let state = generator.generate("向北走", &current_state()).await;
        assert_eq!(state.room, "你来到一条阴暗的走廊，火把的光在石壁上摇曳。");
        assert_eq!(state.enemy.as_ref().map(|e| e.name.as_str()), Some("哥布林"));
    }

    #[tokio::test]
    async fn commentary_and_fences_around_the_json_are_tolerated() {
        let wrapped = format!("好的，这是新的游戏状态：\n```json\n{}\n```\n祝你好运！", valid_model_json());
        let generator = ContentGenerator::new(Arc::new(MockLlm::new(wrapped)));
        let state = generator.generate("向北走", &current_state()).await;
        assert_eq!(state.exits, vec!["south"]);
    }

    #[tokio::test]
    async fn malformed_json_degrades_to_fallback() {
        let generator = ContentGenerator::new(Arc::new(MockLlm::new("{not valid json at all")));
        let prior = current_state();
        let state = generator.generate("攻击哥布林", &prior).await;

        assert!(state.room.contains("攻击哥布林"));
        assert_eq!(state.effect.as_deref(), Some(prompt::FALLBACK_EFFECT));
        // Everything else carries over from the prior state untouched.
        assert_eq!(state.player_hp, prior.player_hp);
        assert_eq!(state.inventory, prior.inventory);
        assert_eq!(state.exits, prior.exits);
        assert_eq!(state.objects, prior.objects);
        assert_eq!(state.loot, prior.loot);
    }

    #[tokio::test]
    async fn output_without_any_json_object_degrades_to_fallback() {
        let generator = ContentGenerator::new(Arc::new(MockLlm::new("抱歉,我无法继续这个故事。")));
        let state = generator.generate("向北走", &current_state()).await;
        assert!(state.room.contains("向北走"));
        assert_eq!(state.effect.as_deref(), Some(prompt::FALLBACK_EFFECT));
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_fallback() {
        let generator = ContentGenerator::new(Arc::new(FailingLlm {
            error: || LlmError::RequestFailed("connection refused".to_string()),
        }));
        let state = generator.generate("开始游戏", &current_state()).await;
        assert!(state.room.contains("开始游戏"));
        assert_eq!(state.effect.as_deref(), Some(prompt::FALLBACK_EFFECT));
    }

    #[tokio::test]
    async fn missing_credential_degrades_to_fallback() {
        let generator = ContentGenerator::new(Arc::new(FailingLlm {
            error: || LlmError::MissingCredential,
        }));
        let prior = current_state();
        let state = generator.generate("开始游戏", &prior).await;
        assert!(state.room.contains("开始游戏"));
        assert_eq!(state.player_hp, prior.player_hp);
    }

    #[tokio::test]
    async fn missing_player_hp_gets_the_schema_default() {
        let mut candidate: serde_json::Value =
            serde_json::from_str(&valid_model_json()).expect("fixture");
        candidate.as_object_mut().expect("object").remove("playerHp");
        candidate.as_object_mut().expect("object").remove("playerMaxHp");
        let generator = ContentGenerator::new(Arc::new(MockLlm::new(candidate.to_string())));

        let state = generator.generate("向北走", &current_state()).await;
        assert_eq!(state.player_hp, 10.0);
        assert_eq!(state.player_max_hp, 10.0);
        assert_eq!(state.exits, vec!["south"], "not the fallback path");
    }

    #[tokio::test]
    async fn missing_room_triggers_the_fallback_path() {
        let mut candidate: serde_json::Value =
            serde_json::from_str(&valid_model_json()).expect("fixture");
        candidate.as_object_mut().expect("object").remove("room");
        let generator = ContentGenerator::new(Arc::new(MockLlm::new(candidate.to_string())));

        let state = generator.generate("向北走", &current_state()).await;
        assert!(state.room.contains("向北走"));
        assert_eq!(state.effect.as_deref(), Some(prompt::FALLBACK_EFFECT));
    }

    #[test]
    fn json_span_is_first_open_to_last_close() {
        assert_eq!(extract_json_span("before {\"a\": {\"b\": 1}} after"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_span("no braces here"), None);
        assert_eq!(extract_json_span("} reversed {"), None);
    }
}
