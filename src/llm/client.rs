//! HTTP-backed advisory oracle
//!
//! A model-agnostic client for LLM chat APIs, supporting both Anthropic and
//! OpenAI-compatible endpoints (DeepSeek, etc). Calls are blocking with a
//! short timeout; the trait implementation maps every failure to `None`,
//! since advice is optional and the simulation must never wait on it.

use crate::actions::Action;
use crate::core::error::{DreamerError, Result};
use crate::core::types::CreatureId;
use crate::llm::oracle::{AdvisoryOracle, MoodSummary, PerceptionSummary, Reflection};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard wall-clock bound on one API call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Completion cap; answers are one action name or a couple of sentences
const MAX_COMPLETION_TOKENS: u32 = 128;

// Flat-rate cost estimate used for telemetry, not billing
const PROMPT_TOKEN_COST_EUR: f64 = 0.25e-6;
const COMPLETION_TOKEN_COST_EUR: f64 = 1.25e-6;

/// API format type
#[derive(Debug, Clone, PartialEq)]
enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Advisory oracle backed by an LLM chat endpoint
pub struct HttpOracle {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

/// One completed call: the text plus its estimated cost
struct Completion {
    text: String,
    cost_eur: f64,
}

impl HttpOracle {
    /// Create an oracle with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Create an oracle from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| DreamerError::OracleError("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".into());

        Ok(Self::new(api_key, api_url, model))
    }

    fn complete(&self, system: &str, user: &str) -> Result<Completion> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user),
            ApiFormat::OpenAI => self.complete_openai(system, user),
        }
    }

    fn complete_anthropic(&self, system: &str, user: &str) -> Result<Completion> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_COMPLETION_TOKENS,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| DreamerError::OracleError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(DreamerError::OracleError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .map_err(|e| DreamerError::OracleError(e.to_string()))?;

        let cost_eur = completion
            .usage
            .map(|u| estimate_cost(u.input_tokens, u.output_tokens))
            .unwrap_or(0.0);

        completion
            .content
            .first()
            .map(|c| Completion {
                text: c.text.clone(),
                cost_eur,
            })
            .ok_or_else(|| DreamerError::OracleError("Empty response".into()))
    }

    fn complete_openai(&self, system: &str, user: &str) -> Result<Completion> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: MAX_COMPLETION_TOKENS,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| DreamerError::OracleError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(DreamerError::OracleError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .map_err(|e| DreamerError::OracleError(e.to_string()))?;

        let cost_eur = completion
            .usage
            .map(|u| estimate_cost(u.prompt_tokens, u.completion_tokens))
            .unwrap_or(0.0);

        completion
            .choices
            .first()
            .map(|c| Completion {
                text: c.message.content.clone(),
                cost_eur,
            })
            .ok_or_else(|| DreamerError::OracleError("Empty response".into()))
    }
}

fn estimate_cost(prompt_tokens: u32, completion_tokens: u32) -> f64 {
    prompt_tokens as f64 * PROMPT_TOKEN_COST_EUR
        + completion_tokens as f64 * COMPLETION_TOKEN_COST_EUR
}

impl AdvisoryOracle for HttpOracle {
    fn suggest_action(
        &self,
        perception: &PerceptionSummary,
        mood: &MoodSummary,
        allowed: &[Action],
    ) -> Option<Action> {
        let names: Vec<&str> = allowed.iter().map(Action::name).collect();
        let system = format!(
            "You advise a small creature in a grid world. Reply with exactly one \
             of these actions and nothing else: {}",
            names.join(", ")
        );
        let user = format!(
            "I see {} food, {} creatures, sound level {:.2}. \
             My mood is valence {:.2}, arousal {:.2}. \
             Health {:.0}, energy {:.0}. What should I do?",
            perception.food, perception.creatures, perception.avg_sound,
            mood.valence, mood.arousal, mood.health, mood.energy,
        );

        match self.complete(&system, &user) {
            Ok(completion) => {
                let suggestion = Action::from_suggestion(&completion.text);
                if suggestion.is_none() {
                    tracing::debug!(answer = %completion.text, "unparseable suggestion");
                }
                suggestion
            }
            Err(e) => {
                tracing::debug!(error = %e, "suggestion request failed");
                None
            }
        }
    }

    fn reflect(&self, creature: CreatureId, context: &serde_json::Value) -> Option<Reflection> {
        let system = "You are the inner voice of a small creature in a grid world. \
                      Reflect on its situation in one or two short first-person \
                      sentences. Be simple and concrete.";
        let user = format!("I am {}. My situation: {}", creature, context);

        match self.complete(system, &user) {
            Ok(completion) => Some(Reflection {
                text: completion.text.trim().to_string(),
                cost_eur: completion.cost_eur,
            }),
            Err(e) => {
                tracing::debug!(error = %e, creature = %creature, "reflection request failed");
                None
            }
        }
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
