//! Hosted language model calls for every supported provider.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use url::Url;

use super::decode::{decode_analysis_result, decode_recommendation_set};
use super::photo::PhotoDataUri;
use super::prompts::{
    analysis_result_schema, build_food_analysis_prompt, build_recommendation_prompt,
    recommendation_set_schema, SYSTEM_PROMPT,
};
use super::types::{AnalysisResult, FoodImageAnalysisInput, RecommendationInput, RecommendationSet};
use super::AiGateway;
use crate::error::GatewayError;

const MAX_OUTPUT_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Claude,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::OpenAI => "openai",
            Provider::OpenRouter => "openrouter",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::Claude => "claude-sonnet-4-20250514",
            Provider::OpenAI => "gpt-4o",
            Provider::OpenRouter => "google/gemini-2.0-flash-001",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::Claude => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
            Provider::OpenRouter => "https://openrouter.ai/api",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "googleai" => Ok(Provider::Gemini),
            "claude" => Ok(Provider::Claude),
            "openai" => Ok(Provider::OpenAI),
            "openrouter" => Ok(Provider::OpenRouter),
            other => Err(GatewayError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Everything needed to talk to one provider.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
    /// Overrides the provider's default base URL (proxies, local mocks)
    pub base_url: Option<Url>,
    pub timeout: Duration,
}

/// [`AiGateway`] backed by a hosted LLM over HTTPS.
pub struct LlmGateway {
    settings: GatewaySettings,
    client: reqwest::Client,
}

impl LlmGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        if settings.api_key.trim().is_empty() {
            return Err(GatewayError::MissingApiKey(settings.provider.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        info!(
            "AI gateway ready: provider '{}' model '{}'",
            settings.provider, settings.model
        );
        Ok(Self { settings, client })
    }

    pub fn provider(&self) -> Provider {
        self.settings.provider
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Send one prompt (plus optional photo) and return the model's raw text.
    async fn complete(
        &self,
        prompt: &str,
        photo: Option<&PhotoDataUri>,
        schema_name: &str,
        schema: &Value,
    ) -> Result<String, GatewayError> {
        let provider = self.settings.provider;
        let model = self.settings.model.as_str();
        let api_key = self.settings.api_key.as_str();
        let base = self.base_url();

        let request = match provider {
            Provider::Gemini => self
                .client
                .post(format!("{}/v1beta/models/{}:generateContent", base, model))
                .header("x-goog-api-key", api_key)
                .json(&gemini_body(prompt, photo, schema)),
            Provider::Claude => self
                .client
                .post(format!("{}/v1/messages", base))
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&claude_body(model, prompt, photo)),
            Provider::OpenAI | Provider::OpenRouter => self
                .client
                .post(format!("{}/v1/chat/completions", base))
                .header("Authorization", format!("Bearer {}", api_key))
                .json(&chat_completions_body(
                    provider,
                    model,
                    prompt,
                    photo,
                    schema_name,
                    schema,
                )),
        };

        let response = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                GatewayError::Timeout {
                    provider: provider.to_string(),
                    seconds: self.settings.timeout.as_secs(),
                }
            } else {
                GatewayError::Transport {
                    provider: provider.to_string(),
                    reason: e.to_string(),
                }
            };
            error!("{}", err);
            err
        })?;

        let body_text = handle_api_response(response, provider).await?;
        let body: Value = serde_json::from_str(&body_text).map_err(|e| {
            let err = GatewayError::MalformedOutput(format!(
                "Failed to parse {} API response wrapper: {}",
                provider, e
            ));
            error!("{}", err);
            err
        })?;

        extract_text(provider, &body).ok_or_else(|| {
            error!("No text content in {} API response", provider);
            GatewayError::EmptyOutput
        })
    }

    fn base_url(&self) -> String {
        match &self.settings.base_url {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => self.settings.provider.default_base_url().to_string(),
        }
    }
}

impl AiGateway for LlmGateway {
    async fn analyze_food_image(
        &self,
        input: &FoodImageAnalysisInput,
    ) -> Result<AnalysisResult, GatewayError> {
        info!(
            "Analyzing food photo ({}) using provider '{}' model '{}'",
            input.photo_data_uri.mime_type(),
            self.settings.provider,
            self.settings.model
        );
        let prompt = build_food_analysis_prompt(input);
        let text = self
            .complete(
                &prompt,
                Some(&input.photo_data_uri),
                "food_analysis",
                &analysis_result_schema(),
            )
            .await?;
        let result = decode_analysis_result(&text)?;
        info!("Analyzed food photo: '{}'", result.food_name);
        Ok(result)
    }

    async fn get_recommendations(
        &self,
        input: &RecommendationInput,
    ) -> Result<RecommendationSet, GatewayError> {
        info!(
            "Requesting recommendations for goal '{}' using provider '{}' model '{}'",
            input.fitness_goals, self.settings.provider, self.settings.model
        );
        let prompt = build_recommendation_prompt(input);
        let text = self
            .complete(
                &prompt,
                None,
                "food_recommendations",
                &recommendation_set_schema(),
            )
            .await?;
        let set = decode_recommendation_set(&text)?;
        info!(
            "Received {} recipes and {} restaurants",
            set.recommended_recipes.len(),
            set.recommended_restaurants.len()
        );
        Ok(set)
    }
}

/// Check status and read the body text.
async fn handle_api_response(
    response: reqwest::Response,
    provider: Provider,
) -> Result<String, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let truncated = if body.len() > 1024 {
            format!("{}...", body.chars().take(1024).collect::<String>())
        } else {
            body
        };
        let err = GatewayError::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: truncated,
        };
        error!("{}", err);
        return Err(err);
    }
    response.text().await.map_err(|e| GatewayError::Transport {
        provider: provider.to_string(),
        reason: format!("Failed to read API response body: {}", e),
    })
}

/// Gemini generateContent body with the photo as an inline part and
/// JSON output constrained by `responseSchema`.
fn gemini_body(prompt: &str, photo: Option<&PhotoDataUri>, schema: &Value) -> Value {
    let mut parts = vec![json!({ "text": prompt })];
    if let Some(photo) = photo {
        parts.push(json!({
            "inline_data": {
                "mime_type": photo.mime_type(),
                "data": photo.base64_data(),
            }
        }));
    }

    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
            "responseMimeType": "application/json",
            "responseSchema": gemini_schema(schema),
        }
    })
}

/// Gemini's schema dialect rejects `additionalProperties`.
fn gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties")
                .map(|(key, value)| (key.clone(), gemini_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Anthropic messages body. Claude gets schema guidance from the prompt only.
fn claude_body(model: &str, prompt: &str, photo: Option<&PhotoDataUri>) -> Value {
    let mut content = Vec::new();
    if let Some(photo) = photo {
        content.push(json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": photo.mime_type(),
                "data": photo.base64_data(),
            }
        }));
    }
    content.push(json!({ "type": "text", "text": prompt }));

    json!({
        "model": model,
        "max_tokens": MAX_OUTPUT_TOKENS,
        "system": SYSTEM_PROMPT,
        "messages": [{ "role": "user", "content": content }]
    })
}

/// OpenAI-compatible chat completions body. OpenAI gets strict
/// `json_schema` output; OpenRouter routes to models that may not support
/// it, so it uses `json_object` mode.
fn chat_completions_body(
    provider: Provider,
    model: &str,
    prompt: &str,
    photo: Option<&PhotoDataUri>,
    schema_name: &str,
    schema: &Value,
) -> Value {
    let mut content = vec![json!({ "type": "text", "text": prompt })];
    if let Some(photo) = photo {
        content.push(json!({
            "type": "image_url",
            "image_url": { "url": photo.as_str() }
        }));
    }

    let response_format = match provider {
        Provider::OpenAI => json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema_name,
                "strict": true,
                "schema": schema,
            }
        }),
        _ => json!({ "type": "json_object" }),
    };

    json!({
        "model": model,
        "max_tokens": MAX_OUTPUT_TOKENS,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": content }
        ],
        "response_format": response_format
    })
}

/// Pull the generated text out of a provider response wrapper.
fn extract_text(provider: Provider, body: &Value) -> Option<String> {
    let text = match provider {
        // { "candidates": [{ "content": { "parts": [{ "text": "..." }] } }] }
        Provider::Gemini => body["candidates"][0]["content"]["parts"]
            .as_array()?
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<String>(),
        // { "content": [{ "type": "text", "text": "..." }] }
        Provider::Claude => body["content"]
            .as_array()?
            .iter()
            .filter(|block| block["type"] == "text")
            .filter_map(|block| block["text"].as_str())
            .collect::<String>(),
        // { "choices": [{ "message": { "content": "..." } }] }
        Provider::OpenAI | Provider::OpenRouter => {
            body["choices"][0]["message"]["content"].as_str()?.to_string()
        }
    };
    (!text.trim().is_empty()).then_some(text)
}
