use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Keys a model commonly wraps its item array in. Checked in order; an
/// empty array falls through to the next key.
const ITEM_KEYS: [&str; 5] = ["action_items", "actionItems", "items", "actions", "tasks"];

/// Model-path failures. The HTTP layer decides whether to surface these or
/// degrade to an empty item list.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The model backend could not be reached or rejected the request.
    #[error("model backend unavailable: {0}")]
    Unavailable(String),
    /// The model responded, but its output was not parseable JSON.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

/// Configuration for model-backed extraction
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            temperature: 0.1,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2:3b".to_string());

        Self {
            base_url,
            model,
            ..Self::default()
        }
    }
}

/// Model-backed extractor: asks Ollama for a JSON array of action items and
/// normalizes whatever shape the model actually returns.
pub struct LlmExtractor {
    config: LlmConfig,
    client: Client,
}

impl LlmExtractor {
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap();

        Self { config, client }
    }

    /// Extract action items from note text via the model.
    ///
    /// Empty input short-circuits to an empty list without touching the
    /// backend. `model` overrides the configured default for this call.
    pub async fn extract(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Vec<String>, LlmError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let model = model.unwrap_or(&self.config.model);
        let prompt = self.build_prompt(text);
        let raw = self.call_ollama(&prompt, model).await?;

        let items = parse_model_output(&raw)?;
        debug!("model extracted {} action items", items.len());
        Ok(items)
    }

    fn build_prompt(&self, text: &str) -> String {
        format!(
            r#"You are an action item extractor. Given a text containing notes,
extract all actionable tasks and return them as a JSON array of strings.

Rules:
- Extract clear, actionable items (tasks that someone needs to do)
- Remove bullet points, checkboxes, and prefixes like "TODO:", "Action:", etc.
- Keep each action item concise but complete
- If no action items are found, return an empty array []
- Return ONLY the JSON array, no other text

Extract action items from the following text:

{}

Return a JSON array of action item strings."#,
            text
        )
    }

    async fn call_ollama(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.base_url);

        let request_body = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": self.config.temperature,
            }
        });

        debug!("Calling Ollama at {} with model {}", url, model);

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Unavailable(format!(
                "Ollama API error {}: {}",
                status, error_text
            )));
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            response: String,
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        Ok(ollama_response.response)
    }
}

/// Parse the model's raw output and normalize it into item strings.
fn parse_model_output(raw: &str) -> Result<Vec<String>, LlmError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| LlmError::MalformedOutput(e.to_string()))?;

    Ok(normalize_items(&value))
}

/// Models return a bare array, an object wrapping one, or something else
/// entirely. Only the first two shapes yield items.
fn normalize_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => coerce_items(items),
        Value::Object(map) => {
            for key in ITEM_KEYS {
                if let Some(Value::Array(items)) = map.get(key) {
                    if !items.is_empty() {
                        return coerce_items(items);
                    }
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn coerce_items(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(coerce_item).collect()
}

/// Keep non-blank strings as-is; stringify other truthy scalars. Blank
/// strings, nulls, zero and `false` are dropped.
fn coerce_item(item: &Value) -> Option<String> {
    match item {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
