//! Chat-completions client used as the extraction fallback.

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use billtrack_core::models::config::FallbackConfig;
use billtrack_core::text::truncate_chars;
use billtrack_core::{ExtractionError, FallbackExtractor, Parties, RawAmount, RawFieldSet};

const SYSTEM_PROMPT: &str = "You are a document extraction assistant.";

const FIELDS_PROMPT: &str = "You are an expert document parser.
Given the raw text content of an invoice or supplier statement,
your task is to extract the following fields:

- invoice_no: Invoice number (e.g., INV-12345)
- invoice_date: Invoice date in dd/mm/yyyy format
- due_date: Due date if available, in dd/mm/yyyy
- amount: Total amount due (numeric only)
- reference: PO/Contract number if available

Return your answer strictly as a single JSON object with these keys.
If any field is not found, set it to null.

Input PDF Text:
";

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?im)^```(?:json)?|```$").unwrap();
    static ref FLAT_OBJECT: Regex = Regex::new(r"\{[^{}]+\}").unwrap();
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Fallback extractor backed by an OpenAI-compatible chat endpoint.
pub struct ChatFallback {
    http_client: reqwest::Client,
    endpoint: String,
    models: Vec<String>,
    api_key: String,
    max_prompt_chars: usize,
}

impl ChatFallback {
    /// Build a client from configuration. The API key is read from the
    /// configured environment variable.
    pub fn from_config(config: &FallbackConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!(
                "Fallback needs an API key in the {} environment variable",
                config.api_key_env
            )
        })?;

        if config.models.is_empty() {
            anyhow::bail!("Fallback is enabled but no models are configured");
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("billtrack-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            models: config.models.clone(),
            api_key,
            max_prompt_chars: config.max_prompt_chars,
        })
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ExtractionError> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.1,
            max_tokens: 300,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Fallback(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Fallback(format!(
                "{} answered {}: {}",
                model,
                status.as_u16(),
                body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedReply(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractionError::MalformedReply("empty completion".to_string()))
    }

    async fn extract_async(&self, text: &str, parties: &Parties) -> Result<RawFieldSet, ExtractionError> {
        let prompt = build_prompt(text, self.max_prompt_chars);
        let mut last_error = None;

        for model in &self.models {
            match self.complete(model, &prompt).await {
                Ok(reply) => {
                    info!("Fallback extraction answered by {}", model);
                    debug!("Raw reply: {}", reply);
                    return parse_reply(&reply, parties);
                }
                Err(e) => {
                    warn!("Model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ExtractionError::Fallback("no model succeeded".to_string())))
    }
}

impl FallbackExtractor for ChatFallback {
    fn name(&self) -> &str {
        "chat"
    }

    fn extract(&self, text: &str, parties: &Parties) -> Result<RawFieldSet, ExtractionError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| ExtractionError::Fallback(e.to_string()))?;

        // The pipeline is synchronous; borrow a worker thread for the request
        tokio::task::block_in_place(|| handle.block_on(self.extract_async(text, parties)))
    }
}

/// Prompt with the document text capped at `max_chars` characters.
pub fn build_prompt(text: &str, max_chars: usize) -> String {
    format!("{}{}", FIELDS_PROMPT, truncate_chars(text.trim(), max_chars))
}

/// Map a chat reply to a field-set.
///
/// Code fences are stripped and the first flat JSON object is read. Missing
/// keys and `null`s become `None`.
pub fn parse_reply(reply: &str, parties: &Parties) -> Result<RawFieldSet, ExtractionError> {
    let cleaned = CODE_FENCE.replace_all(reply.trim(), "");
    let object = FLAT_OBJECT
        .find(&cleaned)
        .ok_or_else(|| ExtractionError::MalformedReply("no JSON object in reply".to_string()))?;

    let value: Value = serde_json::from_str(object.as_str())
        .map_err(|e| ExtractionError::MalformedReply(e.to_string()))?;

    let mut raw = RawFieldSet::empty(parties);
    raw.invoice_no = text_field(&value, "invoice_no");
    raw.invoice_date = text_field(&value, "invoice_date");
    raw.due_date = text_field(&value, "due_date");
    raw.reference = text_field(&value, "reference");
    raw.amount = match value.get("amount") {
        Some(Value::Number(n)) => n.as_f64().map(RawAmount::Number),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(RawAmount::Text(s.clone())),
        _ => None,
    };

    Ok(raw)
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
