use async_trait::async_trait;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::ScriptConfig;
use crate::errors::ProviderError;

use super::ScriptGenerator;

/// Ollama client for interacting with Ollama API
#[derive(Debug, Clone)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }
}

impl Ollama {
    /// Create a client for `base_url` with the given request timeout
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama serves HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
        }
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        parse_chat_response(&response_text)
    }
}

/// Parse a chat response body.
///
/// A server that ignores `stream: false` answers with JSON lines; their
/// message fragments are concatenated.
fn parse_chat_response(body: &str) -> Result<ChatResponse, ProviderError> {
    let parse_error = match serde_json::from_str::<ChatResponse>(body) {
        Ok(response) => return Ok(response),
        Err(e) => e,
    };

    let mut content = String::new();
    let mut model = String::new();
    let mut eval_count = None;
    let mut parsed_any = false;

    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        parsed_any = true;
        if let Some(part) = value["message"]["content"].as_str() {
            content.push_str(part);
        }
        if let Some(m) = value["model"].as_str() {
            model = m.to_string();
        }
        if value["done"].as_bool().unwrap_or(false) {
            eval_count = value["eval_count"].as_u64();
        }
    }

    if !parsed_any {
        let preview: String = body.chars().take(500).collect();
        error!("Failed to parse Ollama API chat response: {}. Raw response: {}", parse_error, preview);
        return Err(ProviderError::ParseError(format!(
            "Failed to parse Ollama API chat response: {}",
            parse_error
        )));
    }

    Ok(ChatResponse {
        model,
        message: ChatMessage {
            role: "assistant".to_string(),
            content,
        },
        done: true,
        eval_count,
    })
}

/// Title line some models put in front of the story despite being told not to
static TITLE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*title\s*:[^\n]*(\n+|$)").unwrap());

/// Inline label before the first sentence
static LEADING_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(script|story)\s*:\s*").unwrap());

/// Markdown emphasis markers
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*\n]+)\*\*|__([^_\n]+)__|\*([^*\n]+)\*").unwrap());

/// Strip labels and markdown from a generated script so it can be spoken as is
pub fn clean_script(raw: &str) -> String {
    let mut script = raw.trim().to_string();
    while let Some(found) = TITLE_LINE.find(&script).or_else(|| LEADING_LABEL.find(&script)) {
        script = script[found.end()..].trim_start().to_string();
    }
    EMPHASIS.replace_all(&script, "$1$2$3").trim().to_string()
}

/// Story script generator backed by an Ollama chat model
#[derive(Debug, Clone)]
pub struct OllamaScriptGenerator {
    client: Ollama,
    system_prompt: String,
    temperature: Option<f32>,
}

impl OllamaScriptGenerator {
    /// Create a generator from the script configuration
    pub fn new(config: &ScriptConfig) -> Self {
        Self {
            client: Ollama::new(&config.endpoint, config.timeout_secs),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
        }
    }

    /// Build the chat request for an idea
    pub fn build_request(&self, idea: &str, model: &str) -> ChatRequest {
        let messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(format!("Write a story based on this core idea: {}", idea)),
        ];
        let request = ChatRequest::new(model, messages);
        match self.temperature {
            Some(temperature) => request.temperature(temperature),
            None => request,
        }
    }
}

#[async_trait]
impl ScriptGenerator for OllamaScriptGenerator {
    async fn generate(&self, idea: &str, model: &str) -> Result<String, ProviderError> {
        if idea.trim().is_empty() {
            return Err(ProviderError::InvalidInput("story idea is empty".to_string()));
        }

        info!("Generating script with Ollama model '{}'...", model);
        let response = self.client.chat(&self.build_request(idea, model)).await?;

        let script = clean_script(&response.message.content);
        if script.is_empty() {
            return Err(ProviderError::ParseError("Ollama returned an empty script".to_string()));
        }

        debug!(
            "Script generated: {} characters, {} tokens",
            script.len(),
            response.eval_count.unwrap_or(0)
        );
        Ok(script)
    }
}
