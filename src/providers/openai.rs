use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, error, info};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::app_config::SpeechConfig;
use crate::errors::ProviderError;

use super::{SpeechParams, SpeechSynthesizer};

/// Request body for the OpenAI speech endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Speech model
    pub model: String,
    /// Voice name
    pub voice: String,
    /// Text to speak
    pub input: String,
    /// Playback speed
    pub speed: f32,
}

impl SpeechRequest {
    /// Build a request for `text` with the given voice settings
    pub fn new(text: impl Into<String>, params: &SpeechParams) -> Self {
        Self {
            model: params.model.clone(),
            voice: params.voice.clone(),
            input: text.into(),
            speed: params.speed,
        }
    }
}

/// Speech synthesizer backed by the OpenAI audio API
#[derive(Debug, Clone)]
pub struct OpenAISpeech {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl OpenAISpeech {
    /// Create a synthesizer from the speech configuration
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            api_key: config.get_api_key(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Speech endpoint URL
    pub fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.endpoint)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeech {
    async fn synthesize(&self, text: &str, params: &SpeechParams, output_path: &Path) -> Result<(), ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredentials(
                "OpenAI API key is not configured (set speech.api_key or OPENAI_API_KEY)".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidInput("no text to synthesize".to_string()));
        }

        info!("Requesting speech with voice '{}' at {}x speed...", params.voice, params.speed);
        let response = self
            .client
            .post(self.speech_url())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&SpeechRequest::new(text, params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let write_error =
            |e: std::io::Error| ProviderError::RequestFailed(format!("failed to write {:?}: {}", output_path, e));

        let mut file = tokio::fs::File::create(output_path).await.map_err(write_error)?;
        let mut stream = response.bytes_stream();
        let mut written = 0usize;
        while let Some(chunk) = stream.next().await {
            let data = chunk?;
            file.write_all(&data).await.map_err(write_error)?;
            written += data.len();
        }
        file.flush().await.map_err(write_error)?;

        if written == 0 {
            return Err(ProviderError::ParseError("speech API returned no audio".to_string()));
        }

        debug!("Wrote {} bytes of audio to {:?}", written, output_path);
        Ok(())
    }
}
