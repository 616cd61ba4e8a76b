/*!
 * External collaborators of the story pipeline.
 *
 * Each stage talks to exactly one collaborator through a trait:
 * - `ScriptGenerator`: turns a story idea into a narration script (Ollama)
 * - `SpeechSynthesizer`: turns the script into a voice track (OpenAI speech API)
 * - `Transcriber`: recovers word timings from the voice track (whisper_timestamped)
 *
 * `mock` holds scripted implementations used by the tests.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

use crate::app_config::{SpeechConfig, TranscriptionConfig};
use crate::errors::ProviderError;
use crate::timing::Segment;

/// Voice settings for one synthesis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechParams {
    /// Speech model
    pub model: String,
    /// Voice name
    pub voice: String,
    /// Playback speed multiplier
    pub speed: f32,
}

impl From<&SpeechConfig> for SpeechParams {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            model: config.model.clone(),
            voice: config.voice.clone(),
            speed: config.speed,
        }
    }
}

/// Decoder settings for one transcription call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionParams {
    /// Whisper model size
    pub model_size: String,
    /// Compute device
    pub device: String,
    /// Spoken language, two-letter code
    pub language: String,
    /// Beam search width
    pub beam_size: u32,
    /// Sampled candidates
    pub best_of: u32,
}

impl From<&TranscriptionConfig> for TranscriptionParams {
    fn from(config: &TranscriptionConfig) -> Self {
        let language = crate::language_utils::transcription_language_code(&config.language)
            .unwrap_or_else(|_| config.language.clone());
        Self {
            model_size: config.model_size.clone(),
            device: config.device.clone(),
            language,
            beam_size: config.beam_size,
            best_of: config.best_of,
        }
    }
}

/// Writes a story script from an idea
#[async_trait]
pub trait ScriptGenerator: Send + Sync + Debug {
    /// Generate the script text for `idea` using `model`.
    ///
    /// An empty response is an error.
    async fn generate(&self, idea: &str, model: &str) -> Result<String, ProviderError>;
}

/// Turns text into a spoken audio file
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize `text` and write the audio to `output_path`
    async fn synthesize(&self, text: &str, params: &SpeechParams, output_path: &Path) -> Result<(), ProviderError>;
}

/// Recovers per-word timings from an audio file
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    /// Transcribe `audio_path` into ordered segments with word timings.
    ///
    /// The raw result is persisted next to the audio as
    /// `<audio stem>_timestamps.json`.
    async fn transcribe(&self, audio_path: &Path, params: &TranscriptionParams) -> Result<Vec<Segment>, ProviderError>;
}

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod whisper;
