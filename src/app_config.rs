use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration: which collaborators
/// generate the script, speech and timestamps, where media lives, how the
/// captions look and how the final video is encoded.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Story script generation
    #[serde(default)]
    pub script: ScriptConfig,

    /// Text-to-speech
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Word-level transcription
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Input and output media, encoder settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Caption grouping and style
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Script generation backend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptProvider {
    // @provider: Ollama
    #[default]
    Ollama,
}

impl ScriptProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
        }
    }
}

impl std::fmt::Display for ScriptProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for ScriptProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid script provider: {}", s)),
        }
    }
}

/// Script generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptConfig {
    /// Provider serving the language model
    #[serde(default)]
    pub provider: ScriptProvider,

    /// Model name (e.g., "mistral", "llama3")
    #[serde(default = "default_script_model")]
    pub model: String,

    /// Service endpoint URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Instructions that shape every generated story
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature; the model default is used when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            provider: ScriptProvider::default(),
            model: default_script_model(),
            endpoint: default_ollama_endpoint(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

/// Text-to-speech settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// API key; falls back to the OPENAI_API_KEY environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Speech model (e.g., "tts-1", "tts-1-hd")
    #[serde(default = "default_speech_model")]
    pub model: String,

    /// Voice name
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Playback speed multiplier (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            model: default_speech_model(),
            voice: default_voice(),
            speed: default_speed(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SpeechConfig {
    /// Get the API key, preferring the configured one over the environment
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var(OPENAI_API_KEY_ENV).unwrap_or_default()
    }
}

/// Environment variable consulted when no speech API key is configured
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Word-level transcription settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// Transcriber executable
    #[serde(default = "default_transcriber_command")]
    pub command: String,

    /// Whisper model size (tiny, base, small, medium, large)
    #[serde(default = "default_model_size")]
    pub model_size: String,

    /// Compute device (cpu, cuda)
    #[serde(default = "default_device")]
    pub device: String,

    /// Spoken language code (ISO 639)
    #[serde(default = "default_language")]
    pub language: String,

    /// Beam search width
    #[serde(default = "default_beam_size")]
    pub beam_size: u32,

    /// Candidates sampled when decoding with temperature
    #[serde(default = "default_best_of")]
    pub best_of: u32,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            command: default_transcriber_command(),
            model_size: default_model_size(),
            device: default_device(),
            language: default_language(),
            beam_size: default_beam_size(),
            best_of: default_best_of(),
        }
    }
}

/// Media locations and encoder settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoConfig {
    /// Background video file, or a directory to pick one from at random
    #[serde(default = "default_background_video")]
    pub background_video: PathBuf,

    /// Directory receiving the final video
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Final video file name
    #[serde(default = "default_output_filename")]
    pub output_filename: String,

    /// Narration file name in the working directory
    #[serde(default = "default_audio_filename")]
    pub audio_filename: String,

    /// Video codec
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Encoder preset
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Encoder threads
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            background_video: default_background_video(),
            output_dir: default_output_dir(),
            output_filename: default_output_filename(),
            audio_filename: default_audio_filename(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preset: default_preset(),
            threads: default_threads(),
        }
    }
}

impl VideoConfig {
    /// Full path of the final video
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }
}

/// Caption grouping and style
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionConfig {
    /// Font name
    #[serde(default = "default_font")]
    pub font: String,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Text color
    #[serde(default = "default_color")]
    pub color: String,

    /// Outline color
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    /// Outline width in pixels
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    /// Maximum words per caption
    #[serde(default = "default_group_size")]
    pub group_size: usize,

    /// Minimum on-screen duration of a caption in seconds
    #[serde(default = "default_min_duration")]
    pub min_duration: f64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font: default_font(),
            font_size: default_font_size(),
            color: default_color(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            group_size: default_group_size(),
            min_duration: default_min_duration(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_script_model() -> String {
    "mistral".to_string()
}

fn default_system_prompt() -> String {
    concat!(
        "You are a writer specializing in short, viral stories with unexpected twists, perfect for platforms like Reddit or short-form video. ",
        "Your goal is to create narratives that immediately present a shocking or seemingly clear-cut situation, often negative (like a scandal, betrayal, or bizarre behavior), ",
        "and then reveal hidden context or a twist later that completely re-frames the initial perception, creating a moral gray area.\n\n",
        "Key requirements:\n",
        "1. DIRECT HOOK START: Start the story IMMEDIATELY with the single most dramatic, confusing, or outrageous sentence. ",
        "DO NOT include any title, greeting, preamble, or introductory text like \"Script:\" or \"Title:\". ",
        "The very first word of your response must be the first word of the story's hook. Use the \"I\" perspective.\n",
        "2. Build on Premise: Develop the story based on the initial (misleading) premise. Show reactions, consequences, or escalating weirdness based on that first impression.\n",
        "3. The Twist/Reveal: Introduce new information or context partway through that fundamentally changes the meaning of the initial hook and subsequent events.\n",
        "4. Show, Don't Just Tell: Use specific details, actions, and dialogue snippets to make both the initial premise and the later reveal feel convincing.\n",
        "5. Engaging Tone: Write in a slightly informal, potentially gossipy, or \"I can't believe this happened\" style.\n",
        "6. Cliffhanger/Question: End with an open question for the audience related to the moral dilemma or the aftermath.\n",
        "7. Length: Aim for 300 words."
    )
    .to_string()
}

fn default_speech_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "echo".to_string()
}

fn default_speed() -> f32 {
    1.6
}

fn default_transcriber_command() -> String {
    "whisper_timestamped".to_string()
}

fn default_model_size() -> String {
    "base".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_beam_size() -> u32 {
    5
}

fn default_best_of() -> u32 {
    5
}

fn default_background_video() -> PathBuf {
    PathBuf::from("background_videos/minecraft_parkour.mp4")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_videos")
}

fn default_output_filename() -> String {
    "final_story_video.mp4".to_string()
}

fn default_audio_filename() -> String {
    "temp_story_audio.mp3".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_threads() -> usize {
    4
}

fn default_font() -> String {
    "Impact".to_string()
}

fn default_font_size() -> u32 {
    35
}

fn default_color() -> String {
    "white".to_string()
}

fn default_stroke_color() -> String {
    "black".to_string()
}

fn default_stroke_width() -> f64 {
    1.5
}

fn default_group_size() -> usize {
    crate::timing::grouper::DEFAULT_GROUP_SIZE
}

fn default_min_duration() -> f64 {
    crate::timing::grouper::DEFAULT_MIN_DURATION
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.script.model.trim().is_empty() {
            return Err(anyhow!("Script model must not be empty"));
        }
        if self.script.endpoint.trim().is_empty() {
            return Err(anyhow!("Script endpoint must not be empty"));
        }
        if let Some(temperature) = self.script.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("Script temperature must be between 0.0 and 2.0, got {}", temperature));
            }
        }

        if !(0.25..=4.0).contains(&self.speech.speed) {
            return Err(anyhow!("Speech speed must be between 0.25 and 4.0, got {}", self.speech.speed));
        }
        if self.speech.voice.trim().is_empty() {
            return Err(anyhow!("Speech voice must not be empty"));
        }

        crate::language_utils::transcription_language_code(&self.transcription.language)?;
        if self.transcription.beam_size == 0 || self.transcription.best_of == 0 {
            return Err(anyhow!("Transcription beam_size and best_of must be at least 1"));
        }

        if self.video.output_filename.trim().is_empty() {
            return Err(anyhow!("Output filename must not be empty"));
        }
        if self.video.audio_filename.trim().is_empty() {
            return Err(anyhow!("Audio filename must not be empty"));
        }
        if self.video.threads == 0 {
            return Err(anyhow!("Encoder threads must be at least 1"));
        }

        if self.captions.group_size == 0 {
            return Err(anyhow!("Caption group_size must be at least 1"));
        }
        if !self.captions.min_duration.is_finite() || self.captions.min_duration < 0.0 {
            return Err(anyhow!("Caption min_duration must be a non-negative number"));
        }
        if self.captions.font_size == 0 {
            return Err(anyhow!("Caption font_size must be at least 1"));
        }

        Ok(())
    }
}
