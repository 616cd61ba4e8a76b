/*!
 * Mock collaborators for testing.
 *
 * Each mock follows a `MockBehavior`:
 * - `Working` - succeeds with canned output
 * - `Failing` - always fails with a connection error
 * - `Empty` - succeeds but produces nothing useful
 *
 * Every mock counts its calls so tests can assert which stages ran.
 */

use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::file_utils::FileManager;
use crate::timing::{Segment, TimedWord};

use super::{ScriptGenerator, SpeechParams, SpeechSynthesizer, Transcriber, TranscriptionParams};

/// Behavior mode for a mock collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an error
    Failing,
    /// Succeeds with empty output
    Empty,
}

fn connection_refused(service: &str) -> ProviderError {
    ProviderError::ConnectionError(format!("{} is unreachable (mock)", service))
}

/// Script generator returning a fixed story
#[derive(Debug)]
pub struct MockScriptGenerator {
    behavior: MockBehavior,
    script: String,
    request_count: Arc<AtomicUsize>,
}

impl MockScriptGenerator {
    /// Create a generator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: "I sold my brother's car. He still thanks me for it.".to_string(),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working generator
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing generator
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Return this script instead of the default one
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    /// Number of generate calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptGenerator for MockScriptGenerator {
    async fn generate(&self, idea: &str, _model: &str) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if idea.trim().is_empty() {
            return Err(ProviderError::InvalidInput("story idea is empty".to_string()));
        }
        match self.behavior {
            MockBehavior::Working => Ok(self.script.clone()),
            MockBehavior::Failing => Err(connection_refused("script service")),
            MockBehavior::Empty => Err(ProviderError::ParseError("empty script".to_string())),
        }
    }
}

/// Speech synthesizer writing placeholder audio bytes
#[derive(Debug)]
pub struct MockSpeechSynthesizer {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
}

impl MockSpeechSynthesizer {
    /// Create a synthesizer with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working synthesizer
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing synthesizer
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of synthesize calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeechSynthesizer {
    async fn synthesize(&self, text: &str, _params: &SpeechParams, output_path: &Path) -> Result<(), ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Failing => Err(connection_refused("speech service")),
            MockBehavior::Working | MockBehavior::Empty => {
                if text.trim().is_empty() {
                    return Err(ProviderError::InvalidInput("no text to synthesize".to_string()));
                }
                let bytes: &[u8] = if self.behavior == MockBehavior::Working { b"ID3mock" } else { b"" };
                tokio::fs::write(output_path, bytes)
                    .await
                    .map_err(|e| ProviderError::RequestFailed(e.to_string()))
            }
        }
    }
}

/// Transcriber returning prepared segments
#[derive(Debug)]
pub struct MockTranscriber {
    behavior: MockBehavior,
    segments: Vec<Segment>,
    request_count: Arc<AtomicUsize>,
}

impl MockTranscriber {
    /// Create a transcriber with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            segments: Self::sample_segments(),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working transcriber
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing transcriber
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a transcriber whose result carries no words
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Return these segments instead of the sample ones
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Number of transcribe calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Two short segments with seven timed words
    pub fn sample_segments() -> Vec<Segment> {
        vec![
            Segment::from_words(
                "0",
                vec![
                    TimedWord::new("I", 0.0, 0.2),
                    TimedWord::new("sold", 0.3, 0.6),
                    TimedWord::new("my", 0.7, 0.8),
                    TimedWord::new("brother's", 0.9, 1.4),
                    TimedWord::new("car.", 1.5, 1.9),
                ],
            ),
            Segment::from_words(
                "1",
                vec![TimedWord::new("He", 2.2, 2.4), TimedWord::new("thanks", 2.5, 3.0)],
            ),
        ]
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio_path: &Path, _params: &TranscriptionParams) -> Result<Vec<Segment>, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if !audio_path.exists() {
            return Err(ProviderError::InvalidInput(format!("Audio file not found at {:?}", audio_path)));
        }

        let segments = match self.behavior {
            MockBehavior::Failing => return Err(ProviderError::ToolFailed("transcriber crashed (mock)".to_string())),
            MockBehavior::Empty => Vec::new(),
            MockBehavior::Working => self.segments.clone(),
        };

        let raw = json!({ "segments": segments });
        tokio::fs::write(FileManager::timestamps_json_path(audio_path), raw.to_string())
            .await
            .map_err(|e| ProviderError::ToolFailed(e.to_string()))?;

        Ok(segments)
    }
}
