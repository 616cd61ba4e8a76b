use anyhow::Result;
use log::{debug, error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::media::{CaptionStyle, EncodingSettings, FfmpegBackend, MediaBackend, RenderReport, RenderRequest, VideoComposer};
use crate::providers::ollama::OllamaScriptGenerator;
use crate::providers::openai::OpenAISpeech;
use crate::providers::whisper::WhisperTimestamped;
use crate::providers::{ScriptGenerator, SpeechParams, SpeechSynthesizer, Transcriber, TranscriptionParams};
use crate::timing::{CaptionGrouper, Segment, write_report};

// @module: Pipeline orchestration from story idea to captioned video

/// Script file written by the first stage
pub const SCRIPT_FILENAME: &str = "script.txt";

/// Human-readable timestamp report written by the transcription stage
pub const TIMESTAMP_REPORT_FILENAME: &str = "word_timestamps.txt";

/// Number of words shown in the transcription preview
const PREVIEW_WORDS: usize = 5;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Story script generation
    Script,
    /// Text-to-speech
    Audio,
    /// Word timestamp extraction
    Timestamps,
    /// Video composition
    Video,
}

impl Stage {
    /// Every stage in execution order
    pub const ALL: [Stage; 4] = [Stage::Script, Stage::Audio, Stage::Timestamps, Stage::Video];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Script => "Script",
            Self::Audio => "Audio",
            Self::Timestamps => "Timestamps",
            Self::Video => "Video",
        };
        write!(f, "{}", name)
    }
}

/// How a stage ended
#[derive(Debug, Clone, PartialEq)]
pub enum StageStatus {
    /// Not reached yet
    Pending,
    /// Finished successfully
    Succeeded,
    /// Failed with the given reason
    Failed(String),
    /// Not run because an earlier stage failed
    Skipped,
}

impl StageStatus {
    /// True for `Succeeded`
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Outcome of one pipeline run, always produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    stages: Vec<(Stage, StageStatus)>,
    /// Generated script file
    pub script_path: Option<PathBuf>,
    /// Synthesized narration
    pub audio_path: Option<PathBuf>,
    /// Transcript segments
    pub segments: Vec<Segment>,
    /// Final video, when the video stage succeeded
    pub output: Option<PathBuf>,
    /// Composer report, when the video stage succeeded
    pub report: Option<RenderReport>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            stages: Stage::ALL.iter().map(|stage| (*stage, StageStatus::Pending)).collect(),
            script_path: None,
            audio_path: None,
            segments: Vec::new(),
            output: None,
            report: None,
        }
    }
}

impl RunSummary {
    /// Status of one stage
    pub fn status(&self, stage: Stage) -> &StageStatus {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, status)| status)
            .unwrap_or(&StageStatus::Pending)
    }

    /// All stages with their status, in execution order
    pub fn stages(&self) -> &[(Stage, StageStatus)] {
        &self.stages
    }

    /// True when the final video was produced
    pub fn completed(&self) -> bool {
        self.status(Stage::Video).is_success()
    }

    fn set(&mut self, stage: Stage, status: StageStatus) {
        if let Some(entry) = self.stages.iter_mut().find(|(s, _)| *s == stage) {
            entry.1 = status;
        }
    }

    fn succeed(&mut self, stage: Stage) {
        self.set(stage, StageStatus::Succeeded);
    }

    /// Mark `stage` failed and every later stage skipped
    fn fail(mut self, stage: Stage, error: &PipelineError) -> Self {
        error!("{} stage failed: {}", stage, error);
        if let PipelineError::UpstreamService { source, .. } = error {
            debug!("Upstream error detail: {:?}", source);
        }

        self.set(stage, StageStatus::Failed(error.to_string()));
        for later in Stage::ALL.iter().skip_while(|s| **s != stage).skip(1) {
            self.set(*later, StageStatus::Skipped);
        }
        self
    }

    /// Multi-line human-readable summary
    pub fn render(&self) -> String {
        let mut lines = vec!["--- Run Summary ---".to_string()];
        for (stage, status) in &self.stages {
            let text = match status {
                StageStatus::Succeeded => "Yes".to_string(),
                StageStatus::Failed(reason) => format!("No ({})", reason),
                StageStatus::Skipped => "No (skipped)".to_string(),
                StageStatus::Pending => "No (not run)".to_string(),
            };
            lines.push(format!("{} Generated: {}", stage, text));
        }
        if let Some(report) = &self.report {
            lines.push(format!(
                "Captions: {} rendered, {} failed, {}/{} words",
                report.overlays_rendered, report.overlay_failures, report.processed_words, report.total_words
            ));
        }
        if let Some(output) = &self.output {
            lines.push(format!("Output video saved to: {}", output.display()));
        }
        lines.join("\n")
    }
}

/// Main application controller running the story pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Directory receiving script, audio and timestamp files
    work_dir: PathBuf,
    script_generator: Arc<dyn ScriptGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    transcriber: Arc<dyn Transcriber>,
    backend: Arc<dyn MediaBackend>,
}

impl Controller {
    // @method: Create a controller with the production collaborators
    pub fn with_config(config: Config) -> Result<Self> {
        let script_generator = Arc::new(OllamaScriptGenerator::new(&config.script));
        let speech = Arc::new(OpenAISpeech::new(&config.speech));
        let transcriber = Arc::new(WhisperTimestamped::new(&config.transcription));
        let backend = Arc::new(FfmpegBackend::new()?);

        Ok(Self::with_collaborators(config, script_generator, speech, transcriber, backend))
    }

    // @method: Create a controller with injected collaborators
    pub fn with_collaborators(
        config: Config,
        script_generator: Arc<dyn ScriptGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn Transcriber>,
        backend: Arc<dyn MediaBackend>,
    ) -> Self {
        Self {
            config,
            work_dir: PathBuf::from("."),
            script_generator,
            speech,
            transcriber,
            backend,
        }
    }

    /// Write intermediate files into `work_dir` instead of the current directory
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage for `idea`, stopping at the first failure.
    ///
    /// Never fails itself; the returned summary records what happened.
    pub async fn run(&self, idea: &str) -> RunSummary {
        let mut summary = RunSummary::default();

        info!("--- Step 1: Generating Script ---");
        let script = match self.generate_script(idea).await {
            Ok((script, path)) => {
                summary.succeed(Stage::Script);
                summary.script_path = Some(path);
                script
            }
            Err(e) => return summary.fail(Stage::Script, &e),
        };

        info!("--- Step 2: Generating TTS Audio ---");
        let audio_path = match self.generate_audio(&script).await {
            Ok(path) => {
                summary.succeed(Stage::Audio);
                summary.audio_path = Some(path.clone());
                path
            }
            Err(e) => return summary.fail(Stage::Audio, &e),
        };

        info!("--- Step 3: Generating Word Timestamps ---");
        let segments = match self.generate_timestamps(&audio_path).await {
            Ok(segments) => {
                summary.succeed(Stage::Timestamps);
                segments
            }
            Err(e) => return summary.fail(Stage::Timestamps, &e),
        };
        summary.segments = segments;

        info!("--- Step 4: Generating Final Video ---");
        match self.generate_video(&audio_path, &summary.segments).await {
            Ok(report) => {
                summary.succeed(Stage::Video);
                summary.output = Some(report.output.clone());
                summary.report = Some(report);
            }
            Err(e) => return summary.fail(Stage::Video, &e),
        }

        summary
    }

    async fn generate_script(&self, idea: &str) -> Result<(String, PathBuf), PipelineError> {
        info!("Using local LLM provider: {}", self.config.script.provider.display_name());

        let script = self
            .script_generator
            .generate(idea, &self.config.script.model)
            .await
            .map_err(|source| PipelineError::UpstreamService { stage: Stage::Script, source })?;

        let script_path = self.work_dir.join(SCRIPT_FILENAME);
        FileManager::write_to_file(&script_path, &script)
            .map_err(|e| PipelineError::DataAbsent(format!("could not save script: {}", e)))?;
        info!("Script saved to {:?} ({} words)", script_path, script.split_whitespace().count());

        Ok((script, script_path))
    }

    async fn generate_audio(&self, script: &str) -> Result<PathBuf, PipelineError> {
        let audio_path = self.work_dir.join(&self.config.video.audio_filename);
        let params = SpeechParams::from(&self.config.speech);

        self.speech
            .synthesize(script, &params, &audio_path)
            .await
            .map_err(|source| PipelineError::UpstreamService { stage: Stage::Audio, source })?;

        let size = std::fs::metadata(&audio_path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(PipelineError::DataAbsent(format!(
                "speech output missing or empty at {}",
                audio_path.display()
            )));
        }

        info!("Audio saved to {:?}", audio_path);
        Ok(audio_path)
    }

    async fn generate_timestamps(&self, audio_path: &Path) -> Result<Vec<Segment>, PipelineError> {
        let params = TranscriptionParams::from(&self.config.transcription);

        let segments = self
            .transcriber
            .transcribe(audio_path, &params)
            .await
            .map_err(|source| PipelineError::UpstreamService { stage: Stage::Timestamps, source })?;

        match segments.first().filter(|s| !s.words.is_empty()) {
            Some(first) => {
                info!("First few words with timestamps:");
                for word in first.words.iter().take(PREVIEW_WORDS) {
                    info!(
                        "  '{}' - Start: {:.2}s, End: {:.2}s",
                        word.text,
                        word.start.unwrap_or(0.0),
                        word.end.unwrap_or(0.0)
                    );
                }
            }
            None => warn!("No words found in the first segment to display timestamps for."),
        }

        let report_path = self.work_dir.join(TIMESTAMP_REPORT_FILENAME);
        match write_report(&segments, &report_path) {
            Ok(()) => info!("Word timestamps saved to {:?}", report_path),
            Err(e) => warn!("Error saving timestamps to file: {}", e),
        }

        Ok(segments)
    }

    async fn generate_video(&self, audio_path: &Path, segments: &[Segment]) -> Result<RenderReport, PipelineError> {
        let background = FileManager::resolve_background_video(&self.config.video.background_video)
            .map_err(|e| PipelineError::DataAbsent(e.to_string()))?;
        info!("Using background: {:?}", background);

        FileManager::ensure_dir(&self.config.video.output_dir)
            .map_err(|e| PipelineError::DataAbsent(format!("could not create output directory: {}", e)))?;

        let captions = &self.config.captions;
        let composer = VideoComposer::new(
            self.backend.clone(),
            CaptionStyle::from(captions),
            EncodingSettings::from(&self.config.video),
        )
        .with_grouper(CaptionGrouper::new(captions.group_size, captions.min_duration));

        let request = RenderRequest {
            background_video: background,
            audio: audio_path.to_path_buf(),
            segments: segments.to_vec(),
            output: self.config.video.output_path(),
        };

        let report = composer.compose(&request).await?;
        if report.overlay_failures > 0 {
            warn!("Encountered {} errors while rendering captions.", report.overlay_failures);
        }
        Ok(report)
    }
}
