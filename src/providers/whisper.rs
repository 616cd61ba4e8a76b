/*!
 * Word-level transcription through the `whisper_timestamped` command-line tool.
 *
 * The tool writes its result as JSON into an output directory; the result is
 * copied next to the audio as `<stem>_timestamps.json` and normalized into
 * segments.
 */

use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use walkdir::WalkDir;

use crate::app_config::TranscriptionConfig;
use crate::errors::ProviderError;
use crate::file_utils::FileManager;
use crate::language_utils::get_language_name;
use crate::timing::{Segment, normalize, total_words};

use super::{Transcriber, TranscriptionParams};

/// Transcriber running the whisper_timestamped CLI
#[derive(Debug, Clone)]
pub struct WhisperTimestamped {
    command: String,
}

impl WhisperTimestamped {
    /// Create a transcriber from the transcription configuration
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }

    /// Command-line arguments for one run
    pub fn build_args(audio_path: &Path, params: &TranscriptionParams, output_dir: &Path) -> Vec<String> {
        vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            params.model_size.clone(),
            "--device".to_string(),
            params.device.clone(),
            "--language".to_string(),
            params.language.clone(),
            "--beam_size".to_string(),
            params.beam_size.to_string(),
            "--best_of".to_string(),
            params.best_of.to_string(),
            "--vad".to_string(),
            "False".to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
        ]
    }
}

/// Human-readable decoding language, e.g. `English (en)`
fn describe_language(code: &str) -> String {
    match get_language_name(code) {
        Ok(name) => format!("{} ({})", name, code),
        Err(_) => code.to_string(),
    }
}

/// Locate the JSON result written by the tool, preferring the words file
fn find_result_file(output_dir: &Path) -> Option<PathBuf> {
    let mut json_files: Vec<PathBuf> = WalkDir::new(output_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    json_files.sort();

    let words_file = json_files
        .iter()
        .position(|path| path.to_string_lossy().ends_with(".words.json"));
    match words_file {
        Some(index) => Some(json_files.swap_remove(index)),
        None => json_files.into_iter().next(),
    }
}

#[async_trait]
impl Transcriber for WhisperTimestamped {
    async fn transcribe(&self, audio_path: &Path, params: &TranscriptionParams) -> Result<Vec<Segment>, ProviderError> {
        if !FileManager::file_exists(audio_path) {
            return Err(ProviderError::InvalidInput(format!("Audio file not found at {:?}", audio_path)));
        }

        let output_dir = tempfile::Builder::new()
            .prefix("storyreel-whisper-")
            .tempdir()
            .map_err(|e| ProviderError::ToolFailed(format!("failed to create output directory: {}", e)))?;

        info!(
            "Loading Whisper model '{}' on device '{}' (this may take time)...",
            params.model_size, params.device
        );
        info!("Transcribing {}", describe_language(&params.language));
        let args = Self::build_args(audio_path, params, output_dir.path());
        debug!("{} {}", self.command, args.join(" "));

        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .await
            .map_err(|e| ProviderError::ToolFailed(format!("failed to execute {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let last_lines = &lines[lines.len().saturating_sub(10)..];
            error!("{} exited with {:?}", self.command, output.status.code());
            if stderr.to_lowercase().contains("ffmpeg") {
                warn!("Hint: Make sure ffmpeg is installed and accessible in your system's PATH.");
            }
            return Err(ProviderError::ToolFailed(last_lines.join("\n")));
        }

        let result_file = find_result_file(output_dir.path()).ok_or_else(|| {
            ProviderError::ToolFailed(format!("{} produced no JSON result", self.command))
        })?;

        let raw_text = tokio::fs::read_to_string(&result_file)
            .await
            .map_err(|e| ProviderError::ToolFailed(format!("failed to read {:?}: {}", result_file, e)))?;
        let raw: serde_json::Value = serde_json::from_str(&raw_text)
            .map_err(|e| ProviderError::ParseError(format!("invalid transcription JSON: {}", e)))?;

        let saved_path = FileManager::timestamps_json_path(audio_path);
        tokio::fs::write(&saved_path, raw_text.as_bytes())
            .await
            .map_err(|e| ProviderError::ToolFailed(format!("failed to save {:?}: {}", saved_path, e)))?;
        info!("Raw timestamp data saved to: {:?}", saved_path);

        let segments = normalize(&raw);
        info!(
            "Transcription complete: {} segments, {} words",
            segments.len(),
            total_words(&segments)
        );
        Ok(segments)
    }
}
