use anyhow::{Result, Context, anyhow};
use log::debug;
use rand::seq::IndexedRandom;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions accepted as background footage
const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "mkv", "mov", "webm", "avi", "m4v", "mpg", "mpeg"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @returns: `<audio stem>_timestamps.json` next to the audio file
    pub fn timestamps_json_path<P: AsRef<Path>>(audio_path: P) -> PathBuf {
        let audio_path = audio_path.as_ref();
        let stem = audio_path.file_stem().unwrap_or_default().to_string_lossy();
        audio_path.with_file_name(format!("{}_timestamps.json", stem))
    }

    /// True when the extension names a video container
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                VIDEO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Find video files under a directory, sorted by path
    pub fn find_videos<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && Self::is_video_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Resolve the configured background to a concrete video file.
    ///
    /// A file path is returned as is when it exists; a directory yields one
    /// of its videos picked at random.
    pub fn resolve_background_video<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        let path = path.as_ref();

        if Self::file_exists(path) {
            return Ok(path.to_path_buf());
        }

        if Self::dir_exists(path) {
            let videos = Self::find_videos(path)?;
            let chosen = videos
                .choose(&mut rand::rng())
                .ok_or_else(|| anyhow!("No video files found in background directory {:?}", path))?;
            debug!("Picked background video {:?} out of {}", chosen, videos.len());
            return Ok(chosen.clone());
        }

        Err(anyhow!("Background video not found at {:?}", path))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
