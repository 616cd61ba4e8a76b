/*!
 * ffmpeg/ffprobe media backend.
 *
 * Inputs are probed with ffprobe, captions become `drawtext` filters reading
 * their text from per-overlay files, and the whole composition is encoded in
 * a single ffmpeg invocation.
 */

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, trace};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::errors::MediaError;
use crate::timing::CaptionUnit;

use super::backend::{CompositionPlan, EncodingSettings, MediaBackend};
use super::clip::{CaptionStyle, MediaClip, MediaKind, OverlayClip, Resource, ResourceReleaser};

/// ffprobe gets this long before the probe is abandoned
const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Production backend driving the ffmpeg command-line tools
#[derive(Debug)]
pub struct FfmpegBackend {
    ffmpeg: String,
    ffprobe: String,
    work_dir: TempDir,
    show_progress: bool,
}

impl FfmpegBackend {
    /// Create a backend using `ffmpeg`/`ffprobe` from PATH
    pub fn new() -> Result<Self, MediaError> {
        Self::with_binaries("ffmpeg", "ffprobe")
    }

    /// Create a backend using specific tool binaries
    pub fn with_binaries(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Result<Self, MediaError> {
        let work_dir = tempfile::Builder::new().prefix("storyreel-").tempdir()?;
        Ok(Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            work_dir,
            show_progress: true,
        })
    }

    /// Enable or disable the encode progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Directory holding overlay text files
    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    async fn open(&self, kind: MediaKind, path: &Path) -> Result<MediaClip, MediaError> {
        if !path.exists() {
            return Err(MediaError::Probe {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }

        let duration = self.probe_duration(path).await?;
        debug!("Loaded {:?} clip {:?} ({:.2}s)", kind, path, duration);
        Ok(MediaClip::open(kind, path, duration))
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaError> {
        let probe_error = |reason: String| MediaError::Probe {
            path: path.display().to_string(),
            reason,
        };

        let ffprobe_future = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .output();

        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| probe_error(format!("failed to execute ffprobe: {}", e)))?
            },
            _ = tokio::time::sleep(PROBE_TIMEOUT) => {
                return Err(probe_error("ffprobe timed out after 60 seconds".to_string()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(probe_error(filter_ffmpeg_stderr(&stderr)));
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| probe_error("no usable duration reported".to_string()))
    }

    fn progress_bar(&self, duration: f64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new((duration * 1000.0).round().max(1.0) as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] encoding ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        bar
    }
}

impl ResourceReleaser for FfmpegBackend {
    fn release(&self, resource: &Resource) -> Result<(), MediaError> {
        match resource {
            Resource::Overlay(overlay) => {
                if let Some(path) = &overlay.text_file {
                    match std::fs::remove_file(path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                Ok(())
            }
            Resource::Clip(clip) => {
                trace!("Closing {:?} clip {:?}", clip.kind(), clip.path());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn open_video(&self, path: &Path) -> Result<MediaClip, MediaError> {
        self.open(MediaKind::Video, path).await
    }

    async fn open_audio(&self, path: &Path) -> Result<MediaClip, MediaError> {
        self.open(MediaKind::Audio, path).await
    }

    async fn render_caption(&self, unit: &CaptionUnit, style: &CaptionStyle) -> Result<OverlayClip, MediaError> {
        validate_caption_text(&unit.text)?;

        let text_file = self.work_dir.path().join(format!("caption_{}.txt", uuid::Uuid::new_v4()));
        tokio::fs::write(&text_file, unit.text.as_bytes()).await?;

        Ok(OverlayClip::new(unit, style, Some(text_file)))
    }

    async fn encode(&self, plan: &CompositionPlan, output: &Path, settings: &EncodingSettings) -> Result<(), MediaError> {
        let args = build_encode_args(plan, output, settings);
        debug!("ffmpeg {}", args.join(" "));

        let mut child = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MediaError::Encode(format!("failed to start ffmpeg: {}", e)))?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut log = String::new();
                let _ = stderr.read_to_string(&mut log).await;
                log
            })
        });

        let bar = self.progress_bar(plan.duration);
        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(seconds) = parse_progress_line(&line) {
                    bar.set_position((seconds * 1000.0) as u64);
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| MediaError::Encode(format!("ffmpeg did not finish: {}", e)))?;
        bar.finish_and_clear();

        let stderr_log = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            let filtered = filter_ffmpeg_stderr(&stderr_log);
            error!("ffmpeg exited with {:?}: {}", status.code(), filtered);
            return Err(MediaError::Encode(filtered));
        }

        info!("Final video written to {:?}", output);
        Ok(())
    }
}

/// Reject caption text the renderer cannot draw
fn validate_caption_text(text: &str) -> Result<(), MediaError> {
    if text.trim().is_empty() {
        return Err(MediaError::Render("caption text is empty".to_string()));
    }
    if let Some(c) = text.chars().find(|c| c.is_control()) {
        return Err(MediaError::Render(format!(
            "unsupported character U+{:04X} in caption",
            c as u32
        )));
    }
    Ok(())
}

/// Parse ffprobe's bare duration output
fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Read the encoded position from an `-progress` line, in seconds
fn parse_progress_line(line: &str) -> Option<f64> {
    let value = line.strip_prefix("out_time_us=")?;
    value.trim().parse::<u64>().ok().map(|us| us as f64 / 1_000_000.0)
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape a value for use as a filter option inside `-filter_complex`.
///
/// The filtergraph parser strips one level of escaping before the filter
/// parses its own options, so the value is escaped for both.
pub fn escape_filter_value(value: &str) -> String {
    let option_level = escape_chars(value, &['\\', ':', '\'']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

/// Build the `drawtext` filter for one overlay
pub fn drawtext_filter(overlay: &OverlayClip) -> String {
    let style = &overlay.style;
    let source = match &overlay.text_file {
        Some(path) => format!("textfile={}", escape_filter_value(&path.to_string_lossy())),
        None => format!("text={}", escape_filter_value(&overlay.text)),
    };

    format!(
        "drawtext={}:expansion=none:font={}:fontsize={}:fontcolor={}:bordercolor={}:borderw={}:x=(w-text_w)/2:y=(h-text_h)/2:enable='between(t,{:.3},{:.3})'",
        source,
        escape_filter_value(&style.font),
        style.font_size,
        escape_filter_value(&style.color),
        escape_filter_value(&style.stroke_color),
        style.stroke_width.max(0.0).ceil() as u32,
        overlay.start,
        overlay.end(),
    )
}

/// Chain every overlay onto the background stream, later overlays on top
pub fn build_filter_graph(overlays: &[OverlayClip]) -> String {
    if overlays.is_empty() {
        return "[0:v]null[vout]".to_string();
    }

    let mut chain = Vec::with_capacity(overlays.len());
    let mut input = "[0:v]".to_string();
    for (i, overlay) in overlays.iter().enumerate() {
        let label = if i + 1 == overlays.len() {
            "[vout]".to_string()
        } else {
            format!("[c{}]", i)
        };
        chain.push(format!("{}{}{}", input, drawtext_filter(overlay), label));
        input = label;
    }

    chain.join(";")
}

fn push_input(args: &mut Vec<String>, clip: &MediaClip) {
    args.extend([
        "-ss".to_string(),
        format!("{:.3}", clip.window_start()),
        "-t".to_string(),
        format!("{:.3}", clip.duration()),
        "-i".to_string(),
        clip.path().to_string_lossy().to_string(),
    ]);
}

/// Assemble the ffmpeg command line for a composition plan
pub fn build_encode_args(plan: &CompositionPlan, output: &Path, settings: &EncodingSettings) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".to_string(), "-nostats".to_string()];

    push_input(&mut args, &plan.base);
    if let Some(audio) = plan.base.audio() {
        push_input(&mut args, audio);
    }

    args.push("-filter_complex".to_string());
    args.push(build_filter_graph(&plan.overlays));
    args.extend(["-map".to_string(), "[vout]".to_string()]);

    if plan.base.audio().is_some() {
        args.extend(["-map".to_string(), "1:a:0".to_string()]);
    } else {
        args.push("-an".to_string());
    }

    args.extend([
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        settings.audio_codec.clone(),
        "-threads".to_string(),
        settings.threads.to_string(),
        "-t".to_string(),
        format!("{:.3}", plan.duration),
        "-shortest".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
    ]);

    args.push(output.to_string_lossy().to_string());
    args
}

/// Strip the version banner, build configuration and stream metadata noise
/// from ffmpeg stderr, keeping the lines that explain a failure.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
