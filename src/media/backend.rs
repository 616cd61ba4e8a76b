/*!
 * Media backend interface.
 *
 * The composer never touches media files directly; it goes through a
 * `MediaBackend`, which loads inputs, renders caption overlays, encodes the
 * final composition and frees whatever it handed out. `FfmpegBackend` is the
 * production implementation, `mock::MockBackend` the test one.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

use crate::app_config::VideoConfig;
use crate::errors::MediaError;
use crate::timing::CaptionUnit;

use super::clip::{CaptionStyle, MediaClip, OverlayClip, ResourceReleaser};

/// Output codec and encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// Video codec (H.264 by default)
    pub video_codec: String,
    /// Audio codec (AAC by default)
    pub audio_codec: String,
    /// Encoder speed/quality preset
    pub preset: String,
    /// Encoder worker threads
    pub threads: usize,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self::from(&VideoConfig::default())
    }
}

impl From<&VideoConfig> for EncodingSettings {
    fn from(config: &VideoConfig) -> Self {
        Self {
            video_codec: config.video_codec.clone(),
            audio_codec: config.audio_codec.clone(),
            preset: config.preset.clone(),
            threads: config.threads.max(1),
        }
    }
}

/// Everything needed to encode the final video
#[derive(Debug, Clone)]
pub struct CompositionPlan {
    /// Background clip with the voice track attached
    pub base: MediaClip,
    /// Caption overlays; later entries are drawn over earlier ones
    pub overlays: Vec<OverlayClip>,
    /// Output length in seconds
    pub duration: f64,
}

/// Loads, renders and encodes media for the composer
#[async_trait]
pub trait MediaBackend: ResourceReleaser + Send + Sync + Debug {
    /// Open the background video
    async fn open_video(&self, path: &Path) -> Result<MediaClip, MediaError>;

    /// Open the voice audio
    async fn open_audio(&self, path: &Path) -> Result<MediaClip, MediaError>;

    /// Realize one caption as a centered overlay
    async fn render_caption(&self, unit: &CaptionUnit, style: &CaptionStyle) -> Result<OverlayClip, MediaError>;

    /// Composite and encode the plan to `output`
    async fn encode(&self, plan: &CompositionPlan, output: &Path, settings: &EncodingSettings) -> Result<(), MediaError>;
}
