/*!
 * Media handles owned by a single render.
 *
 * `MediaClip` describes a background video or voice audio input together
 * with its trim window; `OverlayClip` is a rendered caption. Every handle
 * opened or derived during a render is registered in a `ResourceList`,
 * which releases them in reverse order once the render is over, whichever
 * way it ended.
 */

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::app_config::CaptionConfig;
use crate::errors::MediaError;
use crate::timing::CaptionUnit;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_handle_id() -> u64 {
    NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Kind of media a clip holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Background footage
    Video,
    /// Voice track
    Audio,
}

/// Handle on a loaded media input, possibly trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct MediaClip {
    id: u64,
    kind: MediaKind,
    path: PathBuf,
    source_duration: f64,
    window_start: f64,
    window_end: f64,
    audio: Option<Box<MediaClip>>,
}

impl MediaClip {
    /// Create a handle covering the whole source
    pub fn open(kind: MediaKind, path: impl Into<PathBuf>, duration: f64) -> Self {
        let duration = duration.max(0.0);
        Self {
            id: next_handle_id(),
            kind,
            path: path.into(),
            source_duration: duration,
            window_start: 0.0,
            window_end: duration,
            audio: None,
        }
    }

    /// Unique handle id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Video or audio
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offset into the source where this clip begins
    pub fn window_start(&self) -> f64 {
        self.window_start
    }

    /// Playable duration in seconds
    pub fn duration(&self) -> f64 {
        self.window_end - self.window_start
    }

    /// True when the clip covers less than its whole source
    pub fn is_trimmed(&self) -> bool {
        self.window_start > 0.0 || self.window_end < self.source_duration
    }

    /// Audio attached to a video clip
    pub fn audio(&self) -> Option<&MediaClip> {
        self.audio.as_deref()
    }

    /// Derive a clip covering `[start, end]` of this one.
    ///
    /// Bounds are clamped to the current window; the result is a new handle.
    pub fn subclip(&self, start: f64, end: f64) -> MediaClip {
        let start = (self.window_start + start.max(0.0)).min(self.window_end);
        let end = (self.window_start + end.max(0.0)).clamp(start, self.window_end);

        MediaClip {
            id: next_handle_id(),
            window_start: start,
            window_end: end,
            ..self.clone()
        }
    }

    /// Derive a video clip carrying `audio` as its soundtrack
    pub fn with_audio(&self, audio: MediaClip) -> MediaClip {
        MediaClip {
            id: next_handle_id(),
            audio: Some(Box::new(audio)),
            ..self.clone()
        }
    }
}

/// Fixed visual style applied to every caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionStyle {
    /// Font family or font name understood by the renderer
    pub font: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Fill color
    pub color: String,
    /// Outline color
    pub stroke_color: String,
    /// Outline width in pixels
    pub stroke_width: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self::from(&CaptionConfig::default())
    }
}

impl From<&CaptionConfig> for CaptionStyle {
    fn from(config: &CaptionConfig) -> Self {
        Self {
            font: config.font.clone(),
            font_size: config.font_size,
            color: config.color.clone(),
            stroke_color: config.stroke_color.clone(),
            stroke_width: config.stroke_width,
        }
    }
}

/// Where an overlay is placed on the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPosition {
    /// Centered in both axes
    Center,
}

/// A caption realized as a timed overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayClip {
    id: u64,
    /// Caption text
    pub text: String,
    /// Visible from this offset in seconds
    pub start: f64,
    /// Visible for this many seconds
    pub duration: f64,
    /// Placement on the frame
    pub position: OverlayPosition,
    /// Visual style
    pub style: CaptionStyle,
    /// Backing file holding the text, owned by the overlay
    pub text_file: Option<PathBuf>,
}

impl OverlayClip {
    /// Create a centered overlay for a caption unit
    pub fn new(unit: &CaptionUnit, style: &CaptionStyle, text_file: Option<PathBuf>) -> Self {
        Self {
            id: next_handle_id(),
            text: unit.text.clone(),
            start: unit.start,
            duration: unit.duration,
            position: OverlayPosition::Center,
            style: style.clone(),
            text_file,
        }
    }

    /// Unique handle id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// End of the visible window
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Anything a render acquires and must release
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// Video or audio handle
    Clip(MediaClip),
    /// Caption overlay
    Overlay(OverlayClip),
}

impl Resource {
    /// Handle id of the underlying resource
    pub fn id(&self) -> u64 {
        match self {
            Self::Clip(clip) => clip.id(),
            Self::Overlay(overlay) => overlay.id(),
        }
    }
}

/// Something that knows how to free a resource
pub trait ResourceReleaser {
    /// Release one resource
    fn release(&self, resource: &Resource) -> Result<(), MediaError>;
}

/// Resources acquired during one render, in acquisition order
#[derive(Debug, Default)]
pub struct ResourceList {
    resources: Vec<Resource>,
}

impl ResourceList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource; a handle already tracked is ignored
    pub fn track(&mut self, resource: Resource) {
        let id = resource.id();
        if self.resources.iter().all(|r| r.id() != id) {
            self.resources.push(resource);
        }
    }

    /// Register a media clip
    pub fn track_clip(&mut self, clip: &MediaClip) {
        self.track(Resource::Clip(clip.clone()));
    }

    /// Register an overlay
    pub fn track_overlay(&mut self, overlay: &OverlayClip) {
        self.track(Resource::Overlay(overlay.clone()));
    }

    /// Number of tracked resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Release everything in reverse acquisition order, emptying the list.
    ///
    /// A failing release is logged and does not stop the others. Returns the
    /// number of failed releases.
    pub fn release_all<R: ResourceReleaser + ?Sized>(&mut self, releaser: &R) -> usize {
        let mut failures = 0;

        while let Some(resource) = self.resources.pop() {
            match releaser.release(&resource) {
                Ok(()) => trace!("Released resource {}", resource.id()),
                Err(e) => {
                    failures += 1;
                    warn!("Error releasing resource {}: {}", resource.id(), e);
                }
            }
        }

        failures
    }
}
