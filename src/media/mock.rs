/*!
 * In-memory media backend for tests.
 *
 * Never touches the filesystem. Durations are configured up front and every
 * call is recorded so tests can assert on what the composer did.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::MediaError;
use crate::timing::CaptionUnit;

use super::backend::{CompositionPlan, EncodingSettings, MediaBackend};
use super::clip::{CaptionStyle, MediaClip, MediaKind, OverlayClip, Resource, ResourceReleaser};

/// Calls observed by a `MockBackend`
#[derive(Debug, Default, Clone)]
pub struct MockCalls {
    /// Paths opened, in order
    pub opened: Vec<PathBuf>,
    /// Caption texts handed to the renderer
    pub rendered: Vec<String>,
    /// Ids of released resources, in release order
    pub released: Vec<u64>,
    /// Plans passed to encode
    pub encoded: Vec<CompositionPlan>,
}

/// Configurable fake backend
#[derive(Debug)]
pub struct MockBackend {
    video_duration: f64,
    audio_duration: f64,
    failing_captions: HashSet<String>,
    fail_open: bool,
    fail_encode: bool,
    calls: Mutex<MockCalls>,
}

impl MockBackend {
    /// Backend reporting the given input durations
    pub fn new(video_duration: f64, audio_duration: f64) -> Self {
        Self {
            video_duration,
            audio_duration,
            failing_captions: HashSet::new(),
            fail_open: false,
            fail_encode: false,
            calls: Mutex::new(MockCalls::default()),
        }
    }

    /// Make rendering fail for a caption with exactly this text
    pub fn failing_caption(mut self, text: impl Into<String>) -> Self {
        self.failing_captions.insert(text.into());
        self
    }

    /// Make every open fail
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make encoding fail
    pub fn failing_encode(mut self) -> Self {
        self.fail_encode = true;
        self
    }

    /// Snapshot of the recorded calls
    pub fn calls(&self) -> MockCalls {
        self.calls.lock().clone()
    }

    fn open(&self, kind: MediaKind, path: &Path, duration: f64) -> Result<MediaClip, MediaError> {
        self.calls.lock().opened.push(path.to_path_buf());
        if self.fail_open {
            return Err(MediaError::Probe {
                path: path.display().to_string(),
                reason: "mock open failure".to_string(),
            });
        }
        Ok(MediaClip::open(kind, path, duration))
    }
}

impl ResourceReleaser for MockBackend {
    fn release(&self, resource: &Resource) -> Result<(), MediaError> {
        self.calls.lock().released.push(resource.id());
        Ok(())
    }
}

#[async_trait]
impl MediaBackend for MockBackend {
    async fn open_video(&self, path: &Path) -> Result<MediaClip, MediaError> {
        self.open(MediaKind::Video, path, self.video_duration)
    }

    async fn open_audio(&self, path: &Path) -> Result<MediaClip, MediaError> {
        self.open(MediaKind::Audio, path, self.audio_duration)
    }

    async fn render_caption(&self, unit: &CaptionUnit, style: &CaptionStyle) -> Result<OverlayClip, MediaError> {
        self.calls.lock().rendered.push(unit.text.clone());
        if self.failing_captions.contains(&unit.text) {
            return Err(MediaError::Render(format!("mock render failure for '{}'", unit.text)));
        }
        Ok(OverlayClip::new(unit, style, None))
    }

    async fn encode(&self, plan: &CompositionPlan, _output: &Path, _settings: &EncodingSettings) -> Result<(), MediaError> {
        self.calls.lock().encoded.push(plan.clone());
        if self.fail_encode {
            return Err(MediaError::Encode("mock encode failure".to_string()));
        }
        Ok(())
    }
}
