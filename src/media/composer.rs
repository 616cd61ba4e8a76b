/*!
 * Video composition.
 *
 * Loads the background video and voice audio, reconciles their durations,
 * turns grouped captions into overlays and hands the result to the media
 * backend for encoding. Every handle acquired along the way is tracked in a
 * `ResourceList` and released before `compose` returns.
 */

use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::PipelineError;
use crate::timing::{CaptionGrouper, Segment};

use super::backend::{CompositionPlan, EncodingSettings, MediaBackend};
use super::clip::{CaptionStyle, OverlayClip, ResourceList};
use super::reconcile::{Reconciliation, reconcile};

/// Inputs for one render
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Background footage
    pub background_video: PathBuf,
    /// Voice track
    pub audio: PathBuf,
    /// Transcript with word timings
    pub segments: Vec<Segment>,
    /// Destination file
    pub output: PathBuf,
}

/// What a successful render produced
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Caption units built by the grouper
    pub caption_units: usize,
    /// Overlays that made it into the video
    pub overlays_rendered: usize,
    /// Caption units that could not be rendered
    pub overlay_failures: usize,
    /// Words that ended up in some caption
    pub processed_words: usize,
    /// Raw words in the transcript
    pub total_words: usize,
    /// Length of the output in seconds
    pub effective_duration: f64,
    /// Trim applied to make the inputs line up
    pub reconciliation: Reconciliation,
    /// Written file
    pub output: PathBuf,
}

/// Composes the captioned video through a `MediaBackend`
#[derive(Debug, Clone)]
pub struct VideoComposer {
    backend: Arc<dyn MediaBackend>,
    style: CaptionStyle,
    encoding: EncodingSettings,
    grouper: CaptionGrouper,
}

impl VideoComposer {
    /// Create a composer with the default grouper
    pub fn new(backend: Arc<dyn MediaBackend>, style: CaptionStyle, encoding: EncodingSettings) -> Self {
        Self {
            backend,
            style,
            encoding,
            grouper: CaptionGrouper::default(),
        }
    }

    /// Use a specific grouper
    pub fn with_grouper(mut self, grouper: CaptionGrouper) -> Self {
        self.grouper = grouper;
        self
    }

    /// Render the captioned video described by `request`.
    ///
    /// Resources are released in reverse acquisition order whether the
    /// render succeeds or not.
    pub async fn compose(&self, request: &RenderRequest) -> Result<RenderReport, PipelineError> {
        let mut resources = ResourceList::new();
        let result = self.compose_tracked(request, &mut resources).await;

        let released = resources.len();
        let failures = resources.release_all(self.backend.as_ref());
        debug!("Released {} media resources ({} failures)", released, failures);

        result
    }

    async fn compose_tracked(
        &self,
        request: &RenderRequest,
        resources: &mut ResourceList,
    ) -> Result<RenderReport, PipelineError> {
        let has_usable_words = request
            .segments
            .iter()
            .flat_map(|segment| segment.words.iter())
            .any(|word| word.is_usable());
        if !has_usable_words {
            return Err(PipelineError::DataAbsent(
                "no words with usable timing in the transcript".to_string(),
            ));
        }

        for path in [&request.background_video, &request.audio] {
            if !path.exists() {
                return Err(PipelineError::DataAbsent(format!(
                    "input file not found: {}",
                    path.display()
                )));
            }
        }

        info!("Loading background video: {:?}", request.background_video);
        let video = self.backend.open_video(&request.background_video).await?;
        resources.track_clip(&video);

        info!("Loading audio: {:?}", request.audio);
        let audio = self.backend.open_audio(&request.audio).await?;
        resources.track_clip(&audio);

        let reconciled = reconcile(&video, &audio);
        resources.track_clip(&reconciled.video);
        resources.track_clip(&reconciled.audio);

        let base = reconciled.video.with_audio(reconciled.audio.clone());
        resources.track_clip(&base);

        let effective_duration = reconciled.effective_duration;
        let grouping = self.grouper.group(&request.segments, effective_duration);
        if grouping.is_empty() {
            return Err(PipelineError::DataAbsent(format!(
                "no caption could be built within {:.2}s of media",
                effective_duration
            )));
        }

        info!("Rendering {} caption overlays...", grouping.units.len());
        let mut overlays: Vec<OverlayClip> = Vec::with_capacity(grouping.units.len());
        let mut first_failure: Option<PipelineError> = None;
        let mut overlay_failures = 0;

        for unit in &grouping.units {
            match self.backend.render_caption(unit, &self.style).await {
                Ok(overlay) => {
                    resources.track_overlay(&overlay);
                    overlays.push(overlay);
                }
                Err(e) => {
                    overlay_failures += 1;
                    let failure = PipelineError::MalformedUnit {
                        text: unit.text.clone(),
                        reason: e.to_string(),
                    };
                    warn!("Skipping caption: {}", failure);
                    first_failure.get_or_insert(failure);
                }
            }
        }

        if overlays.is_empty() {
            return Err(first_failure.unwrap_or_else(|| {
                PipelineError::DataAbsent("no caption overlay was rendered".to_string())
            }));
        }

        let overlays_rendered = overlays.len();
        let plan = CompositionPlan {
            base,
            overlays,
            duration: effective_duration,
        };

        info!("Writing final video to: {:?}", request.output);
        self.backend
            .encode(&plan, &request.output, &self.encoding)
            .await
            .map_err(|e| PipelineError::Encoding(e.to_string()))?;

        Ok(RenderReport {
            caption_units: grouping.units.len(),
            overlays_rendered,
            overlay_failures,
            processed_words: grouping.processed_words,
            total_words: grouping.total_words,
            effective_duration,
            reconciliation: reconciled.outcome,
            output: request.output.clone(),
        })
    }
}
