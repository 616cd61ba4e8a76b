/*!
 * Media handling: clips and overlays, duration reconciliation, the backend
 * interface with its ffmpeg and mock implementations, and the composer that
 * ties them together.
 */

pub mod backend;
pub mod clip;
pub mod composer;
pub mod ffmpeg;
pub mod mock;
pub mod reconcile;

pub use self::backend::{CompositionPlan, EncodingSettings, MediaBackend};
pub use self::clip::{CaptionStyle, MediaClip, MediaKind, OverlayClip, Resource, ResourceList, ResourceReleaser};
pub use self::composer::{RenderReport, RenderRequest, VideoComposer};
pub use self::ffmpeg::FfmpegBackend;
pub use self::reconcile::{Reconciled, Reconciliation, reconcile};
