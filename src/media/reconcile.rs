use log::{info, warn};

use super::clip::MediaClip;

// @module: Video/audio duration reconciliation

/// Durations closer than this are treated as equal
const DURATION_TOLERANCE: f64 = 1e-3;

/// What the reconciler had to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconciliation {
    /// Background was longer and got cut to the narration
    VideoTrimmed {
        /// Original video duration
        from: f64,
        /// New video duration
        to: f64,
    },
    /// Background was shorter; narration got cut and the video ends early
    AudioTrimmed {
        /// Original audio duration
        from: f64,
        /// New audio duration
        to: f64,
    },
    /// Durations already matched
    Matched,
}

/// Video and audio clips sharing one duration
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Video clip to composite
    pub video: MediaClip,
    /// Audio clip to attach
    pub audio: MediaClip,
    /// Hard ceiling for caption timing and encoding
    pub effective_duration: f64,
    /// Which trim was applied
    pub outcome: Reconciliation,
}

/// Align video and audio durations before compositing.
///
/// A longer video is trimmed to the audio. A shorter video cuts the audio
/// instead, and the output ends before the narration does.
pub fn reconcile(video: &MediaClip, audio: &MediaClip) -> Reconciled {
    let video_duration = video.duration();
    let audio_duration = audio.duration();
    info!("Audio duration: {:.2}s", audio_duration);

    if (video_duration - audio_duration).abs() <= DURATION_TOLERANCE {
        return Reconciled {
            video: video.clone(),
            audio: audio.clone(),
            effective_duration: audio_duration.min(video_duration),
            outcome: Reconciliation::Matched,
        };
    }

    if video_duration > audio_duration {
        info!("Trimming video from {:.2}s to {:.2}s", video_duration, audio_duration);
        Reconciled {
            video: video.subclip(0.0, audio_duration),
            audio: audio.clone(),
            effective_duration: audio_duration,
            outcome: Reconciliation::VideoTrimmed {
                from: video_duration,
                to: audio_duration,
            },
        }
    } else {
        warn!(
            "Background video ({:.2}s) is shorter than audio ({:.2}s). Video will end early.",
            video_duration, audio_duration
        );
        Reconciled {
            video: video.clone(),
            audio: audio.subclip(0.0, video_duration),
            effective_duration: video_duration,
            outcome: Reconciliation::AudioTrimmed {
                from: audio_duration,
                to: video_duration,
            },
        }
    }
}
