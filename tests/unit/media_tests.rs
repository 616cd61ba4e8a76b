/*!
 * Tests for media clips, duration reconciliation and ffmpeg command building
 */

use std::path::{Path, PathBuf};

use storyreel::app_config::{CaptionConfig, VideoConfig};
use storyreel::media::ffmpeg::{build_encode_args, build_filter_graph, filter_ffmpeg_stderr};
use storyreel::media::{
    CaptionStyle, CompositionPlan, EncodingSettings, MediaClip, MediaKind, OverlayClip, Reconciliation, reconcile,
};
use storyreel::timing::CaptionUnit;

fn unit(text: &str, start: f64, duration: f64) -> CaptionUnit {
    CaptionUnit { text: text.to_string(), start, duration }
}

fn plan(video_duration: f64, audio_duration: f64) -> CompositionPlan {
    let video = MediaClip::open(MediaKind::Video, "/media/bg.mp4", video_duration);
    let audio = MediaClip::open(MediaKind::Audio, "/media/voice.mp3", audio_duration);
    let reconciled = reconcile(&video, &audio);
    let style = CaptionStyle::default();

    CompositionPlan {
        base: reconciled.video.with_audio(reconciled.audio),
        overlays: vec![
            OverlayClip::new(&unit("I sold my", 0.0, 0.9), &style, Some(PathBuf::from("/tmp/caption_a.txt"))),
            OverlayClip::new(&unit("brother's car.", 1.0, 0.9), &style, Some(PathBuf::from("/tmp/caption_b.txt"))),
        ],
        duration: reconciled.effective_duration,
    }
}

fn arg_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
        .collect()
}

#[test]
fn test_reconcile_withShorterVideo_shouldEndWithVideo() {
    let video = MediaClip::open(MediaKind::Video, "bg.mp4", 10.0);
    let audio = MediaClip::open(MediaKind::Audio, "voice.mp3", 12.0);

    let reconciled = reconcile(&video, &audio);
    assert_eq!(reconciled.effective_duration, 10.0);
    assert_eq!(reconciled.video.duration(), 10.0);
    assert_eq!(reconciled.audio.duration(), 10.0);
    assert!(reconciled.audio.is_trimmed());
}

#[test]
fn test_reconcile_withinTolerance_shouldTreatAsMatched() {
    let video = MediaClip::open(MediaKind::Video, "bg.mp4", 30.0005);
    let audio = MediaClip::open(MediaKind::Audio, "voice.mp3", 30.0);

    let reconciled = reconcile(&video, &audio);
    assert_eq!(reconciled.outcome, Reconciliation::Matched);
    assert_eq!(reconciled.effective_duration, 30.0);
}

#[test]
fn test_caption_style_fromConfig_shouldCopyEveryField() {
    let config = CaptionConfig {
        font: "Arial".to_string(),
        font_size: 48,
        color: "yellow".to_string(),
        stroke_color: "navy".to_string(),
        stroke_width: 3.0,
        ..CaptionConfig::default()
    };

    let style = CaptionStyle::from(&config);
    assert_eq!(style.font, "Arial");
    assert_eq!(style.font_size, 48);
    assert_eq!(style.color, "yellow");
    assert_eq!(style.stroke_color, "navy");
    assert_eq!(style.stroke_width, 3.0);
}

#[test]
fn test_encoding_settings_withZeroThreads_shouldUseOne() {
    let config = VideoConfig { threads: 0, ..VideoConfig::default() };
    assert_eq!(EncodingSettings::from(&config).threads, 1);
}

#[test]
fn test_build_encode_args_withVideoTrimmed_shouldCutVideoInput() {
    let args = build_encode_args(&plan(60.0, 12.5), Path::new("/out/final.mp4"), &EncodingSettings::default());

    assert_eq!(arg_after(&args, "-i"), vec!["/media/bg.mp4", "/media/voice.mp3"]);
    assert_eq!(arg_after(&args, "-t"), vec!["12.500", "12.500", "12.500"]);
    assert_eq!(arg_after(&args, "-map"), vec!["[vout]", "1:a:0"]);
    assert_eq!(arg_after(&args, "-c:v"), vec!["libx264"]);
    assert_eq!(arg_after(&args, "-c:a"), vec!["aac"]);
    assert_eq!(arg_after(&args, "-threads"), vec!["4"]);
    assert_eq!(args.last().map(String::as_str), Some("/out/final.mp4"));
}

#[test]
fn test_build_encode_args_withAudioTrimmed_shouldLimitOutputToVideo() {
    let args = build_encode_args(&plan(10.0, 12.0), Path::new("out.mp4"), &EncodingSettings::default());

    assert_eq!(arg_after(&args, "-t"), vec!["10.000", "10.000", "10.000"]);
    assert!(args.iter().any(|a| a == "-shortest"));
}

#[test]
fn test_build_encode_args_withoutAudio_shouldDisableAudioStream() {
    let mut plan = plan(10.0, 10.0);
    plan.base = MediaClip::open(MediaKind::Video, "/media/bg.mp4", 10.0);

    let args = build_encode_args(&plan, Path::new("out.mp4"), &EncodingSettings::default());
    assert_eq!(arg_after(&args, "-i"), vec!["/media/bg.mp4"]);
    assert_eq!(arg_after(&args, "-map"), vec!["[vout]"]);
    assert!(args.iter().any(|a| a == "-an"));
}

#[test]
fn test_build_filter_graph_withNoOverlays_shouldPassVideoThrough() {
    assert_eq!(build_filter_graph(&[]), "[0:v]null[vout]");
}

#[test]
fn test_filter_ffmpeg_stderr_shouldDropBannerNoise() {
    let stderr = "ffmpeg version 6.1 Copyright (c) 2000-2023\n  built with gcc 13\n  configuration: --enable-gpl\n  libavutil      58. 29.100\nInput #0, mov,mp4, from 'bg.mp4':\n  Duration: 00:01:00.00\n[Parsed_drawtext_0 @ 0x1] Cannot find a valid font for the family Impact\nError initializing filters\n";

    let filtered = filter_ffmpeg_stderr(stderr);
    assert_eq!(
        filtered,
        "[Parsed_drawtext_0 @ 0x1] Cannot find a valid font for the family Impact\nError initializing filters"
    );
}

#[test]
fn test_filter_ffmpeg_stderr_withOnlyNoise_shouldExplain() {
    let filtered = filter_ffmpeg_stderr("ffmpeg version 6.1\n\n");
    assert!(filtered.contains("unknown ffmpeg error"));
}
