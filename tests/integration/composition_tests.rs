/*!
 * Composer tests against the in-memory media backend
 */

use std::path::PathBuf;
use std::sync::Arc;

use storyreel::errors::PipelineError;
use storyreel::media::mock::MockBackend;
use storyreel::media::{CaptionStyle, EncodingSettings, RenderRequest, VideoComposer};
use storyreel::timing::{normalize, CaptionGrouper, Segment};

use crate::common::{create_temp_dir, create_test_file, sample_transcript_json, segment};

fn request(dir: &std::path::Path, segments: Vec<Segment>) -> anyhow::Result<RenderRequest> {
    Ok(RenderRequest {
        background_video: create_test_file(dir, "bg.mp4", "video")?,
        audio: create_test_file(dir, "voice.mp3", "audio")?,
        segments,
        output: dir.join("final.mp4"),
    })
}

fn composer(backend: &Arc<MockBackend>) -> VideoComposer {
    VideoComposer::new(backend.clone(), CaptionStyle::default(), EncodingSettings::default())
}

#[tokio::test]
async fn test_compose_withTranscript_shouldScheduleOverlaysInOrder() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let backend = Arc::new(MockBackend::new(30.0, 30.0));
    let request = request(temp_dir.path(), normalize(&sample_transcript_json()))?;

    let report = composer(&backend).compose(&request).await?;
    assert_eq!(report.caption_units, 3);
    assert_eq!(report.output, temp_dir.path().join("final.mp4"));

    let calls = backend.calls();
    assert_eq!(calls.rendered, vec!["Hello dark world.", "It was me", "all along."]);
    let starts: Vec<f64> = calls.encoded[0].overlays.iter().map(|o| o.start).collect();
    assert_eq!(starts, vec![0.0, 1.6, 2.5]);
    Ok(())
}

#[tokio::test]
async fn test_compose_withCustomGrouper_shouldUseItsGroupSize() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let backend = Arc::new(MockBackend::new(30.0, 30.0));
    let request = request(temp_dir.path(), normalize(&sample_transcript_json()))?;

    let report = composer(&backend)
        .with_grouper(CaptionGrouper::new(1, 0.0))
        .compose(&request)
        .await?;
    assert_eq!(report.caption_units, 8);
    assert_eq!(report.overlays_rendered, 8);
    Ok(())
}

#[tokio::test]
async fn test_compose_withEveryCaptionFailing_shouldReturnMalformedUnit() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let backend = Arc::new(MockBackend::new(10.0, 10.0).failing_caption("Hi there"));
    let request = request(temp_dir.path(), vec![segment("0", &[("Hi", 0.0, 0.3), ("there", 0.4, 0.8)])])?;

    match composer(&backend).compose(&request).await {
        Err(PipelineError::MalformedUnit { text, .. }) => assert_eq!(text, "Hi there"),
        other => panic!("unexpected result: {:?}", other.map(|r| r.output)),
    }

    let calls = backend.calls();
    assert!(calls.encoded.is_empty());
    // video, audio, base with audio attached
    assert_eq!(calls.released.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_compose_withOpenFailure_shouldReportDataAbsent() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let backend = Arc::new(MockBackend::new(10.0, 10.0).failing_open());
    let request = request(temp_dir.path(), vec![segment("0", &[("Hi", 0.0, 0.3)])])?;

    let result = composer(&backend).compose(&request).await;
    assert!(matches!(result, Err(PipelineError::DataAbsent(_))));
    assert_eq!(backend.calls().opened.len(), 1);
    assert!(backend.calls().released.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_compose_withWordsOnlyPastMediaEnd_shouldReportDataAbsent() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let backend = Arc::new(MockBackend::new(2.0, 2.0));
    let request = request(temp_dir.path(), vec![segment("0", &[("late", 5.0, 5.5)])])?;

    let result = composer(&backend).compose(&request).await;
    assert!(matches!(result, Err(PipelineError::DataAbsent(_))));

    let calls = backend.calls();
    assert!(calls.rendered.is_empty());
    assert_eq!(calls.released.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_compose_withMissingAudio_shouldNameIt() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let backend = Arc::new(MockBackend::new(10.0, 10.0));
    let mut request = request(temp_dir.path(), vec![segment("0", &[("Hi", 0.0, 0.3)])])?;
    request.audio = PathBuf::from("/nonexistent/voice.mp3");

    match composer(&backend).compose(&request).await {
        Err(PipelineError::DataAbsent(msg)) => assert!(msg.contains("voice.mp3")),
        other => panic!("unexpected result: {:?}", other.map(|r| r.output)),
    }
    Ok(())
}

#[test]
fn test_compose_calledTwice_shouldReleaseBothRenders() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let backend = Arc::new(MockBackend::new(12.0, 10.0));
    let request = request(temp_dir.path(), normalize(&sample_transcript_json()))?;
    let composer = composer(&backend);

    let (first, second) = tokio_test::block_on(async {
        let first = composer.compose(&request).await;
        let second = composer.compose(&request).await;
        (first, second)
    });

    assert_eq!(first?.caption_units, second?.caption_units);
    let calls = backend.calls();
    assert_eq!(calls.encoded.len(), 2);
    // video, audio, trimmed video, base and three overlays per render
    assert_eq!(calls.released.len(), 14);
    Ok(())
}
