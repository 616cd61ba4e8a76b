/*!
 * Tests for transcript normalization and the timestamp report
 */

use serde_json::json;
use storyreel::timing::{normalize, total_words, write_report, CaptionGrouper};

use crate::common::{create_temp_dir, sample_transcript_json};

#[test]
fn test_normalize_withTranscriberResult_shouldKeepSegmentOrder() {
    let segments = normalize(&sample_transcript_json());

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].id, "0");
    assert_eq!(segments[1].id, "1");
    assert_eq!(segments[1].text, "It was me all along.");
    assert_eq!(segments[1].words[4].text, "along.");
    assert_eq!(total_words(&segments), 8);
}

#[test]
fn test_normalize_withBareSegmentArray_shouldMatchFullResult() {
    let full = sample_transcript_json();
    let bare = full["segments"].clone();

    assert_eq!(normalize(&full), normalize(&bare));
}

#[test]
fn test_normalize_withStringIds_shouldKeepThem() {
    let raw = json!([{"id": "intro", "words": [{"text": "Hi", "start": 0.0, "end": 0.2}]}]);

    let segments = normalize(&raw);
    assert_eq!(segments[0].id, "intro");
}

#[test]
fn test_normalize_thenGroup_shouldCaptionWholeTranscript() {
    let segments = normalize(&sample_transcript_json());

    let outcome = CaptionGrouper::default().group(&segments, 60.0);
    let texts: Vec<&str> = outcome.units.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello dark world.", "It was me", "all along."]);
    assert_eq!(outcome.processed_words, 8);
}

#[test]
fn test_write_report_shouldCreateParentDirectories() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("reports/word_timestamps.txt");
    let segments = normalize(&sample_transcript_json());

    write_report(&segments, &path)?;

    let content = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "Segment 0 [0.00s - 1.30s]: Hello dark world.");
    assert_eq!(lines[1], "  'Hello' [0.00s - 0.40s]");
    assert_eq!(lines[4], "Segment 1 [1.60s - 3.20s]: It was me all along.");
    Ok(())
}
