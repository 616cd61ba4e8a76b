/*!
 * Tests for caption grouping
 */

use serde_json::json;
use storyreel::timing::{CaptionGrouper, Segment, TimedWord, normalize};

use crate::common::segment;

/// Every unit must stay inside the media window
fn assert_within_window(grouper: &CaptionGrouper, segments: &[Segment], effective_duration: f64) {
    for unit in grouper.group(segments, effective_duration).units {
        assert!(unit.start >= 0.0, "negative start in {:?}", unit);
        assert!(
            unit.start + unit.duration <= effective_duration + 1e-9,
            "{:?} runs past {}",
            unit,
            effective_duration
        );
    }
}

#[test]
fn test_group_withThreeWords_shouldEmitSingleUnit() {
    let segments = vec![segment("0", &[("Hello", 0.0, 0.4), ("dark", 0.5, 0.9), ("world", 1.0, 1.3)])];

    let outcome = CaptionGrouper::new(3, 0.5).group(&segments, 10.0);
    assert_eq!(outcome.units.len(), 1);
    assert_eq!(outcome.units[0].text, "Hello dark world");
    assert_eq!(outcome.units[0].start, 0.0);
    assert!((outcome.units[0].duration - 1.3).abs() < 1e-9);
    assert_eq!(outcome.processed_words, 3);
    assert_eq!(outcome.total_words, 3);
}

#[test]
fn test_group_withWordPastMediaEnd_shouldDiscardIt() {
    let segments = vec![segment("0", &[("early", 9.0, 9.5), ("late", 11.0, 11.4)])];

    let outcome = CaptionGrouper::default().group(&segments, 10.0);
    assert_eq!(outcome.units.len(), 1);
    assert_eq!(outcome.units[0].text, "early");
    assert_eq!(outcome.processed_words, 1);
    assert_eq!(outcome.total_words, 2);
}

#[test]
fn test_group_withWordStartingExactlyAtEnd_shouldDiscardIt() {
    let segments = vec![segment("0", &[("edge", 10.0, 10.2)])];

    let outcome = CaptionGrouper::default().group(&segments, 10.0);
    assert!(outcome.is_empty());
}

#[test]
fn test_group_withWordStraddlingEnd_shouldClampIt() {
    let segments = vec![segment("0", &[("over", 9.8, 10.6)])];

    let outcome = CaptionGrouper::new(3, 0.1).group(&segments, 10.0);
    assert_eq!(outcome.units.len(), 1);
    assert!((outcome.units[0].end() - 10.0).abs() < 1e-9);
}

#[test]
fn test_group_acrossSegments_shouldNeverMerge() {
    let segments = vec![
        segment("0", &[("one", 0.0, 0.3), ("two", 0.4, 0.6)]),
        segment("1", &[("three", 1.0, 1.2), ("four", 1.3, 1.6)]),
    ];

    let outcome = CaptionGrouper::new(3, 0.5).group(&segments, 10.0);
    let texts: Vec<&str> = outcome.units.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts, vec!["one two", "three four"]);
}

#[test]
fn test_group_withMalformedWords_shouldSkipThem() {
    let segments = vec![Segment::from_words(
        "0",
        vec![
            TimedWord::new("ok", 0.0, 0.3),
            TimedWord { text: "missing".to_string(), start: None, end: Some(1.0) },
            TimedWord::new("", 0.5, 0.7),
            TimedWord::new("backwards", 0.9, 0.8),
            TimedWord::new("fine", 1.0, 1.2),
        ],
    )];

    let outcome = CaptionGrouper::new(3, 0.5).group(&segments, 10.0);
    assert_eq!(outcome.units.len(), 1);
    assert_eq!(outcome.units[0].text, "ok fine");
    assert_eq!(outcome.processed_words, 2);
    assert_eq!(outcome.total_words, 5);
}

#[test]
fn test_group_withShortWords_shouldApplyMinimumDuration() {
    let segments = vec![segment("0", &[("Hi", 2.0, 2.1)])];

    let outcome = CaptionGrouper::new(3, 0.5).group(&segments, 10.0);
    assert!((outcome.units[0].duration - 0.5).abs() < 1e-9);
}

#[test]
fn test_group_nearMediaEnd_shouldKeepUnitsInsideWindow() {
    let segments = vec![segment(
        "0",
        &[("a", 0.0, 0.1), ("b", 4.7, 4.8), ("c", 4.85, 4.9), ("d", 4.95, 5.4)],
    )];

    let grouper = CaptionGrouper::new(2, 0.5);
    assert_within_window(&grouper, &segments, 5.0);
    assert_within_window(&grouper, &segments, 4.9);
    assert_within_window(&grouper, &segments, 0.05);
}

#[test]
fn test_group_withNegativeWordStart_shouldStartAtZero() {
    let segments = normalize(&json!([{
        "id": 0,
        "words": [
            {"text": "Hey", "start": -0.2, "end": 0.3},
            {"text": "you", "start": 0.4, "end": 0.7}
        ]
    }]));

    let outcome = CaptionGrouper::default().group(&segments, 10.0);
    assert_eq!(outcome.units.len(), 1);
    assert_eq!(outcome.units[0].text, "Hey you");
    assert_eq!(outcome.units[0].start, 0.0);
    assert!((outcome.units[0].duration - 0.7).abs() < 1e-9);
    assert_within_window(&CaptionGrouper::default(), &segments, 10.0);
}

#[test]
fn test_group_withWordEntirelyBeforeZero_shouldDropIt() {
    let segments = vec![segment("0", &[("ghost", -1.0, -0.5), ("real", 0.1, 0.4)])];

    let outcome = CaptionGrouper::new(3, 0.0).group(&segments, 10.0);
    assert_eq!(outcome.units.len(), 1);
    assert_eq!(outcome.units[0].text, "real");
    assert_eq!(outcome.processed_words, 1);
}

#[test]
fn test_group_calledTwice_shouldBeIdentical() {
    let segments = vec![
        segment("0", &[("I", 0.0, 0.2), ("knew", 0.3, 0.5), ("it", 0.6, 0.7), ("was", 0.8, 1.0)]),
        segment("1", &[("him", 1.2, 1.5)]),
    ];

    let grouper = CaptionGrouper::default();
    assert_eq!(grouper.group(&segments, 10.0), grouper.group(&segments, 10.0));
}

#[test]
fn test_group_withNoSegments_shouldReturnEmpty() {
    let outcome = CaptionGrouper::default().group(&[], 10.0);
    assert!(outcome.is_empty());
    assert_eq!(outcome.total_words, 0);
}

#[test]
fn test_new_withZeroGroupSize_shouldUseOneWordCaptions() {
    let grouper = CaptionGrouper::new(0, -1.0);
    assert_eq!(grouper.group_size(), 1);
    assert_eq!(grouper.min_duration(), 0.0);

    let segments = vec![segment("0", &[("a", 0.0, 0.2), ("b", 0.3, 0.5)])];
    assert_eq!(grouper.group(&segments, 10.0).units.len(), 2);
}
