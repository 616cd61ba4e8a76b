use serde::{Deserialize, Serialize};
use serde_json::Value;

// @module: Timed-word transcript model

/// Default display id for segments that carry none
pub const MISSING_SEGMENT_ID: &str = "N/A";

// @struct: Single transcribed word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    // @field: Word text, whitespace-trimmed
    pub text: String,

    // @field: Start offset in seconds, absent when the aligner gave none
    pub start: Option<f64>,

    // @field: End offset in seconds, absent when the aligner gave none
    pub end: Option<f64>,
}

impl TimedWord {
    /// Create a word with both timestamps present
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into().trim().to_string(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// True when the word has text and a positive time span
    pub fn is_usable(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => !self.text.is_empty() && end > start,
            _ => false,
        }
    }
}

/// One contiguous utterance with its own ordered word list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment identifier as reported by the transcriber
    pub id: String,
    /// Segment start in seconds
    pub start: f64,
    /// Segment end in seconds
    pub end: f64,
    /// Full segment text
    pub text: String,
    /// Words in spoken order
    pub words: Vec<TimedWord>,
}

impl Segment {
    /// Create a segment, deriving its bounds from the first and last word
    pub fn from_words(id: impl Into<String>, words: Vec<TimedWord>) -> Self {
        let start = words.first().and_then(|w| w.start).unwrap_or(0.0);
        let end = words.last().and_then(|w| w.end).unwrap_or(start);
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: id.into(),
            start,
            end,
            text,
            words,
        }
    }

    /// Number of raw words in the segment
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

/// Total number of raw words across all segments
pub fn total_words(segments: &[Segment]) -> usize {
    segments.iter().map(Segment::word_count).sum()
}

/// Normalize a raw transcription result into ordered segments.
///
/// Accepts either the bare segment array or the full transcriber result
/// object carrying a `segments` array. Never fails: unknown shapes yield an
/// empty list, missing optional fields take defaults and malformed words are
/// kept with absent timing so the grouper can drop them.
pub fn normalize(raw: &Value) -> Vec<Segment> {
    let segments: &[Value] = match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("segments") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    segments.iter().filter_map(normalize_segment).collect()
}

fn normalize_segment(raw: &Value) -> Option<Segment> {
    let object = raw.as_object()?;

    let id = match object.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => MISSING_SEGMENT_ID.to_string(),
    };

    let words = match object.get("words") {
        Some(Value::Array(items)) => items.iter().filter_map(normalize_word).collect(),
        _ => Vec::new(),
    };

    Some(Segment {
        id,
        start: object.get("start").and_then(Value::as_f64).unwrap_or(0.0),
        end: object.get("end").and_then(Value::as_f64).unwrap_or(0.0),
        text: object
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        words,
    })
}

fn normalize_word(raw: &Value) -> Option<TimedWord> {
    let object = raw.as_object()?;

    Some(TimedWord {
        text: object
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        start: object.get("start").and_then(Value::as_f64),
        end: object.get("end").and_then(Value::as_f64),
    })
}
