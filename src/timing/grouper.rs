/*!
 * Caption grouping.
 *
 * Turns the timed words of each transcript segment into short caption units
 * suitable for on-screen display. Words are accumulated into groups of at most
 * `group_size`; a group is emitted when it is full or when its segment ends.
 * Groups never span a segment boundary.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::words::{Segment, TimedWord, total_words};

/// Default number of words per caption
pub const DEFAULT_GROUP_SIZE: usize = 3;

/// Default minimum on-screen duration of a caption in seconds
pub const DEFAULT_MIN_DURATION: f64 = 0.5;

/// Progress is logged every this many accepted words
const PROGRESS_INTERVAL: usize = 50;

/// A displayable, timed group of words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionUnit {
    /// Space-joined words
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// On-screen duration in seconds
    pub duration: f64,
}

impl CaptionUnit {
    /// End offset in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Accumulating group of accepted words.
///
/// `group_start` is set by the first accepted word, `group_end` follows the
/// last one. `flush` turns the group into a caption and resets it.
#[derive(Debug, Default, Clone)]
pub struct GroupState {
    current_group: Vec<String>,
    group_start: Option<f64>,
    group_end: Option<f64>,
}

impl GroupState {
    /// Add a word that already passed clamping and validation
    pub fn accept(&mut self, text: &str, start: f64, end: f64) {
        if self.current_group.is_empty() {
            self.group_start = Some(start);
        }
        self.current_group.push(text.to_string());
        self.group_end = Some(end);
    }

    /// Number of words in the current group
    pub fn len(&self) -> usize {
        self.current_group.len()
    }

    /// True when no word has been accepted since the last flush
    pub fn is_empty(&self) -> bool {
        self.current_group.is_empty()
    }

    /// Emit the current group as a caption and reset.
    ///
    /// The duration is floored at `min_duration` and then limited so the
    /// caption never runs past `ceiling`.
    pub fn flush(&mut self, min_duration: f64, ceiling: f64) -> Option<CaptionUnit> {
        let words = std::mem::take(&mut self.current_group);
        let start = self.group_start.take();
        let end = self.group_end.take();

        let (start, end) = match (start, end) {
            (Some(start), Some(end)) if !words.is_empty() => (start, end),
            _ => return None,
        };

        let duration = (end - start).max(min_duration).min(ceiling - start);

        Some(CaptionUnit {
            text: words.join(" "),
            start,
            duration,
        })
    }
}

/// Result of grouping a transcript
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingOutcome {
    /// Captions in display order
    pub units: Vec<CaptionUnit>,
    /// Words accepted into some caption
    pub processed_words: usize,
    /// Raw words seen across all segments
    pub total_words: usize,
}

impl GroupingOutcome {
    /// True when no caption could be built
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Groups timed words into caption units
#[derive(Debug, Clone, Copy)]
pub struct CaptionGrouper {
    group_size: usize,
    min_duration: f64,
}

impl Default for CaptionGrouper {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_SIZE, DEFAULT_MIN_DURATION)
    }
}

impl CaptionGrouper {
    /// Create a grouper; a zero group size is treated as one word per caption
    pub fn new(group_size: usize, min_duration: f64) -> Self {
        Self {
            group_size: group_size.max(1),
            min_duration: min_duration.max(0.0),
        }
    }

    /// Target words per caption
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Minimum caption duration in seconds
    pub fn min_duration(&self) -> f64 {
        self.min_duration
    }

    /// Group every segment's words into captions bounded by `effective_duration`.
    ///
    /// Never fails; returns whatever captions could be built, possibly none.
    pub fn group(&self, segments: &[Segment], effective_duration: f64) -> GroupingOutcome {
        let mut outcome = GroupingOutcome {
            units: Vec::new(),
            processed_words: 0,
            total_words: total_words(segments),
        };

        for segment in segments {
            self.group_segment(segment, effective_duration, &mut outcome);
        }

        info!(
            "Created {} caption groups from {} words",
            outcome.units.len(),
            outcome.processed_words
        );

        outcome
    }

    fn group_segment(&self, segment: &Segment, effective_duration: f64, outcome: &mut GroupingOutcome) {
        let mut state = GroupState::default();
        let last_index = segment.words.len().saturating_sub(1);

        for (i, word) in segment.words.iter().enumerate() {
            if let Some((start, end)) = clamp_word(word, effective_duration) {
                state.accept(&word.text, start, end);
                outcome.processed_words += 1;

                if outcome.processed_words % PROGRESS_INTERVAL == 0 {
                    debug!(
                        "Processed {}/{} words...",
                        outcome.processed_words, outcome.total_words
                    );
                }

                if state.len() >= self.group_size || i == last_index {
                    outcome
                        .units
                        .extend(state.flush(self.min_duration, effective_duration));
                }
            }
        }

        // Trailing words may have been discarded; never carry a partial group over
        outcome
            .units
            .extend(state.flush(self.min_duration, effective_duration));
    }
}

/// Clamp a word to the media window, returning its usable span.
///
/// Words starting at or after `effective_duration` are discarded, starts
/// before zero and ends past the media are clamped, and words left without
/// text or a positive span are dropped.
fn clamp_word(word: &TimedWord, effective_duration: f64) -> Option<(f64, f64)> {
    let start = word.start?;
    let end = word.end?;

    if start >= effective_duration {
        return None;
    }
    let start = start.max(0.0);
    let end = end.min(effective_duration);

    if word.text.is_empty() || end <= start {
        return None;
    }

    Some((start, end))
}
