/*!
 * Transcript timing: the timed-word model, caption grouping and the
 * human-readable timestamp report.
 */

pub mod grouper;
pub mod report;
pub mod words;

pub use self::grouper::{CaptionGrouper, CaptionUnit, GroupState, GroupingOutcome};
pub use self::report::{render_report, write_report};
pub use self::words::{Segment, TimedWord, normalize, total_words};
