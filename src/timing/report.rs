use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

use crate::file_utils::FileManager;
use super::words::Segment;

// @module: Human-readable word timestamp report

/// Render the report: one header line per segment followed by indented word lines.
///
/// Absent word timestamps print as zero, matching how the raw transcript is
/// inspected by hand.
pub fn render_report(segments: &[Segment]) -> String {
    let mut out = String::new();

    for segment in segments {
        let _ = writeln!(
            out,
            "Segment {} [{:.2}s - {:.2}s]: {}",
            segment.id, segment.start, segment.end, segment.text
        );
        for word in &segment.words {
            let _ = writeln!(
                out,
                "  '{}' [{:.2}s - {:.2}s]",
                word.text,
                word.start.unwrap_or(0.0),
                word.end.unwrap_or(0.0)
            );
        }
    }

    out
}

/// Write the report to `path`, creating parent directories as needed
pub fn write_report<P: AsRef<Path>>(segments: &[Segment], path: P) -> Result<()> {
    FileManager::write_to_file(path, &render_report(segments))
}
