//! Plain-text rendering of verdicts. The caller owns color and layout;
//! everything here is ready to print or to wrap in escape codes.

use crate::verdict::{Status, Verdict};

/// Counts across one batch of verdicts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Totals {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

impl Totals {
    pub fn tally(verdicts: &[Verdict]) -> Totals {
        let mut totals = Totals::default();
        for verdict in verdicts {
            match verdict.status {
                Status::Passed => totals.passed += 1,
                Status::Failed(_) => totals.failed += 1,
                Status::Errored(_) => totals.errored += 1,
                Status::Skipped => totals.skipped += 1,
            }
        }
        totals
    }

    pub fn all_ok(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    /// The count breakdown, without the leading ok/FAILED word.
    pub fn breakdown(&self) -> String {
        let mut text = format!("{} passed, {} failed", self.passed, self.failed);
        if self.errored > 0 {
            text.push_str(&format!(", {} errored", self.errored));
        }
        if self.skipped > 0 {
            text.push_str(&format!(", {} skipped", self.skipped));
        }
        text
    }
}

/// One-line description of an example's location.
pub fn describe(path: &str, verdict: &Verdict) -> String {
    format!(
        "{}:{} ({}, lines {}-{})",
        path, verdict.start_line, verdict.style, verdict.start_line, verdict.end_line
    )
}

/// Detail lines for a failed or errored verdict; empty otherwise. The
/// caller indents and prints. Diff rows keep the full compared span:
/// matching rows are prefixed with two spaces, divergent rows with `-`
/// (expected) and `+` (actual).
pub fn failure_lines(verdict: &Verdict) -> Vec<String> {
    match &verdict.status {
        Status::Failed(failure) => {
            let mut lines = vec![format!("line {}: expected output does not match", failure.line)];
            for row in &failure.diff.lines {
                if row.equal {
                    lines.push(format!("    {}", row.want.as_deref().unwrap_or("")));
                } else {
                    if let Some(want) = &row.want {
                        lines.push(format!("  - {}", want));
                    }
                    if let Some(got) = &row.got {
                        lines.push(format!("  + {}", got));
                    }
                }
            }
            lines
        }
        Status::Errored(error) => {
            vec![format!("line {}: raised: {}", error.line, error.summary)]
        }
        Status::Passed | Status::Skipped => Vec::new(),
    }
}
