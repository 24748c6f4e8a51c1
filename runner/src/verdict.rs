use exdoc::block::Style;

use crate::checker::OutputDiff;

/// Output mismatch detail.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Index of the failing part within the example.
    pub part: usize,
    /// Absolute 1-based line of the failing statement.
    pub line: usize,
    pub diff: OutputDiff,
}

/// Unexpected execution error detail.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecError {
    pub part: usize,
    /// Absolute 1-based line of the failing statement. Always a line the
    /// parser computed from the source, never an evaluator-internal frame.
    pub line: usize,
    /// One-line summary from the evaluator.
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Passed,
    Failed(Failure),
    Errored(ExecError),
    Skipped,
}

/// Result of running one example. Produced once per run, all variants
/// terminal; nothing retries.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub style: Style,
    pub start_line: usize,
    pub end_line: usize,
    pub status: Status,
}

impl Verdict {
    /// True unless the example failed or errored.
    pub fn ok(&self) -> bool {
        matches!(self.status, Status::Passed | Status::Skipped)
    }

    pub fn label(&self) -> &'static str {
        match self.status {
            Status::Passed => "PASS",
            Status::Failed(_) => "FAIL",
            Status::Errored(_) => "ERROR",
            Status::Skipped => "SKIP",
        }
    }
}
