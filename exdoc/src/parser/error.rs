use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// A parse error with source location information. One error is local to
/// one example candidate; sibling candidates in the same document still
/// parse and run.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    /// Byte span within the containing file's text.
    pub span: Range<usize>,
    pub file_id: usize,
    /// Best-known absolute 1-based source line.
    pub line: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn new(
        message: impl Into<String>,
        span: Range<usize>,
        file_id: usize,
        line: usize,
    ) -> Self {
        ParseError {
            message: message.into(),
            span,
            file_id,
            line,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}
