use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::ConfigError;

/// Authoring convention that produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Keyword-delimited section header followed by an indented body.
    Structured,
    /// Interactive-prompt transcript embedded directly in prose.
    Freeform,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Structured => write!(f, "structured"),
            Style::Freeform => write!(f, "freeform"),
        }
    }
}

/// Style selection supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleChoice {
    /// Try structured first; fall back to freeform when nothing is found.
    #[default]
    Auto,
    Structured,
    Freeform,
}

impl FromStr for StyleChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "auto" => Ok(StyleChoice::Auto),
            "structured" => Ok(StyleChoice::Structured),
            "freeform" => Ok(StyleChoice::Freeform),
            other => Err(ConfigError::new(format!(
                "unknown style '{}' (expected auto, structured or freeform)",
                other
            ))),
        }
    }
}

/// How one classified line participates in an example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Starts a new statement group.
    Source,
    /// Continues the statement group above it.
    Continuation,
    /// Expected-output transcript line.
    Want,
}

/// One classified line of a block. `text` has the block indent and any
/// prompt prefix already removed; `offset` is the 0-based line offset
/// within the block.
#[derive(Debug, Clone)]
pub struct BlockLine {
    pub kind: LineKind,
    pub text: String,
    pub offset: usize,
}

/// A contiguous span of a SourceText identified as one example candidate.
/// Blocks produced by one parse never overlap.
#[derive(Debug, Clone)]
pub struct Block {
    pub style: Style,
    /// 0-based line offset of the block's first line within the SourceText.
    pub start: usize,
    /// 0-based line offset one past the block's last line.
    pub end: usize,
    /// Byte span within the SourceText, for diagnostics.
    pub span: Range<usize>,
    pub lines: Vec<BlockLine>,
}
