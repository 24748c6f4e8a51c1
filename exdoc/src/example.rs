use std::ops::Range;

use crate::block::{Block, LineKind, Style};
use crate::directive::{self, Directive, Scope};
use crate::parser::error::ParseError;
use crate::source::SourceText;

/// One statement group paired with its expected output.
#[derive(Debug, Clone)]
pub struct Part {
    /// Executable source, prompts and directive markers stripped.
    pub source: String,
    /// Expected-output transcript. Parts without a want contribute their
    /// output to the next comparison point instead (delayed want).
    pub want: Option<String>,
    /// Directives bound to this statement alone.
    pub directives: Vec<Directive>,
    /// Directives applying from this statement to the end of the example.
    pub example_directives: Vec<Directive>,
    /// Absolute 1-based line of the first source line.
    pub line: usize,
    /// Total lines this part spans (source and want).
    pub n_lines: usize,
}

/// An ordered sequence of parts sharing one evaluation context. Parts keep
/// source order; their line ranges are monotonic and never overlap.
#[derive(Debug, Clone)]
pub struct Example {
    pub style: Style,
    pub parts: Vec<Part>,
    /// Absolute 1-based first and last lines of the block.
    pub start_line: usize,
    pub end_line: usize,
    /// Byte span of the block, for diagnostics.
    pub span: Range<usize>,
    pub file_id: usize,
}

struct Group {
    offset: usize,
    source_lines: Vec<String>,
    want_lines: Vec<String>,
}

/// Build an Example from a classified block. Blocks with no executable
/// content produce `None` and are discarded.
pub fn build(
    source: &SourceText,
    block: &Block,
    lineno_offset: i64,
) -> Result<Option<Example>, ParseError> {
    let map = source.line_map(block.start, lineno_offset);

    let mut groups: Vec<Group> = Vec::new();
    for line in &block.lines {
        match line.kind {
            LineKind::Source => groups.push(Group {
                offset: line.offset,
                source_lines: vec![line.text.clone()],
                want_lines: Vec::new(),
            }),
            LineKind::Continuation => {
                if let Some(group) = groups.last_mut() {
                    group.source_lines.push(line.text.clone());
                }
            }
            LineKind::Want => {
                if let Some(group) = groups.last_mut() {
                    group.want_lines.push(line.text.clone());
                }
            }
        }
    }

    let mut parts = Vec::new();
    for group in groups {
        let raw = group.source_lines.join("\n");
        let extraction = directive::extract(&raw).map_err(|(rel, message)| {
            ParseError::new(
                message,
                block.span.clone(),
                source.file_id,
                map.absolute(group.offset + rel),
            )
        })?;

        let want = if group.want_lines.is_empty() {
            None
        } else {
            Some(group.want_lines.join("\n") + "\n")
        };

        let (part_directives, example_directives) = extraction
            .directives
            .into_iter()
            .partition(|d| d.scope == Scope::Part);

        parts.push(Part {
            source: extraction.source,
            want,
            directives: part_directives,
            example_directives,
            line: map.absolute(group.offset),
            n_lines: group.source_lines.len() + group.want_lines.len(),
        });
    }

    let empty = parts.iter().all(|p| {
        p.source.trim().is_empty()
            && p.want.is_none()
            && p.directives.is_empty()
            && p.example_directives.is_empty()
    });
    if empty {
        return Ok(None);
    }

    Ok(Some(Example {
        style: block.style,
        parts,
        start_line: map.absolute(0),
        end_line: map.absolute(block.end - block.start - 1),
        span: block.span.clone(),
        file_id: source.file_id,
    }))
}
