//! Prompt-based block discovery.
//!
//! A freeform block starts at a primary-prompt line at any indentation.
//! Prompted lines at that indentation are source, non-prompted lines
//! directly after source are want text, and the block ends at the first
//! blank line, at a dedented line, or at end of text. Each block becomes
//! one independent example.

use std::ops::Range;

use crate::block::{Block, BlockLine, LineKind, Style};
use crate::parser::balance::{self, Balance};
use crate::parser::error::ParseError;
use crate::source::{self, SourceText};

/// Primary prompt: starts a statement.
pub const PS1: &str = ">>>";
/// Secondary prompt: continues the statement above.
pub const PS2: &str = "...";

/// True when `s` is the prompt alone or the prompt followed by a space.
pub(super) fn has_prompt(s: &str, prompt: &str) -> bool {
    match s.strip_prefix(prompt) {
        Some(rest) => rest.is_empty() || rest.starts_with(' '),
        None => false,
    }
}

/// Text after the prompt, with one separating space removed.
pub(super) fn strip_prompt(s: &str) -> String {
    let rest = &s[PS1.len()..];
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

/// Scan `source` for prompt-authored blocks.
pub fn parse_blocks(source: &SourceText, lineno_offset: i64) -> (Vec<Block>, Vec<ParseError>) {
    let spans = source::line_spans(&source.text);
    let lines: Vec<String> = source.text.split('\n').map(source::expand_tabs).collect();

    let mut blocks = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !has_prompt(lines[i].trim_start(), PS1) {
            i += 1;
            continue;
        }

        let indent = source::indentation(&lines[i]);
        let start = i;
        match scan_block(
            &lines,
            &mut i,
            start,
            indent,
            false,
            source,
            lineno_offset,
            &spans,
        ) {
            Ok(block_lines) => {
                blocks.push(Block {
                    style: Style::Freeform,
                    start,
                    end: i,
                    span: spans[start].start..spans[i - 1].end,
                    lines: block_lines,
                });
            }
            Err(err) => {
                errors.push(err);
                // Resynchronize at the first blank line after the failed
                // block's start; a runaway statement may have consumed far
                // more, and later blocks should still parse.
                let mut resync = start;
                while resync < lines.len() && !lines[resync].trim().is_empty() {
                    resync += 1;
                }
                i = resync;
            }
        }
    }

    (blocks, errors)
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    /// Before the first statement, or past a blank line in a structured
    /// body: non-prompted lines are prose, not want text.
    Prose,
    /// Directly after a statement: the next non-prompted line opens a want.
    AfterSource,
    /// Inside a want transcript.
    InWant,
}

/// Classify lines into a block starting at `lines[*i]`, advancing `*i` past
/// the block. With `interior_blanks` (structured bodies) a blank line only
/// closes the current want; otherwise it ends the block.
#[allow(clippy::too_many_arguments)]
pub(super) fn scan_block(
    lines: &[String],
    i: &mut usize,
    block_start: usize,
    indent: usize,
    interior_blanks: bool,
    source: &SourceText,
    lineno_offset: i64,
    spans: &[Range<usize>],
) -> Result<Vec<BlockLine>, ParseError> {
    let mut out: Vec<BlockLine> = Vec::new();
    let mut mode = Mode::Prose;

    while *i < lines.len() {
        let line = &lines[*i];

        if line.trim().is_empty() {
            if !interior_blanks {
                break;
            }
            mode = Mode::Prose;
            *i += 1;
            continue;
        }
        if source::indentation(line) < indent {
            break;
        }

        let norm = &line[indent..];
        if has_prompt(norm, PS1) {
            consume_statement(
                lines,
                i,
                block_start,
                indent,
                source,
                lineno_offset,
                spans,
                &mut out,
            )?;
            mode = Mode::AfterSource;
            continue;
        }

        let want_line = |text: &str, offset: usize| BlockLine {
            kind: LineKind::Want,
            text: text.to_string(),
            offset,
        };

        if has_prompt(norm, PS2) && mode == Mode::AfterSource && norm.trim() != PS2 {
            // Explicit continuation of the statement above. A bare
            // secondary prompt instead stands for a wildcard want line.
            out.push(BlockLine {
                kind: LineKind::Continuation,
                text: strip_prompt(norm),
                offset: *i - block_start,
            });
            *i += 1;
            continue;
        }

        match mode {
            Mode::AfterSource | Mode::InWant => {
                out.push(want_line(norm, *i - block_start));
                mode = Mode::InWant;
            }
            Mode::Prose => {}
        }
        *i += 1;
    }

    Ok(out)
}

/// Consume one statement: the primary-prompt line at `lines[*i]` plus any
/// lines needed to close it. Continuation lines may carry either prompt, a
/// blank prefix, or plain indentation (multi-line string content).
#[allow(clippy::too_many_arguments)]
fn consume_statement(
    lines: &[String],
    i: &mut usize,
    block_start: usize,
    indent: usize,
    source: &SourceText,
    lineno_offset: i64,
    spans: &[Range<usize>],
    out: &mut Vec<BlockLine>,
) -> Result<(), ParseError> {
    let abs = |idx: usize| source.line_map(0, lineno_offset).absolute(idx);
    let first = *i;
    let text = strip_prompt(&lines[*i][indent..]);
    let mut parts: Vec<String> = vec![text.clone()];
    out.push(BlockLine {
        kind: LineKind::Source,
        text,
        offset: *i - block_start,
    });
    *i += 1;

    loop {
        match balance::scan(&parts.join("\n")) {
            Balance::Balanced => return Ok(()),
            Balance::Mismatched => {
                return Err(ParseError::new(
                    "mismatched delimiter in statement",
                    spans[first].clone(),
                    source.file_id,
                    abs(first),
                ));
            }
            Balance::Open => {}
        }

        if *i >= lines.len() {
            return Err(ParseError::new(
                "statement never closes",
                spans[first].clone(),
                source.file_id,
                abs(first),
            )
            .with_note("an open bracket or multi-line string runs past the end of the example"));
        }

        let line = &lines[*i];
        let text = if line.trim().is_empty() {
            String::new()
        } else if source::indentation(line) < indent {
            return Err(ParseError::new(
                "bad indentation in statement continuation",
                spans[*i].clone(),
                source.file_id,
                abs(*i),
            ));
        } else {
            let norm = &line[indent..];
            if has_prompt(norm, PS1) || has_prompt(norm, PS2) {
                strip_prompt(norm)
            } else if norm.starts_with("    ") {
                // Unprompted continuation aligned past the prompt column,
                // e.g. the body of a multi-line string literal.
                norm[4..].to_string()
            } else {
                return Err(ParseError::new(
                    "bad indentation in statement continuation",
                    spans[*i].clone(),
                    source.file_id,
                    abs(*i),
                ));
            }
        };
        parts.push(text.clone());
        out.push(BlockLine {
            kind: LineKind::Continuation,
            text,
            offset: *i - block_start,
        });
        *i += 1;
    }
}
