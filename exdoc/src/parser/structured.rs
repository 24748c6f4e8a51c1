//! Keyword-delimited block discovery.
//!
//! A structured block is an `Example:` section header followed by a body
//! indented past the header. Prompted lines inside the body are source and
//! trailing non-prompted lines are want text, exactly as in freeform style;
//! a body with no prompts at all is taken as code-only. Blank lines are
//! interior to the body — only a dedent to the header's level (or end of
//! text) closes it.

use crate::block::{Block, BlockLine, LineKind, Style};
use crate::parser::balance::{self, Balance};
use crate::parser::error::ParseError;
use crate::parser::freeform::{self, PS1, has_prompt};
use crate::source::{self, SourceText};

/// Section headers that introduce a structured example.
const HEADERS: &[&str] = &["Example:", "Examples:"];

/// Scan `source` for keyword-delimited blocks.
pub fn parse_blocks(source: &SourceText, lineno_offset: i64) -> (Vec<Block>, Vec<ParseError>) {
    let spans = source::line_spans(&source.text);
    let lines: Vec<String> = source.text.split('\n').map(source::expand_tabs).collect();

    let mut blocks = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !HEADERS.contains(&lines[i].trim()) {
            i += 1;
            continue;
        }
        let header_indent = source::indentation(&lines[i]);

        // The body: subsequent lines that are blank or indented past the
        // header, with surrounding blank lines trimmed off.
        let body_start = i + 1;
        let mut j = body_start;
        while j < lines.len()
            && (lines[j].trim().is_empty() || source::indentation(&lines[j]) > header_indent)
        {
            j += 1;
        }
        let mut end = j;
        while end > body_start && lines[end - 1].trim().is_empty() {
            end -= 1;
        }
        let mut begin = body_start;
        while begin < end && lines[begin].trim().is_empty() {
            begin += 1;
        }
        i = j;
        if begin == end {
            continue;
        }

        let body = &lines[..end];
        let indent = source::min_indentation(body[begin..].iter().map(String::as_str));
        let prompted = body[begin..]
            .iter()
            .any(|l| !l.trim().is_empty() && has_prompt(&l[indent..], PS1));

        let result = if prompted {
            let mut pos = begin;
            freeform::scan_block(
                body,
                &mut pos,
                begin,
                indent,
                true,
                source,
                lineno_offset,
                &spans,
            )
        } else {
            scan_code_only(body, begin, indent, source, lineno_offset, &spans)
        };

        match result {
            Ok(block_lines) => blocks.push(Block {
                style: Style::Structured,
                start: begin,
                end,
                span: spans[begin].start..spans[end - 1].end,
                lines: block_lines,
            }),
            Err(err) => errors.push(err),
        }
    }

    (blocks, errors)
}

/// Classify a promptless body: every non-blank line is code, grouped into
/// statements by balance. There is no want text in this form.
fn scan_code_only(
    lines: &[String],
    begin: usize,
    indent: usize,
    source: &SourceText,
    lineno_offset: i64,
    spans: &[std::ops::Range<usize>],
) -> Result<Vec<BlockLine>, ParseError> {
    let abs = |idx: usize| source.line_map(0, lineno_offset).absolute(idx);
    let mut out = Vec::new();
    let mut open: Option<(usize, Vec<String>)> = None;

    for (idx, line) in lines.iter().enumerate().skip(begin) {
        let blank = line.trim().is_empty();
        let text = if blank {
            String::new()
        } else {
            line[indent..].to_string()
        };

        match open {
            Some((first, ref mut parts)) => {
                parts.push(text.clone());
                out.push(BlockLine {
                    kind: LineKind::Continuation,
                    text,
                    offset: idx - begin,
                });
                match balance::scan(&parts.join("\n")) {
                    Balance::Balanced => open = None,
                    Balance::Open => {}
                    Balance::Mismatched => {
                        return Err(ParseError::new(
                            "mismatched delimiter in statement",
                            spans[first].clone(),
                            source.file_id,
                            abs(first),
                        ));
                    }
                }
            }
            None => {
                if blank {
                    continue;
                }
                out.push(BlockLine {
                    kind: LineKind::Source,
                    text: text.clone(),
                    offset: idx - begin,
                });
                match balance::scan(&text) {
                    Balance::Balanced => {}
                    Balance::Open => open = Some((idx, vec![text])),
                    Balance::Mismatched => {
                        return Err(ParseError::new(
                            "mismatched delimiter in statement",
                            spans[idx].clone(),
                            source.file_id,
                            abs(idx),
                        ));
                    }
                }
            }
        }
    }

    if let Some((first, _)) = open {
        return Err(ParseError::new(
            "statement never closes",
            spans[first].clone(),
            source.file_id,
            abs(first),
        ));
    }
    Ok(out)
}
