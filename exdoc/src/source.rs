use std::ops::Range;

/// A documentation blob handed to the parser, plus where it came from.
#[derive(Debug, Clone)]
pub struct SourceText {
    /// The raw documentation text.
    pub text: String,
    /// 1-based line in the containing file on which `text` begins.
    pub start_line: usize,
    /// File id for codespan-reporting diagnostics.
    pub file_id: usize,
}

impl SourceText {
    pub fn new(text: impl Into<String>, start_line: usize, file_id: usize) -> Self {
        SourceText {
            text: text.into(),
            start_line,
            file_id,
        }
    }

    /// Line map for a block starting `block_start` lines into this text.
    pub fn line_map(&self, block_start: usize, lineno_offset: i64) -> LineMap {
        LineMap::new(self.start_line, block_start, lineno_offset)
    }
}

/// Maps line offsets within a block back to absolute lines in the original
/// file. Every transformation applied before mapping (tab expansion, indent
/// stripping, prompt stripping, directive stripping) preserves line counts,
/// so the map is a pure sum and cannot fail.
#[derive(Debug, Clone, Copy)]
pub struct LineMap {
    /// Absolute 1-based line of the block's first line.
    base: usize,
    /// Caller-supplied additive correction.
    offset: i64,
}

impl LineMap {
    pub fn new(source_start: usize, block_start: usize, lineno_offset: i64) -> Self {
        LineMap {
            base: source_start + block_start,
            offset: lineno_offset,
        }
    }

    /// Absolute 1-based line for a 0-based line offset within the block.
    pub fn absolute(&self, rel: usize) -> usize {
        let line = (self.base + rel) as i64 + self.offset;
        line.max(1) as usize
    }
}

/// Expand tabs to 8-column stops, as interactive interpreters display them.
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::new();
    let mut col = 0usize;
    for c in line.chars() {
        if c == '\t' {
            let n = 8 - col % 8;
            out.extend(std::iter::repeat_n(' ', n));
            col += n;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

/// Number of leading spaces on a line (call after tab expansion).
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

/// Minimum indentation over the non-blank lines, 0 if there are none.
pub fn min_indentation<'a>(lines: impl IntoIterator<Item = &'a str>) -> usize {
    lines
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .map(indentation)
        .min()
        .unwrap_or(0)
}

/// Byte range of each line of `text`, newline excluded. Indexed by the same
/// 0-based line offsets the parsers use, against the untransformed text.
pub fn line_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            spans.push(start..i);
            start = i + 1;
        }
    }
    spans.push(start..text.len());
    spans
}
