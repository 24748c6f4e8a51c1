//! Fenced code block extraction from Markdown documents.
//!
//! Callers that check `.md` files feed each fence through the parser as its
//! own SourceText; the rest of the document is prose and never scanned.

use pulldown_cmark::{CodeBlockKind, Event, Parser as CmarkParser, Tag, TagEnd};

use crate::source::SourceText;

/// A fenced code block lifted out of a Markdown document.
#[derive(Debug, Clone)]
pub struct Fence {
    /// Info string after the opening fence, e.g. "text"; empty when absent.
    pub info: String,
    pub content: String,
    /// Absolute 1-based line on which the content starts.
    pub start_line: usize,
}

impl Fence {
    /// Wrap this fence's content as a parser input.
    pub fn to_source(&self, file_id: usize) -> SourceText {
        SourceText::new(self.content.clone(), self.start_line, file_id)
    }
}

/// Extract fenced code blocks with their starting lines. Indented code
/// blocks count too; their content starts on their own first line.
pub fn fences(text: &str) -> Vec<Fence> {
    let mut out = Vec::new();
    let mut events = CmarkParser::new(text).into_offset_iter();

    while let Some((event, range)) = events.next() {
        let Event::Start(Tag::CodeBlock(kind)) = event else {
            continue;
        };
        let (info, fenced) = match kind {
            CodeBlockKind::Fenced(info) => (info.to_string(), true),
            CodeBlockKind::Indented => (String::new(), false),
        };

        let mut content = String::new();
        for (event, _) in events.by_ref() {
            match event {
                Event::Text(s) => content.push_str(&s),
                Event::End(TagEnd::CodeBlock) => break,
                _ => {}
            }
        }

        let opening_line = line_of_offset(text, range.start);
        out.push(Fence {
            info,
            content,
            start_line: if fenced { opening_line + 1 } else { opening_line },
        });
    }

    out
}

/// Convert a byte offset in `text` to a 1-based line number.
fn line_of_offset(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}
