pub mod balance;
pub mod error;
mod freeform;
mod structured;

pub use error::ParseError;
pub use freeform::{PS1, PS2};

use crate::block::{Block, StyleChoice};
use crate::example::{self, Example};
use crate::source::SourceText;

/// Options controlling discovery and line attribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub style: StyleChoice,
    /// Additive correction applied to every reported line number, for doc
    /// styles with known off-by-one conventions.
    pub lineno_offset: i64,
}

/// Result of one parse pass: the examples that built cleanly plus errors
/// for candidates that did not. A bad candidate never hides its siblings.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub examples: Vec<Example>,
    pub errors: Vec<ParseError>,
}

/// Parser entry point.
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Parser { options }
    }

    /// Locate example blocks in `source` and build them into Examples.
    pub fn parse(&self, source: &SourceText) -> ParseOutcome {
        let (blocks, mut errors) = self.discover(source);

        let mut examples = Vec::new();
        for block in blocks {
            match example::build(source, &block, self.options.lineno_offset) {
                Ok(Some(example)) => examples.push(example),
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }

        ParseOutcome { examples, errors }
    }

    fn discover(&self, source: &SourceText) -> (Vec<Block>, Vec<ParseError>) {
        let offset = self.options.lineno_offset;
        match self.options.style {
            StyleChoice::Structured => structured::parse_blocks(source, offset),
            StyleChoice::Freeform => freeform::parse_blocks(source, offset),
            StyleChoice::Auto => {
                // First match wins: structured, then freeform. A heuristic,
                // not a contract; pick a concrete style to control it.
                let (blocks, errors) = structured::parse_blocks(source, offset);
                if blocks.is_empty() && errors.is_empty() {
                    freeform::parse_blocks(source, offset)
                } else {
                    (blocks, errors)
                }
            }
        }
    }
}
