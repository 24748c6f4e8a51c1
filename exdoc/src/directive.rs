//! Inline directive markers.
//!
//! Directives ride inside source comments: `# exdoc: +SKIP -ELLIPSIS`
//! (the `doctest:` prefix is accepted for familiarity). A marker sharing a
//! line with code binds to that statement group alone; a marker filling a
//! comment-only line binds to the rest of the example. Marker text is
//! stripped before the source reaches the evaluator.

use crate::ConfigError;

/// Names understood inside a directive marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveName {
    /// Do not execute.
    Skip,
    /// Capture output but never compare it.
    IgnoreWant,
    /// Collapse whitespace runs before comparing.
    NormalizeWhitespace,
    /// Let `...` in want text match any substring.
    Ellipsis,
    /// Strip the blank-line marker token from want text.
    Blankline,
}

impl DirectiveName {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "SKIP" => Some(DirectiveName::Skip),
            "IGNORE_WANT" => Some(DirectiveName::IgnoreWant),
            "NORMALIZE_WHITESPACE" => Some(DirectiveName::NormalizeWhitespace),
            "ELLIPSIS" => Some(DirectiveName::Ellipsis),
            "BLANKLINE" => Some(DirectiveName::Blankline),
            _ => None,
        }
    }
}

/// Whether a directive applies to one statement or the rest of the example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Part,
    Example,
}

/// One parsed `+NAME` / `-NAME` control token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub name: DirectiveName,
    pub enabled: bool,
    pub scope: Scope,
}

impl Directive {
    /// Parse a configuration flag like `+SKIP` or `-ELLIPSIS`. A bare name
    /// enables. Configured directives always take example scope.
    pub fn from_flag(s: &str) -> Result<Directive, ConfigError> {
        let (enabled, name) = split_sign(s);
        match DirectiveName::parse(name) {
            Some(name) => Ok(Directive {
                name,
                enabled,
                scope: Scope::Example,
            }),
            None => Err(ConfigError::new(format!("unknown directive '{}'", s))),
        }
    }
}

fn split_sign(token: &str) -> (bool, &str) {
    if let Some(rest) = token.strip_prefix('+') {
        (true, rest)
    } else if let Some(rest) = token.strip_prefix('-') {
        (false, rest)
    } else {
        (true, token)
    }
}

/// Result of scanning one statement group for markers.
#[derive(Debug)]
pub struct Extraction {
    /// Source with marker text removed; line count preserved.
    pub source: String,
    pub directives: Vec<Directive>,
}

const PREFIXES: &[&str] = &["exdoc:", "doctest:"];

/// Scan a statement group for directive markers and strip them out.
///
/// On an unknown name inside a recognized marker, returns the 0-based line
/// offset within the group and a message, for the caller to locate.
pub fn extract(source: &str) -> Result<Extraction, (usize, String)> {
    let mut directives = Vec::new();
    let mut out_lines = Vec::new();

    for (idx, line) in source.split('\n').enumerate() {
        let Some(hash) = comment_start(line) else {
            out_lines.push(line.to_string());
            continue;
        };
        let comment = line[hash + 1..].trim_start();
        let Some(rest) = PREFIXES.iter().find_map(|p| comment.strip_prefix(p)) else {
            out_lines.push(line.to_string());
            continue;
        };

        let code = line[..hash].trim_end();
        let scope = if code.is_empty() {
            Scope::Example
        } else {
            Scope::Part
        };

        for token in rest.split([',', ' ']).filter(|t| !t.is_empty()) {
            let (enabled, name) = split_sign(token);
            match DirectiveName::parse(name) {
                Some(name) => directives.push(Directive {
                    name,
                    enabled,
                    scope,
                }),
                None => return Err((idx, format!("unknown directive '{}'", token))),
            }
        }
        out_lines.push(code.to_string());
    }

    Ok(Extraction {
        source: out_lines.join("\n"),
        directives,
    })
}

/// Byte offset of the first `#` that starts a comment, skipping string
/// literals. Tracks quoting across lines is not needed here: a marker is
/// only recognized on a line whose comment opens outside any string
/// starting on that line.
fn comment_start(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut iter = line.char_indices();
    while let Some((i, c)) = iter.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    iter.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '#' => return Some(i),
                _ => {}
            },
        }
    }
    None
}
