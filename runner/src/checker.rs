//! Got-vs-want comparison.

use crate::run::RunState;

/// Placeholder in want text for an intentionally blank output line.
pub const BLANKLINE_MARKER: &str = "<BLANKLINE>";
/// Wildcard token in want text matching any substring, including none.
pub const ELLIPSIS_MARKER: &str = "...";

/// One row of a structured diff. `equal` rows carry the shared line in
/// both fields; unequal rows may lack one side when the spans differ in
/// length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub want: Option<String>,
    pub got: Option<String>,
    pub equal: bool,
}

/// Line-by-line divergence between expected and actual output, covering
/// the full compared span in order, newlines preserved as line breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDiff {
    pub lines: Vec<DiffLine>,
}

/// Decide whether captured output satisfies the want under `state`.
pub fn check(got: &str, want: &str, state: &RunState) -> Result<(), OutputDiff> {
    if state.ignore_want || want.is_empty() {
        return Ok(());
    }
    if state.ellipsis && want.trim() == ELLIPSIS_MARKER {
        return Ok(());
    }
    if got == want {
        return Ok(());
    }

    let ngot = normalize(got, false, state);
    let nwant = normalize(want, true, state);
    if ngot == nwant {
        return Ok(());
    }
    if state.ellipsis && nwant.contains(ELLIPSIS_MARKER) && ellipsis_match(&ngot, &nwant) {
        return Ok(());
    }

    Err(diff(got, want, state))
}

/// Trailing whitespace never counts; the blank-line marker in want text
/// stands for an empty line while stripping is active; whitespace runs
/// collapse when normalization is on.
fn normalize(text: &str, is_want: bool, state: &RunState) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.trim_end_matches([' ', '\t']))
        .map(|l| {
            if is_want && state.blankline && l == BLANKLINE_MARKER {
                ""
            } else {
                l
            }
        })
        .collect();
    let joined = lines.join("\n");
    let trimmed = joined.trim_end_matches('\n');
    if state.normalize_whitespace {
        trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        trimmed.to_string()
    }
}

/// In-order wildcard matching: want splits on the marker, the first
/// segment anchors the start, the last anchors the end, and interior
/// segments match at their leftmost position. First valid split wins; no
/// backtracking.
fn ellipsis_match(got: &str, want: &str) -> bool {
    let segments: Vec<&str> = want.split(ELLIPSIS_MARKER).collect();
    let (first, rest) = segments.split_first().expect("split yields a segment");
    let Some((last, middle)) = rest.split_last() else {
        return got == want;
    };

    if !got.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match got[pos..].find(segment) {
            Some(found) => pos += found + segment.len(),
            None => return false,
        }
    }

    if last.is_empty() {
        return true;
    }
    got.len() >= pos + last.len() && got.ends_with(last)
}

/// Pairwise rows over the compared span, against lightly-normalized lines
/// so the rows show what the comparison saw.
fn diff(got: &str, want: &str, state: &RunState) -> OutputDiff {
    let want_lines: Vec<String> = normalize(want, true, state)
        .split('\n')
        .map(str::to_string)
        .collect();
    let got_lines: Vec<String> = normalize(got, false, state)
        .split('\n')
        .map(str::to_string)
        .collect();

    let mut lines = Vec::new();
    let len = want_lines.len().max(got_lines.len());
    for i in 0..len {
        let want = want_lines.get(i).cloned();
        let got = got_lines.get(i).cloned();
        let equal = match (&want, &got) {
            (Some(w), Some(g)) => {
                w == g || (state.ellipsis && w.contains(ELLIPSIS_MARKER) && ellipsis_match(g, w))
            }
            _ => false,
        };
        lines.push(DiffLine { want, got, equal });
    }

    OutputDiff { lines }
}
