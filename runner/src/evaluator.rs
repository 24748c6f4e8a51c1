use std::collections::VecDeque;

/// Result of executing one statement group.
#[derive(Debug, Clone, Default)]
pub struct Execution {
    /// Everything the statement wrote to the output stream.
    pub output: String,
    /// Printable representation of a final bare expression's value, if the
    /// statement produced one.
    pub value: Option<String>,
    /// One-line summary of a raised error, if the statement failed.
    pub error: Option<String>,
}

/// Capability interface to the host evaluator.
///
/// One implementation instance is one evaluation context: definitions made
/// by earlier statements are visible to later ones through `&mut self`, and
/// a fresh instance gives a fresh context. Captured output comes back per
/// call rather than through a process-global stream, so examples running
/// concurrently on separate instances cannot cross-talk; an evaluator that
/// can only redirect one global stream must serialize its own capture
/// sections internally.
pub trait Evaluator {
    fn execute(&mut self, source: &str) -> Execution;
}

/// Replays a fixed sequence of executions regardless of source; statements
/// beyond the script produce nothing. Lets engine behavior be tested
/// without any real evaluation.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    script: VecDeque<Execution>,
}

impl ScriptedEvaluator {
    pub fn new(script: impl IntoIterator<Item = Execution>) -> Self {
        ScriptedEvaluator {
            script: script.into_iter().collect(),
        }
    }
}

impl Evaluator for ScriptedEvaluator {
    fn execute(&mut self, _source: &str) -> Execution {
        self.script.pop_front().unwrap_or_default()
    }
}
