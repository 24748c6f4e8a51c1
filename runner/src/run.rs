//! The execution engine: drives one example to a verdict.

use exdoc::directive::{Directive, DirectiveName};
use exdoc::example::Example;

use crate::checker;
use crate::evaluator::Evaluator;
use crate::verdict::{ExecError, Failure, Status, Verdict};

/// Directive state active while an example runs. Example-scope directives
/// mutate it for the rest of the run; part-scope directives overlay it for
/// one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub skip: bool,
    pub ignore_want: bool,
    pub normalize_whitespace: bool,
    pub ellipsis: bool,
    pub blankline: bool,
}

impl Default for RunState {
    fn default() -> Self {
        // Wildcards and blank-line stripping are on unless turned off.
        RunState {
            skip: false,
            ignore_want: false,
            normalize_whitespace: false,
            ellipsis: true,
            blankline: true,
        }
    }
}

impl RunState {
    pub fn apply(&mut self, directive: &Directive) {
        let on = directive.enabled;
        match directive.name {
            DirectiveName::Skip => self.skip = on,
            DirectiveName::IgnoreWant => self.ignore_want = on,
            DirectiveName::NormalizeWhitespace => self.normalize_whitespace = on,
            DirectiveName::Ellipsis => self.ellipsis = on,
            DirectiveName::Blankline => self.blankline = on,
        }
    }

    pub fn applied(mut self, directives: &[Directive]) -> RunState {
        for directive in directives {
            self.apply(directive);
        }
        self
    }
}

/// Run one example against one evaluation context.
///
/// Parts execute strictly in order; later parts see state the earlier ones
/// built up in `evaluator`. Output from parts without a want accumulates
/// and is compared, concatenated in source order, at the next part that
/// has one. The first mismatch or unexpected error ends the run.
pub fn run_example(example: &Example, evaluator: &mut dyn Evaluator, defaults: RunState) -> Verdict {
    let mut state = defaults;
    let mut pending: Vec<String> = Vec::new();
    let mut skipped = 0usize;

    for (index, part) in example.parts.iter().enumerate() {
        for directive in &part.example_directives {
            state.apply(directive);
        }
        let effective = state.applied(&part.directives);

        if effective.skip {
            skipped += 1;
            continue;
        }

        let exec = evaluator.execute(&part.source);

        if let Some(error) = exec.error {
            // A raised error passes when the part expected it: the summary
            // is matched against the part's own want.
            let summary = format!("{}\n", error.trim_end());
            if let Some(want) = &part.want {
                if checker::check(&summary, want, &effective).is_ok() {
                    pending.clear();
                    continue;
                }
            }
            return verdict(
                example,
                Status::Errored(ExecError {
                    part: index,
                    line: part.line,
                    summary: error,
                }),
            );
        }

        pending.push(exec.output);

        if let Some(want) = &part.want {
            if effective.ignore_want {
                pending.clear();
                continue;
            }
            let got: String = pending.concat();

            // The transcript may show printed output alone, or the final
            // expression's value after it.
            let mut outcome = checker::check(&got, want, &effective);
            if outcome.is_err() {
                if let Some(value) = &exec.value {
                    let with_value = format!("{}{}\n", got, value);
                    outcome = checker::check(&with_value, want, &effective);
                }
            }

            match outcome {
                Ok(()) => pending.clear(),
                Err(diff) => {
                    return verdict(
                        example,
                        Status::Failed(Failure {
                            part: index,
                            line: part.line,
                            diff,
                        }),
                    );
                }
            }
        }
    }

    if !example.parts.is_empty() && skipped == example.parts.len() {
        return verdict(example, Status::Skipped);
    }
    verdict(example, Status::Passed)
}

fn verdict(example: &Example, status: Status) -> Verdict {
    Verdict {
        style: example.style,
        start_line: example.start_line,
        end_line: example.end_line,
        status,
    }
}
