use std::io::Write;

use exdoc::block::StyleChoice;
use exdoc::example::Example;
use exdoc::parser::{ParseOptions, Parser};
use exdoc::source::SourceText;
use runner::report::{self, Totals};
use runner::verdict::{Status, Verdict};
use runner::{CalcEvaluator, Evaluator, Execution, RunState, ScriptedEvaluator, run_example};

fn parse(text: &str, start_line: usize, offset: i64) -> Vec<Example> {
    let parser = Parser::new(ParseOptions {
        style: StyleChoice::Auto,
        lineno_offset: offset,
    });
    let outcome = parser.parse(&SourceText::new(text, start_line, 0));
    assert!(
        outcome.errors.is_empty(),
        "unexpected parse errors: {:?}",
        outcome.errors
    );
    outcome.examples
}

fn run(text: &str) -> Vec<Verdict> {
    parse(text, 1, 0)
        .iter()
        .map(|example| {
            let mut evaluator = CalcEvaluator::new();
            run_example(example, &mut evaluator, RunState::default())
        })
        .collect()
}

fn run_one(text: &str) -> Verdict {
    let verdicts = run(text);
    assert_eq!(verdicts.len(), 1, "expected exactly one example");
    verdicts.into_iter().next().unwrap()
}

#[test]
fn passes_on_matching_output() {
    let verdict = run_one(">>> x = 2\n>>> print(x + 3)\n5\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn fails_on_mismatching_output() {
    let verdict = run_one(">>> print(4)\n5\n");
    let Status::Failed(failure) = verdict.status else {
        panic!("expected failure, got {:?}", verdict.status);
    };
    assert_eq!(failure.part, 0);
    assert_eq!(failure.line, 1);
}

#[test]
fn delayed_want_concatenates_in_order() {
    let verdict = run_one(">>> print(\"a\")\n>>> print(\"b\")\na\nb\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn delayed_want_mismatch_shows_unmatched_line() {
    let verdict = run_one(">>> print(\"a\")\n>>> print(\"b\")\na\n");
    let Status::Failed(failure) = verdict.status else {
        panic!("expected failure");
    };
    assert_eq!(failure.line, 2);
    let extra = failure
        .diff
        .lines
        .iter()
        .find(|row| !row.equal)
        .expect("a divergent row");
    assert_eq!(extra.got.as_deref(), Some("b"));
    assert_eq!(extra.want, None);
}

#[test]
fn output_free_example_passes_regardless_of_output() {
    let verdicts = run("Example:\n    x = 1\n    print(x + 1)\n");
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].status, Status::Passed);
}

#[test]
fn ignore_want_accepts_anything() {
    let verdict = run_one(">>> print(\"x\")  # exdoc: +IGNORE_WANT\ntotally wrong\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn ellipsis_matches_substrings() {
    assert_eq!(
        run_one(">>> print(\"result: 42 done\")\nresult: ...done\n").status,
        Status::Passed
    );
    assert_eq!(
        run_one(">>> print(\"result: done\")\nresult: ...done\n").status,
        Status::Passed
    );
    assert!(matches!(
        run_one(">>> print(\"result: 42 finished\")\nresult: ...done\n").status,
        Status::Failed(_)
    ));
}

#[test]
fn bare_ellipsis_want_matches_everything() {
    let verdict = run_one(">>> print(\"anything at all\")\n...\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn ellipsis_can_be_disabled() {
    let verdict = run_one(">>> print(\"result: 42\")  # exdoc: -ELLIPSIS\nresult: ...\n");
    assert!(matches!(verdict.status, Status::Failed(_)));
}

#[test]
fn blankline_marker_matches_blank_output() {
    let verdict = run_one(">>> print(\"\")\n<BLANKLINE>\n");
    assert_eq!(verdict.status, Status::Passed);

    let verdict = run_one(">>> print(\"\")  # exdoc: -BLANKLINE\n<BLANKLINE>\n");
    assert!(matches!(verdict.status, Status::Failed(_)));
}

#[test]
fn normalize_whitespace_collapses_runs() {
    let verdict = run_one(">>> print(\"a   b\")  # exdoc: +NORMALIZE_WHITESPACE\na b\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn failure_line_accounts_for_start_line_and_offset() {
    let examples = parse(">>> a = 1\n>>> b = 2\n>>> undefined_var\n", 10, 0);
    let mut evaluator = CalcEvaluator::new();
    let verdict = run_example(&examples[0], &mut evaluator, RunState::default());
    let Status::Errored(error) = verdict.status else {
        panic!("expected error");
    };
    assert_eq!(error.line, 12);

    let examples = parse(">>> a = 1\n>>> b = 2\n>>> undefined_var\n", 10, 5);
    let mut evaluator = CalcEvaluator::new();
    let verdict = run_example(&examples[0], &mut evaluator, RunState::default());
    let Status::Errored(error) = verdict.status else {
        panic!("expected error");
    };
    assert_eq!(error.line, 17);
}

#[test]
fn unexpected_error_reports_summary() {
    let verdict = run_one(">>> undefined_var\n");
    let Status::Errored(error) = verdict.status else {
        panic!("expected error");
    };
    assert!(error.summary.contains("undefined variable"));
}

#[test]
fn expected_error_matches_want() {
    let verdict = run_one(">>> 1 / 0\ndivision by zero\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn expected_error_mismatch_is_an_error() {
    let verdict = run_one(">>> 1 / 0\nsome other failure\n");
    assert!(matches!(verdict.status, Status::Errored(_)));
}

#[test]
fn skip_directive_skips_whole_example() {
    let verdict = run_one(">>> # exdoc: +SKIP\n>>> undefined_var\n");
    assert_eq!(verdict.status, Status::Skipped);
}

#[test]
fn skip_directive_on_one_part_only() {
    let verdict = run_one(">>> x = 1\n>>> undefined_var  # exdoc: +SKIP\n>>> print(x)\n1\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn default_skip_state_skips_everything() {
    let examples = parse(">>> x = 1\n", 1, 0);
    let mut evaluator = CalcEvaluator::new();
    let defaults = RunState {
        skip: true,
        ..RunState::default()
    };
    let verdict = run_example(&examples[0], &mut evaluator, defaults);
    assert_eq!(verdict.status, Status::Skipped);
}

#[test]
fn final_expression_value_compares_like_output() {
    assert_eq!(run_one(">>> 2 + 3\n5\n").status, Status::Passed);
    assert_eq!(run_one(">>> \"hi\"\n\"hi\"\n").status, Status::Passed);
}

#[test]
fn context_persists_within_an_example() {
    let verdict = run_one(">>> x = 10\n>>> y = x + 4\n>>> print(y)\n14\n");
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn context_resets_between_examples() {
    let verdicts = run(">>> x = 1\n\n>>> print(x)\n1\n");
    assert_eq!(verdicts.len(), 2);
    assert_eq!(verdicts[0].status, Status::Passed);
    assert!(matches!(verdicts[1].status, Status::Errored(_)));
}

#[test]
fn running_twice_gives_the_same_verdict() {
    let examples = parse(">>> x = 2\n>>> print(x * 2)\n4\n", 1, 0);
    let mut first_eval = CalcEvaluator::new();
    let first = run_example(&examples[0], &mut first_eval, RunState::default());
    let mut second_eval = CalcEvaluator::new();
    let second = run_example(&examples[0], &mut second_eval, RunState::default());
    assert_eq!(first, second);
}

#[test]
fn verdict_carries_style_and_line_range() {
    let verdict = run_one("No sections here.\n\n>>> x = 1\n>>> print(x)\n1\n");
    assert_eq!(verdict.style, exdoc::block::Style::Freeform);
    assert_eq!(verdict.start_line, 3);
    assert_eq!(verdict.end_line, 5);
}

#[test]
fn engine_is_evaluator_agnostic() {
    let examples = parse(">>> first()\n>>> second()\nx\ny\n", 1, 0);
    let mut evaluator = ScriptedEvaluator::new([
        Execution {
            output: "x\n".to_string(),
            ..Execution::default()
        },
        Execution {
            output: "y\n".to_string(),
            ..Execution::default()
        },
    ]);
    let verdict = run_example(&examples[0], &mut evaluator, RunState::default());
    assert_eq!(verdict.status, Status::Passed);
}

#[test]
fn scripted_error_without_want_errors_the_example() {
    let examples = parse(">>> boom()\n", 1, 0);
    let mut evaluator = ScriptedEvaluator::new([Execution {
        error: Some("kaboom".to_string()),
        ..Execution::default()
    }]);
    let verdict = run_example(&examples[0], &mut evaluator, RunState::default());
    let Status::Errored(error) = verdict.status else {
        panic!("expected error");
    };
    assert_eq!(error.summary, "kaboom");
    assert_eq!(error.line, 1);
}

#[test]
fn calc_evaluator_basics() {
    let mut calc = CalcEvaluator::new();
    let exec = calc.execute("print(1 + 2 * 3)");
    assert_eq!(exec.output, "7\n");
    assert_eq!(exec.error, None);

    calc.execute("x = 4");
    let exec = calc.execute("x * 2 - 1");
    assert_eq!(exec.value.as_deref(), Some("7"));

    let exec = calc.execute("\"ab\" + \"cd\"");
    assert_eq!(exec.value.as_deref(), Some("\"abcd\""));

    let exec = calc.execute("x > 3 ? \"big\" : \"small\"");
    assert_eq!(exec.value.as_deref(), Some("\"big\""));

    let exec = calc.execute("1 + \"no\"");
    assert!(exec.error.as_deref().is_some_and(|e| e.contains("type error")));

    let exec = calc.execute("print(\"a\", 1 < 2)");
    assert_eq!(exec.output, "a true\n");
}

#[test]
fn totals_and_failure_rendering() {
    let verdicts = run(">>> print(1)\n1\n\n>>> print(2)\n3\n");
    let totals = Totals::tally(&verdicts);
    assert_eq!(totals.passed, 1);
    assert_eq!(totals.failed, 1);
    assert!(!totals.all_ok());
    assert_eq!(totals.breakdown(), "1 passed, 1 failed");

    let detail = report::failure_lines(&verdicts[1]);
    assert!(detail[0].contains("line 4"));
    assert!(detail.iter().any(|l| l.contains("- 3")));
    assert!(detail.iter().any(|l| l.contains("+ 2")));
}

#[test]
fn checks_documents_loaded_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "Intro prose.\n\n>>> total = 2 + 2\n>>> print(total)\n4\n"
    )
    .expect("write doc");

    let text = std::fs::read_to_string(file.path()).expect("read doc");
    let verdicts = run(&text);
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].status, Status::Passed);
}
