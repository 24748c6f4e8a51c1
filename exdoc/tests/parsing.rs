use exdoc::block::{Style, StyleChoice};
use exdoc::directive::{DirectiveName, Scope};
use exdoc::example::Example;
use exdoc::markdown;
use exdoc::parser::balance::{Balance, scan};
use exdoc::parser::{ParseOptions, Parser};
use exdoc::source::SourceText;

fn parse_with(text: &str, style: StyleChoice, start_line: usize, offset: i64) -> Vec<Example> {
    let parser = Parser::new(ParseOptions {
        style,
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

fn parse(text: &str) -> Vec<Example> {
    parse_with(text, StyleChoice::Auto, 1, 0)
}

#[test]
fn freeform_statement_and_want() {
    let examples = parse("prose before\n\n>>> x = 1\n>>> print(x)\n1\n\nprose after\n");
    assert_eq!(examples.len(), 1);
    let example = &examples[0];
    assert_eq!(example.style, Style::Freeform);
    assert_eq!(example.parts.len(), 2);
    assert_eq!(example.parts[0].source, "x = 1");
    assert_eq!(example.parts[0].want, None);
    assert_eq!(example.parts[1].source, "print(x)");
    assert_eq!(example.parts[1].want.as_deref(), Some("1\n"));
}

#[test]
fn freeform_blank_line_separates_examples() {
    let examples = parse(">>> x = 1\n\n>>> y = 2\n");
    assert_eq!(examples.len(), 2);
    assert_eq!(examples[0].parts[0].source, "x = 1");
    assert_eq!(examples[1].parts[0].source, "y = 2");
}

#[test]
fn freeform_indented_block() {
    let examples = parse("Usage:\n\n    >>> total = 1 + 2\n    >>> print(total)\n    3\n");
    assert_eq!(examples.len(), 1);
    let example = &examples[0];
    assert_eq!(example.parts[1].want.as_deref(), Some("3\n"));
    assert_eq!(example.start_line, 3);
}

#[test]
fn bracket_continuation_joins_statement() {
    let examples = parse(">>> x = (1 +\n>>>      2)\n>>> print(x)\n3\n");
    assert_eq!(examples[0].parts.len(), 2);
    assert_eq!(examples[0].parts[0].source, "x = (1 +\n     2)");
}

#[test]
fn secondary_prompt_continuation() {
    let examples = parse(">>> x = (1 +\n...      2)\n");
    assert_eq!(examples[0].parts.len(), 1);
    assert_eq!(examples[0].parts[0].source, "x = (1 +\n     2)");
}

#[test]
fn multiline_string_stays_one_statement() {
    let text = ">>> s = '''\n    line one\n\n    line two '''\n>>> t = 1\n";
    let examples = parse(text);
    assert_eq!(examples.len(), 1);
    let parts = &examples[0].parts;
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].source, "s = '''\nline one\n\nline two '''");
    assert_eq!(parts[1].line, 5);
}

#[test]
fn bare_secondary_prompt_is_a_want_line() {
    let examples = parse(">>> print(word)\n...\n");
    assert_eq!(examples[0].parts[0].want.as_deref(), Some("...\n"));
}

#[test]
fn delayed_want_leaves_early_parts_unbound() {
    let examples = parse(">>> print(a)\n>>> print(b)\na\nb\n");
    let parts = &examples[0].parts;
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].want, None);
    assert_eq!(parts[1].want.as_deref(), Some("a\nb\n"));
}

#[test]
fn absolute_lines_from_start_line() {
    let examples = parse_with(">>> a = 1\n>>> b = 2\n>>> c = 3\n", StyleChoice::Auto, 10, 0);
    let parts = &examples[0].parts;
    assert_eq!(parts[0].line, 10);
    assert_eq!(parts[2].line, 12);
}

#[test]
fn lineno_offset_shifts_all_lines() {
    let examples = parse_with(">>> a = 1\n>>> b = 2\n", StyleChoice::Auto, 10, 5);
    assert_eq!(examples[0].start_line, 15);
    assert_eq!(examples[0].parts[1].line, 16);
}

#[test]
fn part_line_ranges_are_monotonic() {
    let examples = parse(">>> print(a)\nout a\n>>> x = (1 +\n>>>      2)\n>>> print(x)\n3\n");
    let parts = &examples[0].parts;
    let mut previous_end = 0;
    for part in parts {
        assert!(part.line > previous_end, "parts overlap at line {}", part.line);
        previous_end = part.line + part.n_lines - 1;
    }
}

#[test]
fn unclosed_statement_is_a_local_error() {
    let parser = Parser::new(ParseOptions::default());
    let outcome = parser.parse(&SourceText::new(
        ">>> x = (1 +\n\n>>> y = 2\n",
        1,
        0,
    ));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].line, 1);
    // The sibling block after the blank line still parses.
    assert_eq!(outcome.examples.len(), 1);
    assert_eq!(outcome.examples[0].parts[0].source, "y = 2");
}

#[test]
fn empty_block_is_discarded() {
    let examples = parse(">>>\n");
    assert!(examples.is_empty());
}

#[test]
fn inline_directive_binds_to_part() {
    let examples = parse(">>> x = 1  # exdoc: +SKIP\n>>> y = 2\n");
    let parts = &examples[0].parts;
    assert_eq!(parts[0].source, "x = 1");
    assert_eq!(parts[0].directives.len(), 1);
    assert_eq!(parts[0].directives[0].name, DirectiveName::Skip);
    assert!(parts[0].directives[0].enabled);
    assert_eq!(parts[0].directives[0].scope, Scope::Part);
    assert!(parts[1].directives.is_empty());
}

#[test]
fn comment_only_directive_binds_to_example() {
    let examples = parse(">>> # exdoc: -ELLIPSIS\n>>> y = 2\n");
    let parts = &examples[0].parts;
    assert_eq!(parts[0].source, "");
    assert_eq!(parts[0].example_directives.len(), 1);
    assert_eq!(parts[0].example_directives[0].name, DirectiveName::Ellipsis);
    assert!(!parts[0].example_directives[0].enabled);
    assert_eq!(parts[0].example_directives[0].scope, Scope::Example);
}

#[test]
fn doctest_prefix_is_accepted() {
    let examples = parse(">>> x = 1  # doctest: +IGNORE_WANT\n");
    assert_eq!(
        examples[0].parts[0].directives[0].name,
        DirectiveName::IgnoreWant
    );
}

#[test]
fn unknown_directive_is_an_error_with_a_line() {
    let parser = Parser::new(ParseOptions::default());
    let outcome = parser.parse(&SourceText::new(">>> a = 1\n>>> b = 2  # exdoc: +BOGUS\n", 1, 0));
    assert!(outcome.examples.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].line, 2);
    assert!(outcome.errors[0].message.contains("BOGUS"));
}

#[test]
fn marker_inside_string_is_not_a_directive() {
    let examples = parse(">>> s = \"# exdoc: +SKIP\"\n");
    assert!(examples[0].parts[0].directives.is_empty());
    assert_eq!(examples[0].parts[0].source, "s = \"# exdoc: +SKIP\"");
}

#[test]
fn structured_section_with_prompts() {
    let text = "Adds numbers.\n\nExample:\n    >>> x = 1\n    >>> print(x)\n    1\n\nMore prose.\n";
    let examples = parse_with(text, StyleChoice::Structured, 1, 0);
    assert_eq!(examples.len(), 1);
    let example = &examples[0];
    assert_eq!(example.style, Style::Structured);
    assert_eq!(example.start_line, 4);
    assert_eq!(example.parts.len(), 2);
    assert_eq!(example.parts[1].want.as_deref(), Some("1\n"));
}

#[test]
fn structured_blank_lines_are_interior() {
    let text = "Example:\n    >>> x = 1\n\n    >>> print(x)\n    1\n";
    let examples = parse_with(text, StyleChoice::Structured, 1, 0);
    assert_eq!(examples.len(), 1);
    assert_eq!(examples[0].parts.len(), 2);
}

#[test]
fn structured_code_only_body() {
    let text = "Example:\n    value = f(\n        1, 2)\n    print(value)\n";
    let examples = parse_with(text, StyleChoice::Structured, 1, 0);
    assert_eq!(examples.len(), 1);
    let parts = &examples[0].parts;
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].source, "value = f(\n    1, 2)");
    assert_eq!(parts[0].want, None);
    assert_eq!(parts[1].source, "print(value)");
}

#[test]
fn structured_empty_section_is_discarded() {
    let examples = parse_with("Example:\n\nNothing indented here.\n", StyleChoice::Structured, 1, 0);
    assert!(examples.is_empty());
}

#[test]
fn auto_prefers_structured() {
    let text = ">>> loose = 1\n\nExample:\n    >>> x = 1\n";
    let examples = parse(text);
    assert_eq!(examples.len(), 1);
    assert_eq!(examples[0].style, Style::Structured);
}

#[test]
fn auto_falls_back_to_freeform() {
    let examples = parse("No sections here.\n\n>>> x = 1\n");
    assert_eq!(examples.len(), 1);
    assert_eq!(examples[0].style, Style::Freeform);
}

#[test]
fn style_choice_parses_and_rejects() {
    assert_eq!("freeform".parse::<StyleChoice>(), Ok(StyleChoice::Freeform));
    assert!("fancy".parse::<StyleChoice>().is_err());
}

#[test]
fn balance_scan() {
    assert_eq!(scan("x = 1"), Balance::Balanced);
    assert_eq!(scan("x = (1 +"), Balance::Open);
    assert_eq!(scan("x = [1, (2)"), Balance::Open);
    assert_eq!(scan("x = 1)"), Balance::Mismatched);
    assert_eq!(scan("s = '''abc"), Balance::Open);
    assert_eq!(scan("s = \"abc"), Balance::Mismatched);
    assert_eq!(scan("x = 1  # (unclosed in comment"), Balance::Balanced);
    assert_eq!(scan("x = 1 + \\"), Balance::Open);
    assert_eq!(scan("s = \"()\""), Balance::Balanced);
}

#[test]
fn markdown_fence_lines() {
    let text = "# Title\n\n```text\n>>> x = 1\n```\n\nplain paragraph\n\n```\nno info\n```\n";
    let fences = markdown::fences(text);
    assert_eq!(fences.len(), 2);
    assert_eq!(fences[0].info, "text");
    assert_eq!(fences[0].content, ">>> x = 1\n");
    assert_eq!(fences[0].start_line, 4);
    assert_eq!(fences[1].info, "");
    assert_eq!(fences[1].start_line, 10);
}

#[test]
fn markdown_fence_to_source_keeps_lines() {
    let text = "intro\n\n```\n>>> a = 1\n>>> b = 2\n>>> c = 3\n```\n";
    let fences = markdown::fences(text);
    let source = fences[0].to_source(0);
    let examples = parse_with(&source.text, StyleChoice::Auto, source.start_line, 0);
    assert_eq!(examples[0].parts[2].line, 6);
}

#[test]
fn tabs_expand_to_column_stops() {
    let examples = parse(">>> print(cols)\na\tb\n");
    assert_eq!(examples[0].parts[0].want.as_deref(), Some("a       b\n"));
}
