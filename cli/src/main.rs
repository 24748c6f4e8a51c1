mod config;

use std::path::Path;
use std::process;

use clap::{Parser as CliParser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use exdoc::parser::Parser;
use exdoc::source::SourceText;
use exdoc::{ConfigError, markdown};
use runner::report::{self, Totals};
use runner::verdict::Verdict;
use runner::{CalcEvaluator, run_example};

use crate::config::{FileConfig, Overrides, Settings};

const SUBCOMMANDS: &[&str] = &["check", "extract", "help"];

#[derive(CliParser)]
#[command(
    name = "exdoc",
    version,
    about = "Extract and verify examples embedded in documentation"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the examples found in documentation files
    Check(CheckArgs),

    /// List discovered examples without running them
    Extract(ExtractArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Documentation files to check
    #[arg(required = true)]
    files: Vec<String>,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Only print failures and the summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Documentation files to scan
    #[arg(required = true)]
    files: Vec<String>,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<String>,
}

#[derive(clap::Args)]
struct SettingsArgs {
    /// Authoring style: auto, structured or freeform
    #[arg(short, long)]
    style: Option<String>,

    /// Additive correction applied to reported line numbers
    #[arg(long)]
    offset: Option<i64>,

    /// Default directives, e.g. +NORMALIZE_WHITESPACE or -ELLIPSIS
    #[arg(short = 'd', long = "directive")]
    directives: Vec<String>,

    /// Only check Markdown fences with this info string
    #[arg(long)]
    lang: Option<String>,
}

impl SettingsArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            style: self.style.clone(),
            lineno_offset: self.offset,
            directives: self.directives.clone(),
            lang: self.lang.clone(),
        }
    }
}

fn main() {
    // Backwards compatibility: if the first positional arg is not a known
    // subcommand, inject "check" so `exdoc file.md` works like
    // `exdoc check file.md`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(first_pos) = args.iter().skip(1).find(|a| !a.starts_with('-')) {
        let first_pos = first_pos.clone();
        if !SUBCOMMANDS.contains(&first_pos.as_str()) {
            let pos = args.iter().position(|a| *a == first_pos).unwrap();
            args.insert(pos, "check".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Check(check) => do_check(check, cli.no_color),
        Command::Extract(extract) => do_extract(extract, cli.no_color),
    }
}

/// One parsed input document: either a whole text file or one Markdown
/// fence, plus the settings that apply to it.
struct Document {
    sources: Vec<SourceText>,
    settings: Settings,
}

fn load_document(
    path: &str,
    file_config: Option<&FileConfig>,
    flags: &Overrides,
    files: &mut SimpleFiles<String, String>,
) -> Result<Document, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::new(format!("cannot read '{}': {}", path, e)))?;

    let (frontmatter, body, body_line) = config::split_frontmatter(&raw)?;
    let settings = Settings::resolve(file_config, frontmatter.as_ref(), flags)?;

    let body = body.to_string();
    let file_id = files.add(path.to_string(), body.clone());

    let is_markdown = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"));

    let sources = if is_markdown {
        markdown::fences(&body)
            .into_iter()
            .filter(|f| match &settings.lang {
                Some(lang) => f.info == *lang,
                None => true,
            })
            .map(|f| {
                let mut source = f.to_source(file_id);
                source.start_line += body_line - 1;
                source
            })
            .collect()
    } else {
        vec![SourceText::new(body, body_line, file_id)]
    };

    Ok(Document { sources, settings })
}

fn load_file_config(path: Option<&str>) -> Result<Option<FileConfig>, ConfigError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::new(format!("cannot read '{}': {}", path, e)))?;
    let config = toml::from_str(&raw)
        .map_err(|e| ConfigError::new(format!("{}: {}", path, e)))?;
    Ok(Some(config))
}

fn config_bail(err: ConfigError) -> ! {
    eprintln!("configuration error: {}", err);
    process::exit(2);
}

fn do_check(args: CheckArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();

    let file_config = match load_file_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(err) => config_bail(err),
    };
    let flags = args.settings.overrides();

    let mut files = SimpleFiles::new();
    let mut verdicts: Vec<Verdict> = Vec::new();
    let mut parse_errors = 0usize;

    for path in &args.files {
        let document = match load_document(path, file_config.as_ref(), &flags, &mut files) {
            Ok(d) => d,
            Err(err) => config_bail(err),
        };

        let parser = Parser::new(document.settings.options);
        for source in &document.sources {
            let outcome = parser.parse(source);

            for error in &outcome.errors {
                parse_errors += 1;
                let diagnostic = error.to_diagnostic();
                let _ =
                    term::emit_to_write_style(&mut writer.lock(), &term_config, &files, &diagnostic);
            }

            for example in &outcome.examples {
                let mut evaluator = CalcEvaluator::new();
                let verdict = run_example(example, &mut evaluator, document.settings.defaults);

                let show = !args.quiet || !verdict.ok();
                if show {
                    eprintln!(
                        "  {}  {}",
                        status_label(&verdict, no_color),
                        report::describe(path, &verdict)
                    );
                    for line in report::failure_lines(&verdict) {
                        eprintln!("      {}", line);
                    }
                }
                verdicts.push(verdict);
            }
        }
    }

    let totals = Totals::tally(&verdicts);
    eprintln!();
    let ok = totals.all_ok() && parse_errors == 0;
    let word = if ok {
        paint("ok", "\x1b[32m", no_color)
    } else {
        paint("FAILED", "\x1b[31m", no_color)
    };
    let mut summary = format!("test result: {}. {}", word, totals.breakdown());
    if parse_errors > 0 {
        summary.push_str(&format!(", {} parse error(s)", parse_errors));
    }
    eprintln!("{}", summary);

    process::exit(if ok { 0 } else { 1 });
}

fn do_extract(args: ExtractArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();

    let file_config = match load_file_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(err) => config_bail(err),
    };
    let flags = args.settings.overrides();

    let mut files = SimpleFiles::new();
    let mut found = 0usize;

    for path in &args.files {
        let document = match load_document(path, file_config.as_ref(), &flags, &mut files) {
            Ok(d) => d,
            Err(err) => config_bail(err),
        };

        let parser = Parser::new(document.settings.options);
        for source in &document.sources {
            let outcome = parser.parse(source);
            for error in &outcome.errors {
                let diagnostic = error.to_diagnostic();
                let _ =
                    term::emit_to_write_style(&mut writer.lock(), &term_config, &files, &diagnostic);
            }
            for example in &outcome.examples {
                found += 1;
                println!(
                    "{}:{}-{}  {}  {} part(s)",
                    path,
                    example.start_line,
                    example.end_line,
                    example.style,
                    example.parts.len()
                );
            }
        }
    }

    if found == 0 {
        eprintln!("no examples found");
    }
}

fn status_label(verdict: &Verdict, no_color: bool) -> String {
    let color = match verdict.label() {
        "PASS" => "\x1b[32m",
        "SKIP" => "\x1b[33m",
        _ => "\x1b[31m",
    };
    paint(verdict.label(), color, no_color)
}

fn paint(text: &str, color: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("{}{}\x1b[0m", color, text)
    }
}
