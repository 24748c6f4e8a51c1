use serde::Deserialize;

use exdoc::block::StyleChoice;
use exdoc::directive::Directive;
use exdoc::{ConfigError, ParseOptions};
use runner::RunState;

/// On-disk configuration, from an `exdoc.toml` file or from a checked
/// document's frontmatter.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Authoring style: auto, structured or freeform.
    pub style: Option<String>,

    /// Additive correction applied to reported line numbers.
    pub lineno_offset: Option<i64>,

    /// Default directives, e.g. ["+NORMALIZE_WHITESPACE", "-ELLIPSIS"].
    #[serde(default)]
    pub directives: Vec<String>,

    /// Only check Markdown fences whose info string equals this.
    pub lang: Option<String>,
}

/// Settings overrides given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub style: Option<String>,
    pub lineno_offset: Option<i64>,
    pub directives: Vec<String>,
    pub lang: Option<String>,
}

/// Fully resolved settings for one document.
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: ParseOptions,
    pub defaults: RunState,
    pub lang: Option<String>,
}

impl Settings {
    /// Merge layers, weakest first: config file, then document
    /// frontmatter, then command-line flags.
    pub fn resolve(
        file: Option<&FileConfig>,
        frontmatter: Option<&FileConfig>,
        flags: &Overrides,
    ) -> Result<Settings, ConfigError> {
        let mut style = None;
        let mut lineno_offset = None;
        let mut lang = None;
        let mut directives: Vec<String> = Vec::new();

        let layers = [file, frontmatter].into_iter().flatten();
        for layer in layers {
            style = layer.style.clone().or(style);
            lineno_offset = layer.lineno_offset.or(lineno_offset);
            lang = layer.lang.clone().or(lang);
            directives.extend(layer.directives.iter().cloned());
        }
        style = flags.style.clone().or(style);
        lineno_offset = flags.lineno_offset.or(lineno_offset);
        lang = flags.lang.clone().or(lang);
        directives.extend(flags.directives.iter().cloned());

        let style = match style {
            Some(s) => s.parse::<StyleChoice>()?,
            None => StyleChoice::default(),
        };

        let mut defaults = RunState::default();
        for flag in &directives {
            defaults.apply(&Directive::from_flag(flag)?);
        }

        Ok(Settings {
            options: ParseOptions {
                style,
                lineno_offset: lineno_offset.unwrap_or(0),
            },
            defaults,
            lang,
        })
    }
}

/// Split optional `---`-delimited TOML frontmatter off a document.
/// Returns the parsed config (if any), the body, and the 1-based line the
/// body starts on.
pub fn split_frontmatter(text: &str) -> Result<(Option<FileConfig>, &str, usize), ConfigError> {
    let text = text.trim_start_matches('\u{feff}');
    if !text.starts_with("---") {
        return Ok((None, text, 1));
    }

    let after_open = &text[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let Some(close) = after_open.find("\n---") else {
        return Err(ConfigError::new(
            "missing closing --- frontmatter delimiter",
        ));
    };

    let toml_str = after_open[..close].trim_end_matches('\r');
    let config: FileConfig = toml::from_str(toml_str)
        .map_err(|e| ConfigError::new(format!("frontmatter: {}", e)))?;

    let rest_start = close + 4;
    let body = after_open[rest_start..]
        .strip_prefix("\r\n")
        .or_else(|| after_open[rest_start..].strip_prefix('\n'))
        .unwrap_or(&after_open[rest_start..]);

    // Opening fence, the TOML lines, the closing fence.
    let consumed = 2 + toml_str.split('\n').count();
    Ok((Some(config), body, consumed + 1))
}
