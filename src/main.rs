//! Purpose: `swatchbook` CLI entry point and command definitions.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (human or JSON by command/flags).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]

use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};

mod command_dispatch;
mod seed;
mod serve;
mod swatch;

use swatchbook::api::{Error, ErrorKind, to_exit_code};
use swatchbook::paths::resolve_data_dir;

const DEFAULT_BIND: &str = "127.0.0.1:5003";
const DEFAULT_MAX_BODY_BYTES: u64 = 262_144;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let data_dir = resolve_data_dir(cli.dir.as_deref());
    let color_mode = cli.color;

    let result = command_dispatch::dispatch_command(cli.command, data_dir, color_mode);

    result
        .map_err(add_corrupt_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "swatchbook",
    version,
    about = "Tagged color-palette catalog with a paginated HTTP API",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Palettes are 3-5 hex colors plus up to 3 tags, stored newest-first.

Mental model:
  - `add` submits a palette (create)
  - `list` pages through the catalog (filter by tag and search)
  - `tags` shows the tag universe (or the popularity ranking)
"#,
    after_help = r#"EXAMPLES
  $ swatchbook add '#1fa2ff' '#12d8fa' '#a6ffcb' --tag sea --tag calm
  $ swatchbook list --tag sea --limit 5
  $ swatchbook tags --popular
  $ swatchbook serve                  # http://127.0.0.1:5003/api/palettes

LEARN MORE
  $ swatchbook <command> --help
  https://github.com/sandover/swatchbook"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        help = "Data directory for the palette store (default: ~/.swatchbook)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize swatches and stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "Submit a new palette",
        long_about = r#"Validate and store a palette: 3-5 hex colors, up to 3 tags.

Colors are #rrggbb strings; tags are short labels used for filtering."#,
        after_help = r#"EXAMPLES
  $ swatchbook add '#1fa2ff' '#12d8fa' '#a6ffcb'
  $ swatchbook add '#232526' '#414345' '#6b6e70' --tag dark --tag minimal
  $ swatchbook add '#ff9a9e' '#fad0c4' '#ffd1ff' --remote http://127.0.0.1:5003

NOTES
  - Validation failures exit with code 3 and never write to the store"#
    )]
    Add {
        #[arg(required = true, help = "Palette colors as #rrggbb hex strings (3-5)")]
        colors: Vec<String>,
        #[arg(long, help = "Repeatable tag for the palette (at most 3)")]
        tag: Vec<String>,
        #[arg(long, help = "Emit the created record as JSON")]
        json: bool,
        #[arg(
            long,
            value_name = "URL",
            help = "Route the operation through a swatchbook server",
            help_heading = "Remote"
        )]
        remote: Option<String>,
    },
    #[command(
        about = "List palettes, newest first",
        long_about = r#"Page through the catalog with optional tag and search filters.

Repeated --tag values must all be present on a palette (AND, not OR).
--search matches tag substrings, case-insensitively."#,
        after_help = r#"EXAMPLES
  $ swatchbook list
  $ swatchbook list --tag sea --tag calm
  $ swatchbook list --search past --limit 5
  $ swatchbook list --page 2 --json | jq '.pagination'

NOTES
  - Default page size is 12; out-of-range pages return an empty list
  - --json emits the same { results, pagination } document as the HTTP API"#
    )]
    List {
        #[arg(long, help = "Page number (default 1)")]
        page: Option<u64>,
        #[arg(long, help = "Page size (default 12)")]
        limit: Option<u64>,
        #[arg(long = "tag", help = "Require this tag (repeatable; AND across repeats)")]
        tag: Vec<String>,
        #[arg(long, help = "Case-insensitive tag substring filter")]
        search: Option<String>,
        #[arg(long, help = "Emit JSON instead of human-readable rows")]
        json: bool,
        #[arg(
            long,
            value_name = "URL",
            help = "Route the operation through a swatchbook server",
            help_heading = "Remote"
        )]
        remote: Option<String>,
    },
    #[command(
        about = "List tags in use, or the popularity ranking",
        after_help = r#"EXAMPLES
  $ swatchbook tags
  $ swatchbook tags --popular
  $ swatchbook tags --popular --limit 3 --json"#
    )]
    Tags {
        #[arg(long, help = "Rank tags by occurrence count instead of listing all")]
        popular: bool,
        #[arg(long, help = "Ranking size for --popular (default 8)")]
        limit: Option<usize>,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
        #[arg(
            long,
            value_name = "URL",
            help = "Route the operation through a swatchbook server",
            help_heading = "Remote"
        )]
        remote: Option<String>,
    },
    #[command(
        about = "Generate sample palettes",
        long_about = r#"Fill the catalog with generated palettes from classic color schemes
(monochrome, analogous, complementary, triadic)."#,
        after_help = r#"EXAMPLES
  $ swatchbook seed
  $ swatchbook seed --count 50
  $ swatchbook seed --scheme triadic --count 5 --json"#
    )]
    Seed {
        #[arg(long, default_value_t = seed::DEFAULT_SEED_COUNT, help = "Number of palettes to generate")]
        count: usize,
        #[arg(long, value_enum, help = "Pin one color-scheme family (default: random mix)")]
        scheme: Option<seed::Scheme>,
        #[arg(long, help = "Emit the created records as JSON")]
        json: bool,
    },
    #[command(
        about = "Show catalog location and counts",
        after_help = r#"EXAMPLES
  $ swatchbook info
  $ swatchbook info --json"#
    )]
    Info {
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        about = "Serve the catalog over HTTP",
        long_about = r#"Serve the palette catalog REST API.

Routes: GET /api/palettes, POST /api/palettes, GET /api/tags,
GET /api/tags/popular, GET /healthz."#,
        after_help = r#"EXAMPLES
  $ swatchbook serve
  $ swatchbook serve --bind 127.0.0.1:8080
  $ swatchbook serve --cors-origin https://gallery.example.com

NOTES
  - Without --cors-origin the API allows any origin (browser-gallery posture)
  - Safety limit: --max-body-bytes caps creation payloads"#
    )]
    Serve {
        #[arg(long, default_value = DEFAULT_BIND, help = "Bind address")]
        bind: String,
        #[arg(
            long = "cors-origin",
            value_name = "ORIGIN",
            help = "Allow browser requests from this origin only (repeatable)"
        )]
        cors_origin: Vec<String>,
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_BODY_BYTES,
            help = "Max request body size in bytes"
        )]
        max_body_bytes: u64,
    },
    #[command(about = "Print version info")]
    Version {
        #[arg(long, help = "Emit JSON regardless of terminal")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ swatchbook completion bash > ~/.local/share/bash-completion/completions/swatchbook
  $ swatchbook completion zsh > ~/.zfunc/_swatchbook
  $ swatchbook completion fish > ~/.config/fish/completions/swatchbook.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => err.with_hint(
            "Permission denied. Check directory permissions or use --dir to a writable location.",
        ),
        ErrorKind::Io => err.with_hint("I/O error. Check the path, filesystem, and disk space."),
        _ => err,
    }
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Corrupt || err.hint().is_some() {
        return err;
    }
    err.with_hint("Palette store has an unreadable record. Inspect or remove the reported line.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

fn emit_json(value: Value, _color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let json = if is_tty {
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Validation => "invalid palette".to_string(),
        ErrorKind::InvalidQuery => "invalid query".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Corrupt => "corrupt data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(line) = err.line() {
        lines.push(format!(
            "{} {line}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn emit_version_output(color_mode: ColorMode, json: bool) {
    if !json && io::stdout().is_terminal() {
        println!("swatchbook {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "swatchbook",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

fn emit_serve_startup_guidance(config: &serve::ServeConfig, store_file: &Path) {
    if !io::stderr().is_terminal() {
        return;
    }
    for line in build_serve_startup_lines(config, store_file) {
        eprintln!("{line}");
    }
}

fn build_serve_startup_lines(config: &serve::ServeConfig, store_file: &Path) -> Vec<String> {
    let base_url = format!("http://{}", config.bind);
    let cors = if config.cors_allowed_origins.is_empty() {
        "any-origin".to_string()
    } else {
        format!("allowlist ({})", config.cors_allowed_origins.len())
    };

    vec![
        format!("Serving palettes on {base_url}"),
        String::new(),
        format!("  Store: {}", store_file.display()),
        format!("  CORS:  {cors}"),
        String::new(),
        "Try it:".to_string(),
        String::new(),
        format!("  swatchbook list --remote {base_url}"),
        format!("  curl -sS '{base_url}/api/palettes?limit=3'"),
        "  curl -sS -X POST -H 'content-type: application/json' \\".to_string(),
        "    --data '{\"colors\":[\"#1fa2ff\",\"#12d8fa\",\"#a6ffcb\"],\"tags\":[\"sea\"]}' \\"
            .to_string(),
        format!("    '{base_url}/api/palettes'"),
        String::new(),
        "Press Ctrl-C to stop.".to_string(),
    ]
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let usage = err
        .to_string()
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: ").map(str::to_string));

    let Some(usage) = usage else {
        return "Try `swatchbook --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "swatchbook") else {
        return "Try `swatchbook --help`.".to_string();
    };

    let mut parts = Vec::new();
    for token in tokens.iter().skip(pos + 1) {
        if token.starts_with('-') || token.starts_with('<') || token.starts_with('[') {
            break;
        }
        parts.push(*token);
    }

    if parts.is_empty() {
        return "Try `swatchbook --help`.".to_string();
    }
    format!("Try `swatchbook {} --help`.", parts.join(" "))
}
