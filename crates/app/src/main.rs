use std::fmt;
use std::sync::Arc;

use services::{DocumentCookies, ProgressReporter, ReporterConfig, ValidationPolicy};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wim_core::LessonId;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidLessonId { raw: String },
    InvalidSeconds { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLessonId { raw } => write!(f, "invalid --lesson value: {raw}"),
            ArgsError::InvalidSeconds { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_seconds(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<f64, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeconds { flag, raw: value })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- report --lesson <id> --current <secs> --duration <secs>");
    eprintln!("                             [--base-url <url>] [--cookies <cookie string>]");
    eprintln!("                             [--pass-through]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  WIM_BASE_URL, WIM_COOKIES, WIM_CSRF_COOKIE, WIM_CSRF_HEADER,");
    eprintln!("  WIM_REPORT_TIMEOUT_SECS, WIM_VALIDATION, WIM_FORWARD_COOKIES, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Report,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "report" => Some(Self::Report),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    lesson_id: LessonId,
    current_time: f64,
    duration: f64,
    base_url: Option<String>,
    cookies: String,
    pass_through: bool,
}

impl Args {
    fn parse_report(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut lesson_id = None;
        let mut current_time = None;
        let mut duration = None;
        let mut base_url = None;
        let mut cookies = std::env::var("WIM_COOKIES").unwrap_or_default();
        let mut pass_through = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--lesson" => {
                    let value = require_value(args, "--lesson")?;
                    let parsed: LessonId = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLessonId { raw: value.clone() })?;
                    lesson_id = Some(parsed);
                }
                "--current" => current_time = Some(parse_seconds(args, "--current")?),
                "--duration" => duration = Some(parse_seconds(args, "--duration")?),
                "--base-url" => base_url = Some(require_value(args, "--base-url")?),
                "--cookies" => cookies = require_value(args, "--cookies")?,
                "--pass-through" => pass_through = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            lesson_id: lesson_id.ok_or(ArgsError::MissingFlag { flag: "--lesson" })?,
            current_time: current_time.ok_or(ArgsError::MissingFlag { flag: "--current" })?,
            duration: duration.ok_or(ArgsError::MissingFlag { flag: "--duration" })?,
            base_url,
            cookies,
            pass_through,
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = match cmd {
        Command::Report => Args::parse_report(&mut argv),
    }
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = match &parsed.base_url {
        Some(url) => ReporterConfig::from_env()?.with_base_url(url)?,
        None => ReporterConfig::from_env()?,
    };
    if parsed.pass_through {
        config = config.with_validation(ValidationPolicy::PassThrough);
    }

    let cookies = DocumentCookies::new(parsed.cookies);
    if cookies.is_empty() {
        warn!("no cookies supplied; the report will be sent without a CSRF token");
    }
    let reporter = ProgressReporter::new(config, Arc::new(cookies))?;

    let handle = reporter.report(parsed.lesson_id, parsed.current_time, parsed.duration)?;
    info!(
        lesson = %parsed.lesson_id,
        base_url = %reporter.config().base_url,
        "progress report dispatched"
    );

    // The runtime shuts down when `run` returns, so the CLI waits for delivery.
    let outcome = handle.outcome().await?;
    info!(lesson = %outcome.lesson_id, status = %outcome.status, "progress report accepted");
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
