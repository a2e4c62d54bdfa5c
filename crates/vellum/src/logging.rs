//! Terminal output of a build.
//!
//! The filter is read from `VELLUM_LOG`, then `RUST_LOG`, and defaults to `info`.
use colored::{ColoredString, Colorize};
use env_logger::{Builder, Env};
use log::{Level, Record, info};
use std::io::{self, Write};
use std::time::Duration;

/// Records logged with this target are printed as-is, without timestamp or target.
pub(crate) const PLAIN: &str = "plain";

const TARGET_WIDTH: usize = 8;

/// How [`format_elapsed_time`] colours a duration.
pub struct ElapsedStyle<'a> {
    pub(crate) yellow_after: Duration,
    pub(crate) red_after: Duration,
    pub(crate) decorate: Option<&'a (dyn Fn(ColoredString) -> ColoredString + Sync)>,
}

impl ElapsedStyle<'_> {
    /// For a single step, such as loading content or rendering one page.
    pub fn step() -> Self {
        Self {
            yellow_after: Duration::from_millis(100),
            red_after: Duration::from_millis(500),
            decorate: None,
        }
    }

    /// For a whole phase of the build.
    pub fn phase() -> Self {
        Self {
            yellow_after: Duration::from_secs(2),
            red_after: Duration::from_secs(5),
            decorate: None,
        }
    }
}

impl Default for ElapsedStyle<'_> {
    fn default() -> Self {
        Self::step()
    }
}

fn is_quiet() -> bool {
    std::env::var_os("VELLUM_QUIET").is_some() || std::env::args().any(|arg| arg == "--quiet")
}

/// Installs the Vellum logger. Later calls are no-ops, so several builds can run in one process.
pub fn init_logging() {
    let env = Env::default().filter_or(
        "VELLUM_LOG",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    );

    let _ = Builder::from_env(env)
        .format(|buf, record| {
            if is_quiet() {
                return Ok(());
            }
            let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
            write_record(buf, record, &timestamp)
        })
        .try_init();
}

fn write_record(out: &mut dyn Write, record: &Record, timestamp: &str) -> io::Result<()> {
    if record.target() == PLAIN {
        return writeln!(out, "{}", record.args());
    }

    let target = format!("{:>width$}", record.target().to_ascii_lowercase(), width = TARGET_WIDTH);
    let label = match record.level() {
        Level::Error => target.bold().red(),
        Level::Warn => target.bold().yellow(),
        Level::Info => target.bold().cyan(),
        Level::Debug | Level::Trace => target.dimmed(),
    };

    match record.level() {
        Level::Error | Level::Warn => writeln!(
            out,
            "{} {} {}: {}",
            timestamp.dimmed(),
            label,
            record.level().as_str().to_ascii_lowercase(),
            record.args()
        ),
        _ => writeln!(out, "{} {} {}", timestamp.dimmed(), label, record.args()),
    }
}

/// Short human form of a duration, coloured by `style`.
pub fn format_elapsed_time(elapsed: Duration, style: &ElapsedStyle) -> ColoredString {
    let text = if elapsed < Duration::from_millis(1) {
        format!("{}μs", elapsed.as_micros())
    } else if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else if elapsed < Duration::from_secs(60) {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else {
        format!("{}m{}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    };

    let coloured = if elapsed >= style.red_after {
        text.red()
    } else if elapsed >= style.yellow_after {
        text.yellow()
    } else {
        text.normal()
    };

    match style.decorate {
        Some(decorate) => decorate(coloured),
        None => coloured,
    }
}

/// Blank line, then a highlighted heading for the next phase of the build.
pub fn print_section(title: &str) {
    info!(target: PLAIN, "");
    info!(target: PLAIN, "{}", format!(" {} ", title).on_green().bold());
}
