//! Log output for the `quote` binary.
//!
//! Events go to stderr so the run report on stdout stays clean. An optional
//! log file receives the same events without colour.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, reload};

pub const DEFAULT_LEVEL: &str = "info";

type Reloader<T> = Box<dyn Fn(T) -> Result<()> + Send + Sync>;

// =============================================================================
// Event format
// =============================================================================

/// `HH:MM:SS.mmm LEVEL target: fields`, local time.
struct ConsoleFormat;

fn level_colour(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let time = Local::now().format("%H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{time}\x1b[0m {}{:>5}\x1b[0m \x1b[36m{}\x1b[0m: ",
                level_colour(meta.level()),
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{time} {:>5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// =============================================================================
// Log file
// =============================================================================

/// Writer for a log file opened after the subscriber is installed.
/// Output is dropped until a file is attached.
#[derive(Clone, Default)]
struct LogFile(Arc<Mutex<Option<File>>>);

impl LogFile {
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LogFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), File::flush)
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.lock())
    }
}

// =============================================================================
// Control
// =============================================================================

/// Adjusts the installed subscriber after startup.
pub struct LogControl {
    set_level: Reloader<EnvFilter>,
    set_console: Reloader<EnvFilter>,
    file: LogFile,
}

impl LogControl {
    /// Replaces the active filter. Accepts a bare level (`"debug"`) or any
    /// `EnvFilter` directive (`"quote_core=trace,warn"`).
    pub fn set_level(
        &self,
        directive: &str,
    ) -> Result<()> {
        let filter = EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level '{directive}'"))?;
        (self.set_level)(filter)
    }

    /// Shows or hides console output. The log file is unaffected.
    pub fn set_console_enabled(
        &self,
        enabled: bool,
    ) -> Result<()> {
        (self.set_console)(EnvFilter::new(if enabled { "trace" } else { "off" }))
    }

    /// Appends events to `path`, replacing any file already attached.
    pub fn attach_file(
        &self,
        path: &Path,
    ) -> Result<()> {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file: {}", path.display()))?;
        *self.file.lock() = Some(file);
        Ok(())
    }
}

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_level`.
/// Console output is coloured only when stderr is a terminal.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(default_level: &str) -> Result<LogControl> {
    let initial =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (level_layer, level_handle) = reload::Layer::new(initial);
    let (console_gate, console_handle) = reload::Layer::new(EnvFilter::new("trace"));
    let file = LogFile::default();

    let console = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(console_gate);
    let to_file = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(file.clone())
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(level_layer)
        .with(console)
        .with(to_file)
        .try_init()
        .map_err(|e| anyhow!("logging already initialized: {e}"))?;

    Ok(LogControl {
        set_level: Box::new(move |filter| {
            level_handle
                .reload(filter)
                .map_err(|e| anyhow!("filter reload failed: {e}"))
        }),
        set_console: Box::new(move |filter| {
            console_handle
                .reload(filter)
                .map_err(|e| anyhow!("console reload failed: {e}"))
        }),
        file,
    })
}
