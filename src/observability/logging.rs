//! Structured line logger.
//!
//! # Responsibilities
//! - Gate records by minimum level
//! - Carry immutable accumulated fields across derived loggers
//! - Render `timestamp [LEVEL] message key=value... caller=file:line (fn)`
//! - Serialize writes at the shared sink
//!
//! # Design Decisions
//! - Derivation (`with_field`/`with_fields`) allocates a fresh field slice and
//!   never touches the receiver, so it needs no lock
//! - Fatal terminates through an injectable [`Terminator`]
//! - Write failures are swallowed by the sink's fallback path

use std::fmt::{self, Debug, Write as _};
use std::io::Write;
use std::sync::Arc;

use crate::observability::caller::CallSite;
use crate::observability::clock::{format_timestamp, Clock, SystemClock};
use crate::observability::field::Field;
use crate::observability::level::Level;
use crate::observability::sink::Sink;

/// Exit status used by [`Logger::fatal`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// Ends the process after a fatal record has been written.
pub trait Terminator: Send + Sync + Debug {
    fn terminate(&self, code: i32);
}

/// Exits the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Structured logger handle.
///
/// Cloning is cheap; clones and derived loggers share the sink, clock and
/// terminator.
#[derive(Clone)]
pub struct Logger {
    level: Level,
    sink: Sink,
    fields: Arc<[Field]>,
    caller: bool,
    clock: Arc<dyn Clock>,
    terminator: Arc<dyn Terminator>,
}

impl Logger {
    /// Logger writing to stdout with caller attribution enabled.
    pub fn new(level: Level) -> Self {
        Self::builder().level(level).build()
    }

    /// Logger writing to a custom destination.
    pub fn with_writer<W: Write + Send + 'static>(level: Level, writer: W) -> Self {
        Self::builder().level(level).sink(Sink::new(writer)).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Configured minimum level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Fields carried by this logger, in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level == Level::Fatal || level >= self.level
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Debug, msg, fields, CallSite::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Info, msg, fields, CallSite::caller());
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Warn, msg, fields, CallSite::caller());
    }

    #[track_caller]
    pub fn error(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Error, msg, fields, CallSite::caller());
    }

    /// Write regardless of level, then terminate with status 1.
    #[track_caller]
    pub fn fatal(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Fatal, msg, fields, CallSite::caller());
    }

    /// Emit a record attributed to `site`. Fatal records also invoke the
    /// terminator after the line is written.
    pub fn log(&self, level: Level, msg: &str, fields: &[Field], site: CallSite) {
        if !self.enabled(level) {
            return;
        }

        let timestamp = format_timestamp(&self.clock.now());
        let caller = self.caller.then_some(site);
        let line = format_line(&timestamp, level, msg, &self.fields, fields, caller.as_ref());
        self.sink.write_line(&line);

        if level == Level::Fatal {
            self.terminator.terminate(FATAL_EXIT_CODE);
        }
    }

    /// New logger with one more field. The receiver is unchanged.
    pub fn with_field(
        &self,
        key: impl Into<std::borrow::Cow<'static, str>>,
        value: impl fmt::Display,
    ) -> Logger {
        self.derive(std::iter::once(Field::new(key, value)))
    }

    /// New logger with `fields` appended in order. The receiver is unchanged.
    pub fn with_fields<I>(&self, fields: I) -> Logger
    where
        I: IntoIterator,
        I::Item: Into<Field>,
    {
        self.derive(fields.into_iter().map(Into::into))
    }

    fn derive(&self, extra: impl Iterator<Item = Field>) -> Logger {
        let fields: Arc<[Field]> = self.fields.iter().cloned().chain(extra).collect();
        Logger {
            fields,
            ..self.clone()
        }
    }
}

impl Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("fields", &self.fields)
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(Level::Info)
    }
}

/// Builder for [`Logger`].
#[derive(Debug, Default)]
pub struct LoggerBuilder {
    level: Level,
    sink: Option<Sink>,
    caller: Option<bool>,
    fields: Vec<Field>,
    clock: Option<Arc<dyn Clock>>,
    terminator: Option<Arc<dyn Terminator>>,
}

impl LoggerBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn writer<W: Write + Send + 'static>(self, writer: W) -> Self {
        self.sink(Sink::new(writer))
    }

    /// Append `caller=file:line (function)` to each line. Defaults to on.
    pub fn caller(mut self, enabled: bool) -> Self {
        self.caller = Some(enabled);
        self
    }

    pub fn field(
        mut self,
        key: impl Into<std::borrow::Cow<'static, str>>,
        value: impl fmt::Display,
    ) -> Self {
        self.fields.push(Field::new(key, value));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = Some(terminator);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            level: self.level,
            sink: self.sink.unwrap_or_else(Sink::stdout),
            fields: self.fields.into(),
            caller: self.caller.unwrap_or(true),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            terminator: self.terminator.unwrap_or_else(|| Arc::new(ProcessExit)),
        }
    }
}

/// Render one log line, including the trailing newline.
///
/// Logger fields come before call-site fields; the caller token, when
/// present, is always last.
pub fn format_line(
    timestamp: &str,
    level: Level,
    msg: &str,
    logger_fields: &[Field],
    call_fields: &[Field],
    caller: Option<&CallSite>,
) -> String {
    let mut line = String::with_capacity(64 + msg.len());
    let _ = write!(line, "{} [{}] {}", timestamp, level, msg);

    for field in logger_fields.iter().chain(call_fields) {
        let _ = write!(line, " {}", field);
    }

    if let Some(site) = caller {
        let _ = write!(line, " caller={}", site);
    }

    line.push('\n');
    line
}
