//! Output destinations for formatted log lines.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Shared handle to a line destination.
///
/// Every logger derived from the same base clones the same `Sink`, so the
/// mutex guarding the writer is per destination rather than per logger and
/// concurrent lines never interleave.
#[derive(Clone)]
pub struct Sink {
    primary: SharedWriter,
    fallback: SharedWriter,
}

impl Sink {
    /// Sink writing to `writer`, falling back to stderr.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self::with_fallback(writer, io::stderr())
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn with_fallback<W, F>(writer: W, fallback: F) -> Self
    where
        W: Write + Send + 'static,
        F: Write + Send + 'static,
    {
        Self {
            primary: Arc::new(Mutex::new(Box::new(writer))),
            fallback: Arc::new(Mutex::new(Box::new(fallback))),
        }
    }

    /// Write one complete line.
    ///
    /// Errors never reach the caller: a failed primary write is retried once
    /// on the fallback writer and any fallback error is dropped.
    pub fn write_line(&self, line: &str) {
        if Self::write_to(&self.primary, line).is_err() {
            let _ = Self::write_to(&self.fallback, line);
        }
    }

    fn write_to(writer: &SharedWriter, line: &str) -> io::Result<()> {
        let mut guard = writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink mutex poisoned"))?;
        guard.write_all(line.as_bytes())?;
        guard.flush()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

/// In-memory writer whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Written lines without their terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().map(|b| b.is_empty()).unwrap_or(true)
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
