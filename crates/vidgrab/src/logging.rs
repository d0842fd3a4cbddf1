//! Logging setup.
//!
//! The binary installs one `tracing` subscriber with three outputs:
//! stderr, an optional log file, and a [`LogBuffer`] that the console
//! window drains. The filter comes from the first of `--log-level`, the
//! `VIDGRAB_LOG` environment variable and the `log_level` setting.

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "VIDGRAB_LOG";

/// Filter used when the configured one does not parse.
pub const FALLBACK_FILTER: &str = "info";

/// Log targets used across the application.
pub mod targets {
    /// Startup and command line.
    pub const APP: &str = "vidgrab";
    /// Settings file handling.
    pub const CONFIG: &str = "vidgrab::config";
    /// Extractor calls.
    pub const MODEL: &str = "vidgrab::model";
    /// User actions and their outcome.
    pub const PRESENTER: &str = "vidgrab::presenter";
    /// The console window.
    pub const CONSOLE: &str = "vidgrab::console";
}

/// Pick the filter directive: command line, then environment, then settings.
pub fn resolve_filter(cli: Option<&str>, env: Option<&str>, config: &str) -> String {
    [cli, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|directive| !directive.is_empty())
        .unwrap_or(config)
        .to_string()
}

/// Install the global subscriber.
///
/// Lines are mirrored into `buffer`; when `log_file` is given they are
/// also appended to that file. An unparsable directive falls back to
/// [`FALLBACK_FILTER`] with a warning.
pub fn init(directives: &str, buffer: LogBuffer, log_file: Option<&Path>) -> Result<()> {
    let (filter, bad_directive) = match EnvFilter::try_new(directives) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(FALLBACK_FILTER), Some(err)),
    };

    let file_layer = log_file
        .map(|path| std::fs::OpenOptions::new().create(true).append(true).open(path))
        .transpose()?
        .map(|file| fmt::layer().with_ansi(false).with_writer(Arc::new(file)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).without_time().with_writer(buffer))
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    if let Some(err) = bad_directive {
        tracing::warn!(target: targets::APP, directives, %err, "invalid log filter, using {FALLBACK_FILTER}");
    }
    Ok(())
}

/// Bounded in-memory copy of formatted log lines.
///
/// Cloning yields another handle to the same buffer. When full, the oldest
/// lines are discarded.
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<BufferState>>,
}

struct BufferState {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    /// Buffer keeping at most `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BufferState {
                lines: VecDeque::new(),
                capacity: capacity.max(1),
            })),
        }
    }

    /// Append one line.
    pub fn push_line(&self, line: impl Into<String>) {
        let mut state = self.inner.lock();
        if state.lines.len() == state.capacity {
            state.lines.pop_front();
        }
        state.lines.push_back(line.into());
    }

    /// Remove and return every buffered line, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.inner.lock().lines.drain(..).collect()
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer").field("len", &self.len()).finish()
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter {
            buffer: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// Writer handed out per event; complete lines reach the buffer on flush
/// or drop.
pub struct LogBufferWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl LogBufferWriter {
    fn push_complete_lines(&mut self) {
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.buffer
                .push_line(String::from_utf8_lossy(&line[..end]).into_owned());
        }
    }
}

impl io::Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.push_complete_lines();
        Ok(())
    }
}

impl Drop for LogBufferWriter {
    fn drop(&mut self) {
        self.push_complete_lines();
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.buffer.push_line(String::from_utf8_lossy(&rest).into_owned());
        }
    }
}
