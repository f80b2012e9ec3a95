use std::io;
use std::sync::{Mutex, PoisonError};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

/// Activate buffering. While active, `warn()` calls store messages
/// instead of printing to stderr.
pub fn activate() {
    *BUFFER.lock().unwrap_or_else(PoisonError::into_inner) = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    BUFFER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .unwrap_or_default()
}

/// Write a warning message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = BUFFER.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Convenience macro that works like `eprintln!` but routes through the
/// stderr buffer when it is active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}

/// `MakeWriter` for tracing output. Each event is collected and handed to
/// [`warn`] as one message, so log lines never tear the TUI.
#[derive(Clone, Copy, Default)]
pub struct BufferedStderr;

/// Per-event writer; flushes its bytes on drop.
pub struct EventWriter {
    bytes: Vec<u8>,
}

impl io::Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.bytes);
        let line = line.trim_end();
        if !line.is_empty() {
            warn(line.to_string());
        }
    }
}

impl<'a> MakeWriter<'a> for BufferedStderr {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter { bytes: Vec::new() }
    }
}

/// Filter directive used when `PADDOCK_LOG` is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "paddock=debug" } else { "paddock=warn" }
}

/// Install the global tracing subscriber.
///
/// `PADDOCK_LOG` takes any `EnvFilter` directive and overrides `--verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("PADDOCK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // Already installed (e.g. by a test harness)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(BufferedStderr)
        .with_target(false)
        .without_time()
        .with_ansi(false)
        .try_init();
}
