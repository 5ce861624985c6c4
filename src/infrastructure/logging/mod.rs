//! Logging setup and in-memory log capture
//!
//! Two kinds of capture exist:
//! - [`LogBuffer`]: every INFO+ event the process emits, filled by
//!   [`CaptureLayer`]. Backs the `export log` and `clear` console commands.
//! - [`ConsoleLog`]: the output of a single console dispatch, relayed back
//!   to whoever ran the command.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use chrono::{DateTime, Local};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Target used for console command output
pub const CONSOLE_TARGET: &str = "kurd_dx::console";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the global subscriber
pub fn init(history: LogBuffer) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(CaptureLayer::new(history))
        .init();
}

/// Shared buffer of formatted log lines
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.into());
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines
            .lock()
            .map(|lines| lines.is_empty())
            .unwrap_or(true)
    }
}

/// Layer appending every INFO+ event to a [`LogBuffer`]
pub struct CaptureLayer {
    buffer: LogBuffer,
}

impl CaptureLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::INFO {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(format_line(Local::now(), level, &visitor.finish()));
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        self.message + &self.fields
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

fn format_line(at: DateTime<Local>, level: Level, message: &str) -> String {
    format!("{} [{:<8}] {}", at.format(TIMESTAMP_FORMAT), level.as_str(), message)
}

/// One line written by a console command
#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// Output sink for a single console dispatch
///
/// Each line is also emitted as a tracing event so it shows up on stdout
/// and in the process-wide [`LogBuffer`].
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: CONSOLE_TARGET, "{}", message);
        self.record(Level::INFO, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(target: CONSOLE_TARGET, "{}", message);
        self.record(Level::ERROR, message);
    }

    fn record(&self, level: Level, message: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(LogLine {
                at: Local::now(),
                level,
                message,
            });
        }
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines
            .lock()
            .map(|lines| lines.is_empty())
            .unwrap_or(true)
    }

    /// Render the captured output, one line per entry
    pub fn render(&self, timestamps: bool) -> String {
        let mut out = String::new();
        for line in self.lines() {
            if timestamps {
                out.push_str(&format_line(line.at, line.level, &line.message));
            } else {
                out.push_str(&line.message);
            }
            out.push('\n');
        }
        out
    }
}
