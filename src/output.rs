// ABOUTME: User-facing CLI output as a stream of typed events.
// ABOUTME: Rendered as text (normal), results only (quiet), or one JSON object per line.

use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Final result and errors only, for CI
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Something the CLI reports while it works.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event<'a> {
    Progress {
        message: &'a str,
    },
    Warning {
        message: &'a str,
    },
    /// Work graph nodes that may run together.
    Wave {
        index: usize,
        nodes: &'a [String],
    },
    Success {
        message: &'a str,
        duration_secs: f64,
    },
    Error {
        message: &'a str,
    },
}

impl Event<'_> {
    fn to_stderr(&self) -> bool {
        matches!(self, Event::Warning { .. } | Event::Error { .. })
    }
}

/// Writes events in the configured mode. The clock starts at construction.
pub struct Output {
    mode: OutputMode,
    started: Instant,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: Instant::now(),
        }
    }

    pub fn progress(&self, message: &str) {
        self.emit(&Event::Progress { message });
    }

    pub fn warning(&self, message: &str) {
        self.emit(&Event::Warning { message });
    }

    pub fn wave(&self, index: usize, nodes: &[String]) {
        self.emit(&Event::Wave { index, nodes });
    }

    pub fn success(&self, message: &str) {
        self.emit(&Event::Success {
            message,
            duration_secs: self.started.elapsed().as_secs_f64(),
        });
    }

    pub fn error(&self, message: &str) {
        self.emit(&Event::Error { message });
    }

    fn emit(&self, event: &Event<'_>) {
        let Some(text) = render(self.mode, event) else {
            return;
        };
        if event.to_stderr() {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }
}

/// Text for `event` in `mode`, or `None` when the mode hides it.
fn render(mode: OutputMode, event: &Event<'_>) -> Option<String> {
    if mode == OutputMode::Json {
        return serde_json::to_string(event).ok();
    }

    let quiet = mode == OutputMode::Quiet;
    match event {
        Event::Progress { message } => (!quiet).then(|| message.to_string()),
        Event::Warning { message } => (!quiet).then(|| format!("Warning: {message}")),
        Event::Wave { index, nodes } => (!quiet).then(|| {
            let mut text = format!("Wave {index}:");
            for node in *nodes {
                text.push_str("\n  ");
                text.push_str(node);
            }
            text
        }),
        Event::Success { message, .. } if quiet => Some(message.to_string()),
        Event::Success {
            message,
            duration_secs,
        } => Some(format!("{message} ({duration_secs:.1}s)")),
        Event::Error { message } => Some(format!("Error: {message}")),
    }
}
