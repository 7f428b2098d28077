// ABOUTME: Output formatting for probe progress, warnings and errors.
// ABOUTME: Every line carries the elapsed time since the run started.

use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Every step is printed
    Normal,
    /// Only warnings, errors and the final result
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Severity of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        })
    }
}

/// Run context for user-facing output. Holds the run's start instant, so
/// it is created once per run and passed to every step.
#[derive(Debug)]
pub struct Output {
    mode: OutputMode,
    started: Instant,
}

impl Output {
    /// Create the output context; the run clock starts now.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: Instant::now(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Print a progress message (suppressed in quiet mode).
    pub fn info(&self, message: &str) {
        if self.mode != OutputMode::Quiet {
            self.emit(Level::Info, message);
        }
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    /// Print the final result; shown in every mode.
    pub fn success(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn emit(&self, level: Level, message: &str) {
        let elapsed = self.elapsed();
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                let clock = Local::now().format("%H:%M.%S").to_string();
                println!("{}", format_line(elapsed, &clock, level, message));
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    level,
                    message,
                    elapsed_secs: elapsed.as_secs_f64(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }
}

/// `[<secs>,<millis> - <clock>] <LEVEL> - <message>`
pub fn format_line(elapsed: Duration, clock: &str, level: Level, message: &str) -> String {
    format!(
        "[{},{:03} - {}] {} - {}",
        elapsed.as_secs(),
        elapsed.subsec_millis(),
        clock,
        level,
        message
    )
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    level: Level,
    message: &'a str,
    elapsed_secs: f64,
}
