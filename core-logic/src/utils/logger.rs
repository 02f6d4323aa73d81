use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use std::str::FromStr;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Target used by the pipeline log macros; always shown on the console.
pub const TASK_RESULT_TARGET: &str = "task_result";

/// Outcome class of a log line. Chosen by the caller, never guessed from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Failure,
    Info,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Failure => "failure",
            Severity::Info => "info",
        }
    }

    /// Fallback for events that carry no `severity` field.
    pub fn from_level(level: &Level) -> Self {
        if *level == Level::ERROR || *level == Level::WARN {
            Severity::Failure
        } else {
            Severity::Info
        }
    }

    pub fn style(self) -> Style {
        match self {
            Severity::Success => Style::new().fg(Color::Green),
            Severity::Failure => Style::new().fg(Color::Red),
            Severity::Info => Style::new().fg(Color::Cyan),
        }
    }

    pub fn paint(self, msg: &str) -> String {
        self.style().paint(msg).to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "success" => Ok(Severity::Success),
            "failure" => Ok(Severity::Failure),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// Logs a success line on the `task_result` target.
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(
            target: "task_result",
            severity = $crate::Severity::Success.as_str(),
            $($arg)+
        )
    };
}

/// Logs a failure line on the `task_result` target.
#[macro_export]
macro_rules! log_failure {
    ($($arg:tt)+) => {
        $crate::tracing::warn!(
            target: "task_result",
            severity = $crate::Severity::Failure.as_str(),
            $($arg)+
        )
    };
}

/// Logs an informational line on the `task_result` target.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::tracing::info!(
            target: "task_result",
            severity = $crate::Severity::Info.as_str(),
            $($arg)+
        )
    };
}

pub fn setup_logger() -> Option<WorkerGuard> {
    // Create logs directory
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::hourly("logs", "somnia");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target(TASK_RESULT_TARGET, Level::INFO)
        .with_default(Level::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target(TASK_RESULT_TARGET, Level::INFO)
        .with_default(Level::WARN);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    // Return guard - MUST be kept alive by caller
    Some(guard)
}

// --- Formatters ---

#[derive(Default)]
struct EventVisitor {
    message: String,
    severity: Option<Severity>,
}

impl EventVisitor {
    fn collect(event: &Event<'_>) -> Self {
        let mut visitor = Self::default();
        event.record(&mut visitor);
        visitor
    }

    fn severity_or(&self, level: &Level) -> Severity {
        self.severity.unwrap_or_else(|| Severity::from_level(level))
    }
}

impl tracing::field::Visit for EventVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "severity" => self.severity = value.parse().ok(),
            _ => {}
        }
    }
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let visitor = EventVisitor::collect(event);
        let severity = visitor.severity_or(event.metadata().level());

        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let gray = Style::new().fg(Color::DarkGray);

        writeln!(
            writer,
            "{}  {}",
            gray.paint(timestamp),
            severity.paint(&visitor.message)
        )
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();
        let visitor = EventVisitor::collect(event);

        writeln!(
            writer,
            "{} [{}] [{}] {}",
            timestamp,
            level,
            visitor.severity_or(level),
            visitor.message
        )
    }
}
