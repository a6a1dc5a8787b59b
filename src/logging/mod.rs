//! Structured logging configuration

use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: LogLevel,
    /// Log format (json, pretty, compact)
    pub format: LogFormat,
    /// Output destination (stderr, file)
    pub output: LogOutput,
    /// File path for file output
    pub file_path: Option<String>,
    /// Include source file and line numbers
    pub include_source: bool,
    /// Trace-level output for the orchestrator and platform adapters
    pub trace_orchestrator: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line
    Pretty,
    /// One line per event
    Compact,
    /// JSON lines for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Log output destinations. Stdout carries command output, so console
/// logging goes to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    File,
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stderr" | "console" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            _ => Err(format!("Invalid log output: {}", s)),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            file_path: None,
            include_source: false,
            trace_orchestrator: false,
        }
    }
}

impl LogConfig {
    /// Configuration used for `--verbose`
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            include_source: true,
            ..Self::default()
        }
    }

    /// Apply `WINDOW_TEMPLATES_LOG_*` environment overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("WINDOW_TEMPLATES_LOG_LEVEL") {
            if let Ok(parsed_level) = LogLevel::from_str(&level) {
                self.level = parsed_level;
            }
        }

        if let Some(format) = lookup("WINDOW_TEMPLATES_LOG_FORMAT") {
            if let Ok(parsed_format) = LogFormat::from_str(&format) {
                self.format = parsed_format;
            }
        }

        if let Some(output) = lookup("WINDOW_TEMPLATES_LOG_OUTPUT") {
            if let Ok(parsed_output) = LogOutput::from_str(&output) {
                self.output = parsed_output;
            }
        }

        if let Some(file_path) = lookup("WINDOW_TEMPLATES_LOG_FILE") {
            self.file_path = Some(file_path);
        }

        if let Some(include_source) = lookup("WINDOW_TEMPLATES_LOG_SOURCE") {
            self.include_source = include_source.eq_ignore_ascii_case("true");
        }

        if let Some(trace) = lookup("WINDOW_TEMPLATES_LOG_TRACE_ORCHESTRATOR") {
            self.trace_orchestrator = trace.eq_ignore_ascii_case("true");
        }
    }
}

/// Initialize the global tracing subscriber with the given configuration
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = create_filter(config);

    let layer = match (config.output, &config.file_path) {
        (LogOutput::Stderr, _) => create_stderr_layer(config),
        (LogOutput::File, Some(file_path)) => create_file_layer(config, file_path)?,
        (LogOutput::File, None) => return Err("File path required for file output".into()),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()?;

    debug!("Logging initialized with config: {:?}", config);
    Ok(())
}

fn filter_directives(config: &LogConfig) -> String {
    let mut directives = format!("window_templates={}", config.level.as_filter());

    if config.trace_orchestrator {
        directives.push_str(",window_templates::services::layout_orchestrator=trace");
        directives.push_str(",window_templates::macos=trace");
    }

    directives
}

/// `RUST_LOG` takes precedence over the configured directives
fn create_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(config)))
}

fn create_stderr_layer(config: &LogConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_file(config.include_source)
        .with_line_number(config.include_source);

    match config.format {
        LogFormat::Pretty => Box::new(base.pretty()),
        LogFormat::Compact => Box::new(base.compact()),
        LogFormat::Json => Box::new(base.json()),
    }
}

fn create_file_layer(
    config: &LogConfig,
    file_path: &str,
) -> Result<BoxedLayer, Box<dyn std::error::Error>> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;

    let base = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_timer(UtcTime::rfc_3339())
        .with_file(config.include_source)
        .with_line_number(config.include_source);

    Ok(match config.format {
        LogFormat::Pretty => Box::new(base.pretty()),
        LogFormat::Compact => Box::new(base.compact()),
        LogFormat::Json => Box::new(base.json()),
    })
}
