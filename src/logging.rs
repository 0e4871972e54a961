//! Structured logging for the speed reporter
//!
//! Every entry goes to stderr so that stdout stays reserved for the report or
//! the JSON response. Entries carry:
//! - a level and logger name
//! - an optional correlation ID, one per measurement request
//! - structured fields rendered as `key=value` or as JSON

use crate::error::{AppError, Result};
use crate::models::{Config, Invocation, NormalizedMetrics, ProcessOutcome, RawMetrics, TestResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }

    /// Level implied by the verbosity flags of a configuration
    pub fn for_config(config: &Config) -> Self {
        if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Error
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::config(format!("Invalid log level: {}", s))),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Ties together the entries of one measurement request
    pub correlation_id: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
    /// Compact single-line format
    Compact,
}

/// Leveled logger writing to stderr
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
}

impl Logger {
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name,
        }
    }

    /// Create a logger whose level and format follow the configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        Self {
            min_level: LogLevel::for_config(config),
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Start a correlated operation and return its ID
    ///
    /// The ID is returned rather than stored, so concurrent operations on a
    /// shared logger never overwrite each other's correlation.
    pub async fn start_operation(&self, operation_name: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();

        self.debug(&format!("Started operation: {}", operation_name))
            .correlation_id(&correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "start")
            .log()
            .await;

        correlation_id
    }

    pub async fn end_operation(&self, correlation_id: &str, operation_name: &str, success: bool) {
        self.debug(&format!("Completed operation: {} (success: {})", operation_name, success))
            .correlation_id(correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "end")
            .field("success", success)
            .log()
            .await;
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let mut line = self.render(&entry);
        line.push('\n');
        let _ = tokio::io::stderr().write_all(line.as_bytes()).await;
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let fields_str: Vec<String> = entry
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string(),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!(
            "{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder for a single log entry
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add process outcome fields (output sizes only, never the output itself)
    pub fn outcome(self, outcome: &ProcessOutcome) -> Self {
        self.field("exit_code", outcome.exit_code)
            .field("timed_out", outcome.timed_out)
            .field("elapsed_ms", outcome.elapsed_ms())
            .field("stdout_bytes", outcome.stdout.len())
            .field("stderr_bytes", outcome.stderr.len())
    }

    /// Add raw and normalized metric fields
    pub fn metrics(self, raw: &RawMetrics, normalized: &NormalizedMetrics) -> Self {
        self.field("download_bps", raw.download)
            .field("upload_bps", raw.upload)
            .field("ping_ms", raw.ping)
            .field("download", &normalized.download)
            .field("upload", &normalized.upload)
            .field("ping", &normalized.ping)
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_kind", error.kind().as_str())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }

    #[cfg(test)]
    fn build(self) -> LogEntry {
        self.entry
    }
}

/// Logger for the measurement lifecycle of one request
#[derive(Clone)]
pub struct MeasurementLogger {
    logger: Logger,
}

impl MeasurementLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("MEASURE".to_string(), config),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_admitted(&self, correlation_id: &str, available_slots: usize) {
        self.logger
            .debug("Measurement admitted")
            .correlation_id(correlation_id)
            .field("available_slots", available_slots)
            .log()
            .await;
    }

    pub async fn log_invocation(&self, invocation: &Invocation, correlation_id: &str) {
        self.logger
            .info(&format!("Running measurement: {}", invocation))
            .correlation_id(correlation_id)
            .field("command", &invocation.command)
            .field("args", &invocation.args)
            .field("timeout_secs", invocation.timeout.as_secs())
            .log()
            .await;
    }

    pub async fn log_outcome(&self, outcome: &ProcessOutcome, correlation_id: &str) {
        let level = if outcome.is_success() { LogLevel::Debug } else { LogLevel::Warn };
        let message = if outcome.timed_out {
            format!("Measurement tool killed after {:.0}ms", outcome.elapsed_ms())
        } else {
            format!("Measurement tool finished in {:.0}ms", outcome.elapsed_ms())
        };

        self.logger
            .log(level, &message)
            .correlation_id(correlation_id)
            .outcome(outcome)
            .log()
            .await;
    }

    pub async fn log_metrics(&self, raw: &RawMetrics, normalized: &NormalizedMetrics, correlation_id: &str) {
        self.logger
            .info(&format!(
                "Metrics: download={}, upload={}, ping={}",
                normalized.download, normalized.upload, normalized.ping
            ))
            .correlation_id(correlation_id)
            .metrics(raw, normalized)
            .log()
            .await;
    }

    pub async fn log_analysis(&self, service: &str, elapsed: Duration, success: bool, correlation_id: &str) {
        let level = if success { LogLevel::Debug } else { LogLevel::Warn };

        self.logger
            .log(level, &format!("Analysis via {} took {}ms", service, elapsed.as_millis()))
            .correlation_id(correlation_id)
            .field("service", service)
            .field("duration_ms", elapsed.as_secs_f64() * 1000.0)
            .field("success", success)
            .log()
            .await;
    }

    pub async fn log_result(&self, result: &TestResult, elapsed: Duration, correlation_id: &str) {
        let mut builder = self
            .logger
            .info(&format!(
                "Request finished: {}",
                if result.is_success() { "success" } else { "failure" }
            ))
            .correlation_id(correlation_id)
            .field("success", result.is_success())
            .field("duration_ms", elapsed.as_secs_f64() * 1000.0);

        if let Some(kind) = result.error_kind() {
            builder = builder.field("error_kind", kind.as_str());
        }

        builder.log().await;
    }
}

/// Error event logger with classification context
#[derive(Clone)]
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("ERR".to_string(), config),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Log an error with its classification
    ///
    /// Measurement errors are handled and turned into results, so they are
    /// logged at warn level; anything unexpected is logged at error level.
    pub async fn log_error(&self, error: &AppError, context: Option<&str>, correlation_id: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let level = match error {
            AppError::Internal(_) | AppError::Io(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        };

        let mut builder = self.logger.log(level, &message).error_info(error);

        if let Some(id) = correlation_id {
            builder = builder.correlation_id(id);
        }

        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }

        builder.log().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_level_for_config() {
        let mut config = Config::default();
        assert_eq!(LogLevel::for_config(&config), LogLevel::Error);

        config.verbose = true;
        assert_eq!(LogLevel::for_config(&config), LogLevel::Info);

        config.debug = true;
        assert_eq!(LogLevel::for_config(&config), LogLevel::Debug);
    }

    #[test]
    fn test_logger_with_config() {
        let config = Config {
            debug: true,
            enable_color: false,
            ..Default::default()
        };

        let logger = Logger::with_config("TEST".to_string(), &config);
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert_eq!(logger.format, LogFormat::Json);
        assert!(!logger.use_color);
    }

    #[test]
    fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_level(LogLevel::Warn);

        assert!(!logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Error));
    }

    #[tokio::test]
    async fn test_start_operation_returns_distinct_ids() {
        let logger = Logger::new("TEST".to_string());
        let first = logger.start_operation("run_test").await;
        let second = logger.start_operation("run_test").await;

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
        logger.end_operation(&first, "run_test", true).await;
    }

    #[test]
    fn test_outcome_fields_exclude_output_text() {
        let logger = Logger::new("TEST".to_string());
        let outcome = ProcessOutcome::completed(
            Some(0),
            "secret stdout".to_string(),
            "err".to_string(),
            Duration::from_millis(1500),
        );

        let entry = logger.info("done").outcome(&outcome).build();
        assert_eq!(entry.fields["exit_code"], serde_json::json!(0));
        assert_eq!(entry.fields["stdout_bytes"], serde_json::json!(13));
        assert_eq!(entry.fields["stderr_bytes"], serde_json::json!(3));
        assert_eq!(entry.fields["timed_out"], serde_json::json!(false));

        let rendered = logger.format_json(&entry);
        assert!(!rendered.contains("secret stdout"));
    }

    #[test]
    fn test_error_info_fields() {
        let logger = Logger::new("TEST".to_string());
        let error = AppError::timeout("speedtest", Duration::from_secs(30));

        let entry = logger.warn("failed").error_info(&error).build();
        assert_eq!(entry.fields["error_category"], serde_json::json!("TIMEOUT"));
        assert_eq!(entry.fields["error_kind"], serde_json::json!("TimeoutError"));
        assert_eq!(entry.fields["error_recoverable"], serde_json::json!(true));
    }

    #[test]
    fn test_log_formats() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_color(false);
        let entry = logger
            .info("Test message")
            .correlation_id("0123456789abcdef")
            .field("key", "value")
            .build();

        let console = logger.format_console(&entry);
        assert!(console.contains(" INFO [TEST] Test message"));
        assert!(console.contains("[01234567]"));
        assert!(console.contains("key=\"value\""));

        let json: serde_json::Value = serde_json::from_str(&logger.format_json(&entry)).unwrap();
        assert_eq!(json["message"], "Test message");
        assert_eq!(json["level"], "Info");

        let compact = logger.format_compact(&entry);
        assert!(compact.contains(" I TEST: Test message"));
    }

    #[test]
    fn test_json_entry_has_no_source_location() {
        let logger = Logger::new("TEST".to_string());
        let entry = logger.debug("Structured line located").correlation_id("id").field("line", "{}").build();

        let json: serde_json::Value = serde_json::from_str(&logger.format_json(&entry)).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["correlation_id", "fields", "level", "logger", "message", "timestamp"]
        );
        assert!(!logger.format_console(&entry).contains(" @ "));
    }

    #[tokio::test]
    async fn test_measurement_logging_does_not_panic() {
        let config = Config {
            debug: true,
            ..Default::default()
        };
        let logger = MeasurementLogger::new(&config);
        let invocation = config.invocation();
        let raw = RawMetrics::new(50_000_000.0, 10_000_000.0, 20.3);
        let normalized = crate::pipeline::MetricNormalizer::normalize(&raw);

        logger.log_admitted("id", 1).await;
        logger.log_invocation(&invocation, "id").await;
        logger
            .log_outcome(&ProcessOutcome::timed_out(Duration::from_secs(30)), "id")
            .await;
        logger.log_metrics(&raw, &normalized, "id").await;
        logger.log_analysis("gemini-2.5-flash", Duration::from_millis(12), false, "id").await;

        let errors = ErrorEventLogger::new(&config);
        errors
            .log_error(&AppError::internal("boom"), Some("During test"), Some("id"))
            .await;
    }
}
