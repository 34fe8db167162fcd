//! Tracing subscriber setup.
//!
//! `console` output uses the stock fmt layer. `json` output writes one
//! OpenTelemetry log record per line so collectors can ingest it without parsing.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{ConfigError, LoggingConfig};

/// Collects event fields as JSON attributes.
#[derive(Default)]
struct AttributeVisitor(Map<String, Value>);

impl AttributeVisitor {
    /// `event_name` becomes `event.name`, mirroring the OTel attribute namespace.
    fn key(field: &Field) -> String {
        match field.name() {
            "event_name" => "event.name".to_string(),
            "event_domain" => "event.domain".to_string(),
            name => name.to_string(),
        }
    }
}

impl Visit for AttributeVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.0.insert(Self::key(field), json!(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(Self::key(field), json!(format!("{:?}", value)));
    }
}

#[derive(Clone)]
struct OtelJsonEventFormatter {
    service_name: String,
    service_version: String,
}

impl OtelJsonEventFormatter {
    fn severity_number(level: &Level) -> u64 {
        match *level {
            Level::TRACE => 1,
            Level::DEBUG => 5,
            Level::INFO => 9,
            Level::WARN => 13,
            Level::ERROR => 17,
        }
    }

    fn record(&self, event: &Event<'_>) -> Value {
        let metadata = event.metadata();
        let mut visitor = AttributeVisitor::default();
        event.record(&mut visitor);
        let mut attributes = visitor.0;

        let body = match attributes.remove("message") {
            Some(Value::String(message)) => message,
            _ => metadata.name().to_string(),
        };
        attributes.insert("code.target".to_string(), json!(metadata.target()));
        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".to_string(), json!(file));
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".to_string(), json!(line));
        }

        json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "severity_text": metadata.level().as_str(),
            "severity_number": Self::severity_number(metadata.level()),
            "body": body,
            "resource": {
                "service.name": self.service_name,
                "service.version": self.service_version,
            },
            "attributes": attributes,
        })
    }
}

impl<S, N> FormatEvent<S, N> for OtelJsonEventFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let line = serde_json::to_string(&self.record(event)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Parses a `logging.level` value.
fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(ConfigError::Invalid(format!(
            "invalid logging.level '{}'. Valid values: trace, debug, info, warn, error",
            level
        ))),
    }
}

/// Installs the global tracing subscriber described by `logging_config`.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), ConfigError> {
    let level_filter = parse_level(&logging_config.level)?;

    // RUST_LOG directives still apply on top of the configured level
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    match logging_config.format.to_lowercase().as_str() {
        "json" => {
            // OTel-aligned structured JSON output
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer().event_format(OtelJsonEventFormatter {
                    service_name: logging_config.service_name.clone(),
                    service_version: logging_config.service_version.clone(),
                }))
                .init();
        }
        _ => {
            // Human-readable console output, also the fallback for unknown formats
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer())
                .init();
        }
    }
    Ok(())
}
