//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and a
//! JSON log file, so a device run can be replayed after the fact.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let log_dir = PathBuf::from("log");
        let file_logging = fs::create_dir_all(&log_dir).is_ok();

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");
        let log_path = log_dir.join(&log_filename);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(EnvFilter::new(log_level.clone()));

        let (file_layer, guard) = if file_logging {
            let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(log_level));
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        // Tests and embedding hosts may already have installed a subscriber
        if tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        if file_logging {
            tracing::info!(
                pid = pid,
                environment = %environment,
                log_file = %log_path.display(),
                "🔧 STRUCTURED LOGGING: Initialized with file output"
            );
        } else {
            tracing::warn!(
                pid = pid,
                environment = %environment,
                "🔧 STRUCTURED LOGGING: Log directory unavailable, console output only"
            );
        }

        // The writer thread must outlive every log call
        if let Some(guard) = guard {
            std::mem::forget(guard);
        }
    });
}

/// Get current environment from environment variables
pub(crate) fn get_environment() -> String {
    std::env::var("DEVICE_AGENT_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for a network connection attempt
pub fn log_connection_attempt(attempt: u32, retry_counter: u32, outcome: &str, code: i32) {
    tracing::info!(
        attempt = attempt,
        retry_counter = retry_counter,
        outcome = %outcome,
        code = code,
        timestamp = %Utc::now().to_rfc3339(),
        "📡 CONNECTION_ATTEMPT"
    );
}

/// Log structured data for resource registry operations
pub fn log_resource_operation(
    operation: &str,
    path: &str,
    label: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        path = %path,
        label = label,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📚 RESOURCE_OPERATION"
    );
}

/// Log structured data for registration lifecycle transitions
pub fn log_registration_transition(from: &str, to: &str, event: &str, error: Option<&str>) {
    tracing::info!(
        from_state = %from,
        to_state = %to,
        event = %event,
        error = error,
        timestamp = %Utc::now().to_rfc3339(),
        "🔄 REGISTRATION_TRANSITION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("DEVICE_AGENT_ENV", "Test_Override");
        let env = get_environment();
        assert_eq!(env, "test_override");
        std::env::remove_var("DEVICE_AGENT_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }
}
