//! Logging infrastructure - structured tracing throughout the runtime
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log levels per module
//! - Zero-cost when disabled
//! - Span-based performance tracking
//! - Console or file output (non-blocking appender)

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub use tracing::{debug, error, info, trace, warn};

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Keeps the non-blocking file writer alive for the process lifetime
static FILE_WRITER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Enable file logging
    pub file_output: bool,
    /// Log file path (if file_output enabled)
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_output: false,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // PYRITE_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("PYRITE_LOG_LEVEL") {
            config.level = match level_str.to_lowercase().as_str() {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => Level::INFO,
            };
        }

        // PYRITE_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("PYRITE_LOG_FILE") {
            config.file_output = true;
            config.log_path = Some(path);
        }

        // PYRITE_LOG_JSON: enable JSON format
        config.json_format = std::env::var("PYRITE_LOG_JSON").is_ok();

        // PYRITE_LOG_SPANS: show span events
        config.show_spans = std::env::var("PYRITE_LOG_SPANS").is_ok();

        config
    }

    /// Create high-performance config (minimal logging)
    pub fn performance() -> Self {
        Self {
            level: Level::ERROR,
            ..Self::default()
        }
    }

    /// Create debug config (verbose logging)
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            file_output: true,
            log_path: Some("pyrite_runtime.log".to_string()),
            json_format: false,
            show_spans: true,
        }
    }
}

/// Initialize logging with default configuration
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "pyrite_runtime={}",
                config.level.as_str().to_lowercase()
            ))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(env_filter);

        if config.file_output {
            let path = config
                .log_path
                .clone()
                .unwrap_or_else(|| "pyrite_runtime.log".to_string());
            let appender = tracing_appender::rolling::never(".", path);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            *FILE_WRITER_GUARD.lock() = Some(guard);

            if config.json_format {
                registry
                    .with(fmt::layer().json().with_writer(writer))
                    .init();
            } else {
                registry
                    .with(
                        fmt::layer()
                            .with_writer(writer)
                            .with_span_events(span_events)
                            .with_ansi(false)
                            .with_target(true),
                    )
                    .init();
            }
        } else if config.json_format {
            registry
                .with(fmt::layer().json().with_writer(io::stdout))
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(io::stdout)
                        .with_span_events(span_events)
                        .with_target(true)
                        .with_thread_ids(cfg!(debug_assertions))
                        .with_line_number(cfg!(debug_assertions)),
                )
                .init();
        }
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

// ============================================================================
// Runtime-specific logging functions
// ============================================================================

/// Log a raw memory allocation
#[inline]
pub fn log_allocation(size: usize, ptr: *const u8) {
    trace!(
        event = "allocation",
        size_bytes = size,
        address = ?ptr,
        "Memory allocated"
    );
}

/// Log a raw memory release
#[inline]
pub fn log_release(ptr: *const u8) {
    trace!(
        event = "release",
        address = ?ptr,
        "Memory released"
    );
}

/// Log an arena growth step
pub fn log_arena_grow(old_capacity: usize, new_capacity: usize) {
    debug!(
        event = "arena_grow",
        old_capacity = old_capacity,
        new_capacity = new_capacity,
        "Arena backing buffer grown"
    );
}

/// Log a scope teardown
pub fn log_scope_teardown(released: usize) {
    trace!(
        event = "scope_teardown",
        blocks_released = released,
        "Scope released registered blocks"
    );
}
