//! Structured logging setup
//!
//! Console output by default, JSON when `DOCKGEN_LOG_JSON=true`. `RUST_LOG`
//! directives are honoured on top of the configured level. The subscriber can
//! only be installed once per process; later calls are ignored.
//!
//! ```no_run
//! use dockgen::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(project = "demo", "Starting");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates that are too chatty at info/debug
const NOISY_CRATES: [&str; 3] = ["h2", "hyper", "reqwest"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., dockgen::gateway) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }
}

/// Parses a log level from a string, defaulting to INFO
///
/// ```
/// use dockgen::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn directive(spec: &str) -> Option<Directive> {
    spec.parse().ok()
}

/// Builds the filter: `RUST_LOG`, then the crate level, then caps on noisy crates
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Some(d) = directive(&format!("dockgen={}", config.level)) {
        filter = filter.add_directive(d);
    }

    if env::var("RUST_LOG").is_err() {
        for krate in NOISY_CRATES {
            if let Some(d) = directive(&format!("{}=warn", krate)) {
                filter = filter.add_directive(d);
            }
        }
    }
    filter
}

pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(&config);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            // stderr keeps stdout clean for --format json/yaml
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `DOCKGEN_LOG_LEVEL` and `DOCKGEN_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level_str = env::var("DOCKGEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level = parse_level(&level_str);

    let use_json = env::var("DOCKGEN_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}

pub fn init_from_env() {
    init_logging(config_from_env());
}
