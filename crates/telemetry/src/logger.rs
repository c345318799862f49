use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TelemetryError;

/// Custom time formatter that displays time as "YYYY-MM-DD HH:MM:SS.micros"
struct CustomTimeFormat;

impl FormatTime for CustomTimeFormat {
	fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
		let now = std::time::SystemTime::now();
		let datetime: chrono::DateTime<chrono::Local> = now.into();
		write!(w, "{}", datetime.format("[%Y-%m-%d %H:%M:%S%.6f]"))
	}
}

/// Parse a log level name, ignoring case.
///
/// Valid values: trace, debug, info, warn, error, off
pub fn parse_level(level: &str) -> Result<LevelFilter, TelemetryError> {
	match level.to_lowercase().as_str() {
		"trace" => Ok(LevelFilter::TRACE),
		"debug" => Ok(LevelFilter::DEBUG),
		"info" => Ok(LevelFilter::INFO),
		"warn" => Ok(LevelFilter::WARN),
		"error" => Ok(LevelFilter::ERROR),
		"off" => Ok(LevelFilter::OFF),
		_ => Err(TelemetryError::InvalidLogLevel(level.to_string())),
	}
}

/// Initialize the logger with the provided log level
///
/// This sets up a stderr logger with:
/// - The log level from the `level` parameter, unless `RUST_LOG` is set
/// - Structured output with timestamps in format: YYYY-MM-DD HH:MM:SS.micros
///
/// Output goes to stderr so it never mixes with decoded values on stdout.
///
/// # Example
///
/// ```no_run
/// telemetry::init("info")?;
/// tracing::info!("Inspecting capture");
/// # Ok::<(), telemetry::TelemetryError>(())
/// ```
///
/// # Errors
///
/// Returns an error if the level is not recognized or a global subscriber is
/// already installed.
pub fn init(level: &str) -> Result<(), TelemetryError> {
	let default_level = parse_level(level)?;

	// RUST_LOG wins over the configured level
	let env_filter = EnvFilter::builder()
		.with_default_directive(default_level.into())
		.from_env_lossy();

	tracing_subscriber::registry()
		.with(env_filter)
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_timer(CustomTimeFormat)
				.with_target(false)
				.with_thread_ids(true)
				.with_line_number(false)
				.with_file(false),
		)
		.try_init()
		.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}
