use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
	#[error("Invalid log level '{0}', expected one of: trace, debug, info, warn, error, off")]
	InvalidLogLevel(String),

	#[error("Logger already initialized: {0}")]
	AlreadyInitialized(String),
}
