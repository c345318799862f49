//! Configuration for `resp-inspect`
//!
//! Settings come from an optional TOML, JSON or YAML file and are then
//! overridden by any command-line flags that were given explicitly.
//!
//! # Example
//!
//! ```no_run
//! use resp_inspect::config::{Cli, Parser, load};
//!
//! let args = Cli::parse();
//! let config = load(&args)?;
//! println!("Output format: {}", config.output);
//! # Ok::<(), resp_inspect::config::ConfigError>(())
//! ```

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

pub use clap::Parser;
use clap::ValueEnum;
use resp::EncodePolicy;
use resp::Limits;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Failed to read configuration file '{path}': {source}")]
	Io {
		source: std::io::Error,
		path: String,
	},

	#[error("Failed to parse TOML configuration: {0}")]
	TomlParse(#[from] toml::de::Error),

	#[error("Failed to parse JSON configuration: {0}")]
	JsonParse(#[from] serde_json::Error),

	#[error("Failed to parse YAML configuration: {0}")]
	YamlParse(#[from] serde_yaml::Error),

	#[error("Unsupported configuration format: {0}")]
	UnsupportedFormat(String),

	#[error("Configuration file has no extension")]
	NoExtension,

	#[error("Invalid encode policy: {0}")]
	InvalidEncodePolicy(String),
}

/// How each decoded value is printed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	/// redis-cli style rendering
	#[default]
	Pretty,
	/// Rust debug representation of the value
	Debug,
	/// Canonical re-encoding with control bytes escaped
	Resp,
}

impl fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OutputFormat::Pretty => f.write_str("pretty"),
			OutputFormat::Debug => f.write_str("debug"),
			OutputFormat::Resp => f.write_str("resp"),
		}
	}
}

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// File holding the captured RESP stream. Reads stdin when omitted.
	pub input: Option<PathBuf>,

	/// Configuration file path (TOML, JSON, or YAML)
	#[arg(short, long)]
	pub config: Option<String>,

	/// Log level (trace, debug, info, warn, error, off)
	#[arg(short, long)]
	pub log_level: Option<String>,

	/// Maximum aggregate nesting depth
	#[arg(long)]
	pub max_depth: Option<usize>,

	/// Maximum element count of one aggregate
	#[arg(long)]
	pub max_count: Option<usize>,

	/// Maximum declared length of one bulk payload
	#[arg(long)]
	pub max_bulk_len: Option<usize>,

	/// What to do with values that cannot be re-encoded (strict, skip)
	#[arg(long)]
	pub encode_policy: Option<String>,

	/// Output format
	#[arg(short, long, value_enum)]
	pub output: Option<OutputFormat>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InspectConfig {
	pub log_level: String,
	pub max_depth: usize,
	pub max_count: usize,
	pub max_bulk_len: usize,
	pub encode_policy: String,
	pub output: OutputFormat,
}

impl Default for InspectConfig {
	fn default() -> Self {
		let limits = Limits::default();
		Self {
			log_level: "warn".into(),
			max_depth: limits.max_depth,
			max_count: limits.max_count,
			max_bulk_len: limits.max_bulk_len,
			encode_policy: EncodePolicy::default().to_string(),
			output: OutputFormat::default(),
		}
	}
}

impl InspectConfig {
	pub fn limits(&self) -> Limits {
		Limits::new()
			.max_depth(self.max_depth)
			.max_count(self.max_count)
			.max_bulk_len(self.max_bulk_len)
	}

	pub fn encode_policy(&self) -> Result<EncodePolicy, ConfigError> {
		self.encode_policy
			.parse()
			.map_err(ConfigError::InvalidEncodePolicy)
	}
}

/// Build the effective configuration: file first, then CLI overrides.
pub fn load(args: &Cli) -> Result<InspectConfig, ConfigError> {
	let mut config = match args.config.as_deref() {
		Some(p) => load_from_file(p)?,
		None => InspectConfig::default(),
	};

	// Override with CLI arguments if explicitly provided
	if let Some(log_level) = &args.log_level {
		config.log_level = log_level.clone();
	}
	if let Some(depth) = args.max_depth {
		config.max_depth = depth;
	}
	if let Some(count) = args.max_count {
		config.max_count = count;
	}
	if let Some(len) = args.max_bulk_len {
		config.max_bulk_len = len;
	}
	if let Some(policy) = &args.encode_policy {
		config.encode_policy = policy.clone();
	}
	if let Some(output) = args.output {
		config.output = output;
	}

	// Reject an unknown policy before any input is read
	config.encode_policy()?;
	Ok(config)
}

fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InspectConfig, ConfigError> {
	let path_ref = path.as_ref();
	let content = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
		path: path_ref.display().to_string(),
		source,
	})?;

	let extension = path_ref
		.extension()
		.and_then(|ext| ext.to_str())
		.ok_or(ConfigError::NoExtension)?;

	match extension.to_lowercase().as_str() {
		"toml" => Ok(toml::from_str(&content)?),
		"json" => Ok(serde_json::from_str(&content)?),
		"yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
		_ => Err(ConfigError::UnsupportedFormat(extension.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn write_config(name: &str, content: &str) -> (tempfile::TempDir, String) {
		let dir = tempfile::tempdir().unwrap();
		let file_path = dir.path().join(name);
		std::fs::write(&file_path, content).unwrap();
		let path = file_path.display().to_string();
		(dir, path)
	}

	#[test]
	fn test_defaults() {
		let config = InspectConfig::default();
		assert_eq!(config.log_level, "warn");
		assert_eq!(config.limits(), Limits::default());
		assert_eq!(config.encode_policy().unwrap(), EncodePolicy::Strict);
		assert_eq!(config.output, OutputFormat::Pretty);
	}

	#[rstest]
	#[case(
		"inspect.toml",
		r#"
log_level = "debug"
max_depth = 8
max_count = 100
max_bulk_len = 4096
encode_policy = "skip"
output = "resp"
"#
	)]
	#[case(
		"inspect.json",
		r#"
{
  "log_level": "debug",
  "max_depth": 8,
  "max_count": 100,
  "max_bulk_len": 4096,
  "encode_policy": "skip",
  "output": "resp"
}
"#
	)]
	#[case(
		"inspect.yaml",
		r#"
log_level: "debug"
max_depth: 8
max_count: 100
max_bulk_len: 4096
encode_policy: "skip"
output: "resp"
"#
	)]
	fn test_parse_config_file(#[case] name: &str, #[case] content: &str) {
		let (_dir, path) = write_config(name, content);

		let config = load_from_file(&path).unwrap();
		assert_eq!(config.log_level, "debug");
		assert_eq!(
			config.limits(),
			Limits::new().max_depth(8).max_count(100).max_bulk_len(4096)
		);
		assert_eq!(config.encode_policy().unwrap(), EncodePolicy::Skip);
		assert_eq!(config.output, OutputFormat::Resp);
	}

	#[test]
	fn test_partial_file_keeps_defaults() {
		let (_dir, path) = write_config("inspect.toml", "max_depth = 3\n");

		let config = load_from_file(&path).unwrap();
		assert_eq!(config.max_depth, 3);
		assert_eq!(config.max_count, InspectConfig::default().max_count);
		assert_eq!(config.output, OutputFormat::Pretty);
	}

	#[test]
	fn test_cli_overrides_file() {
		let (_dir, path) = write_config(
			"inspect.toml",
			"log_level = \"debug\"\nmax_depth = 3\noutput = \"debug\"\n",
		);
		let args = Cli {
			config: Some(path),
			max_depth: Some(16),
			output: Some(OutputFormat::Resp),
			..Cli::default()
		};

		let config = load(&args).unwrap();
		assert_eq!(config.log_level, "debug");
		assert_eq!(config.max_depth, 16);
		assert_eq!(config.output, OutputFormat::Resp);
	}

	#[test]
	fn test_cli_args_parse() {
		let args = Cli::try_parse_from([
			"resp-inspect",
			"capture.bin",
			"--max-count",
			"10",
			"--encode-policy",
			"skip",
			"-o",
			"debug",
		])
		.unwrap();
		assert_eq!(args.input, Some(PathBuf::from("capture.bin")));
		assert_eq!(args.max_count, Some(10));
		assert_eq!(args.output, Some(OutputFormat::Debug));

		let config = load(&args).unwrap();
		assert_eq!(config.encode_policy().unwrap(), EncodePolicy::Skip);
	}

	#[test]
	fn test_invalid_encode_policy() {
		let args = Cli {
			encode_policy: Some("lenient".into()),
			..Cli::default()
		};
		assert!(matches!(
			load(&args),
			Err(ConfigError::InvalidEncodePolicy(_))
		));
	}

	#[rstest]
	#[case("inspect.ini", "max_depth = 3")]
	#[case("inspect", "max_depth = 3")]
	fn test_unsupported_config_file(#[case] name: &str, #[case] content: &str) {
		let (_dir, path) = write_config(name, content);
		let err = load_from_file(&path).unwrap_err();
		assert!(matches!(
			err,
			ConfigError::UnsupportedFormat(_) | ConfigError::NoExtension
		));
	}

	#[test]
	fn test_missing_config_file() {
		let err = load_from_file("/nonexistent/inspect.toml").unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}
