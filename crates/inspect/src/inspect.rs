use std::io::Read;
use std::io::Write;

use bytes::BufMut;
use bytes::BytesMut;
use resp::Decoder;
use resp::EncodeError;
use resp::Encoder;
use resp::RespError;
use resp::RespValue;
use resp::push_order;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::config::ConfigError;
use crate::config::InspectConfig;
use crate::config::OutputFormat;
use crate::render;

const READ_CHUNK: usize = 8 * 1024;

#[derive(Error, Debug)]
pub enum InspectError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Protocol error after {frames} messages: {source}")]
	Protocol { frames: usize, source: RespError },

	#[error("Failed to re-encode message {frame}: {source}")]
	Encode { frame: usize, source: EncodeError },

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// What one run saw.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
	/// Complete messages decoded.
	pub frames: usize,
	/// Buffered bytes left over at end of input that never formed a message.
	pub trailing: usize,
	/// Messages that could not be re-encoded and were skipped.
	pub skipped: usize,
}

/// Decode every message in `input` and write one rendering per message to
/// `output`.
///
/// Input is consumed in fixed-size chunks, so message boundaries never
/// line up with reads.
pub fn run<R: Read, W: Write>(
	config: &InspectConfig,
	mut input: R,
	mut output: W,
) -> Result<Summary, InspectError> {
	let decoder = Decoder::new(push_order::arrival).with_limits(config.limits());
	let mut encoder = Encoder::with_policy(config.encode_policy()?);
	let mut buf = BytesMut::with_capacity(READ_CHUNK);
	let mut summary = Summary::default();

	loop {
		loop {
			let value = decoder
				.decode_frame(&mut buf)
				.map_err(|source| InspectError::Protocol {
					frames: summary.frames,
					source,
				})?;
			let Some(value) = value else {
				break;
			};
			summary.frames += 1;
			write_value(&mut output, &value, config.output, &mut encoder, &mut summary)?;
		}

		buf.reserve(READ_CHUNK);
		let n = read_chunk(&mut input, &mut buf)?;
		if n == 0 {
			break;
		}
		debug!(bytes = n, buffered = buf.len(), "Read input chunk");
	}

	if !buf.is_empty() {
		summary.trailing = buf.len();
		warn!(
			bytes = buf.len(),
			"Input ended in the middle of a message"
		);
	}
	output.flush()?;
	Ok(summary)
}

fn read_chunk<R: Read>(input: &mut R, buf: &mut BytesMut) -> std::io::Result<usize> {
	let mut chunk = [0u8; READ_CHUNK];
	loop {
		match input.read(&mut chunk) {
			Ok(n) => {
				buf.put_slice(&chunk[..n]);
				return Ok(n);
			}
			Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		}
	}
}

fn write_value<W: Write>(
	output: &mut W,
	value: &RespValue,
	format: OutputFormat,
	encoder: &mut Encoder,
	summary: &mut Summary,
) -> Result<(), InspectError> {
	match format {
		OutputFormat::Pretty => writeln!(output, "{}", render::render(value))?,
		OutputFormat::Debug => writeln!(output, "{:?}", value)?,
		OutputFormat::Resp => {
			encoder
				.encode(value)
				.map_err(|source| InspectError::Encode {
					frame: summary.frames,
					source,
				})?;
			summary.skipped += encoder.skipped().len();
			let encoded = encoder.build();
			if !encoded.is_empty() {
				writeln!(output, "{}", render::escape(&encoded))?;
			}
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use rstest::rstest;

	use super::*;

	fn inspect(input: &[u8], config: &InspectConfig) -> (Result<Summary, InspectError>, String) {
		let mut out = Vec::new();
		let result = run(config, Cursor::new(input.to_vec()), &mut out);
		(result, String::from_utf8(out).unwrap())
	}

	/// Reader that hands out at most `step` bytes per call.
	struct Trickle<'a> {
		data: &'a [u8],
		step: usize,
	}

	impl Read for Trickle<'_> {
		fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
			let n = self.step.min(buf.len()).min(self.data.len());
			buf[..n].copy_from_slice(&self.data[..n]);
			self.data = &self.data[n..];
			Ok(n)
		}
	}

	#[rstest]
	#[case(OutputFormat::Pretty, "1) \"GET\"\n2) \"a\"\nOK\n(integer) -2324\n")]
	#[case(OutputFormat::Resp, "*2\\r\\n$3\\r\\nGET\\r\\n$1\\r\\na\\r\\n\n+OK\\r\\n\n:-2324\\r\\n\n")]
	fn test_run_output_formats(#[case] format: OutputFormat, #[case] expected: &str) {
		let config = InspectConfig {
			output: format,
			..InspectConfig::default()
		};
		let (result, out) = inspect(b"*2\r\n$3\r\nGET\r\n$1\r\na\r\n+OK\r\n:-2324\r\n", &config);

		assert_eq!(
			result.unwrap(),
			Summary {
				frames: 3,
				trailing: 0,
				skipped: 0,
			}
		);
		assert_eq!(out, expected);
	}

	#[test]
	fn test_run_debug_output() {
		let config = InspectConfig {
			output: OutputFormat::Debug,
			..InspectConfig::default()
		};
		let (result, out) = inspect(b"#t\r\n", &config);
		assert_eq!(result.unwrap().frames, 1);
		assert_eq!(out, "Boolean(true)\n");
	}

	#[test]
	fn test_run_reads_in_small_pieces() {
		let data = b">2\r\n+message\r\n$5\r\nhello\r\n%1\r\n+k\r\n,1.5\r\n";
		let mut out = Vec::new();
		let summary = run(
			&InspectConfig::default(),
			Trickle {
				data: data.as_slice(),
				step: 3,
			},
			&mut out,
		)
		.unwrap();

		assert_eq!(summary.frames, 2);
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"1) message\n2) \"hello\"\n1# k => (double) 1.5\n"
		);
	}

	#[test]
	fn test_run_reports_trailing_bytes() {
		let (result, out) = inspect(b"+OK\r\n$5\r\nhel", &InspectConfig::default());
		assert_eq!(
			result.unwrap(),
			Summary {
				frames: 1,
				trailing: 8,
				skipped: 0,
			}
		);
		assert_eq!(out, "OK\n");
	}

	#[test]
	fn test_run_stops_on_protocol_error() {
		let (result, out) = inspect(b":1\r\n$2\r\nabc\r\n:2\r\n", &InspectConfig::default());
		match result {
			Err(InspectError::Protocol { frames, .. }) => assert_eq!(frames, 1),
			other => panic!("Expected protocol error, got {:?}", other),
		}
		assert_eq!(out, "(integer) 1\n");
	}

	#[test]
	fn test_run_applies_limits() {
		let config = InspectConfig {
			max_depth: 1,
			..InspectConfig::default()
		};
		let (result, _) = inspect(b"*1\r\n*1\r\n:1\r\n", &config);
		assert!(matches!(result, Err(InspectError::Protocol { frames: 0, .. })));
	}
}
