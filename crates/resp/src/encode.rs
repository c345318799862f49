//! RESP encoder and the draining [`Encoder`] builder.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;
use thiserror::Error;
use tracing::warn;

use crate::types::PushQueue;
use crate::types::RespValue;
use crate::utils::*;

/// Errors that can occur during RESP encoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
	/// The value has no valid wire representation
	#[error("Invalid value: {0}")]
	InvalidValue(String),
}

/// Trait for encoding RESP values.
///
/// `encode_to` appends to a caller-owned buffer; nothing is written to any
/// shared state.
pub trait RespEncoder {
	fn encode_to(&self, buf: &mut BytesMut) -> Result<(), EncodeError>;

	fn encode(&self) -> Result<Bytes, EncodeError> {
		let mut buf = BytesMut::new();
		self.encode_to(&mut buf)?;
		Ok(buf.freeze())
	}
}

impl RespEncoder for RespValue {
	fn encode_to(&self, buf: &mut BytesMut) -> Result<(), EncodeError> {
		match self {
			RespValue::SimpleString(s) => encode_line(buf, SIMPLE_STRING, s, "simple string")?,
			RespValue::Error(e) => encode_line(buf, ERROR, e, "simple error")?,
			RespValue::Integer(i) => encode_integer(buf, *i),
			RespValue::BulkString(s) => encode_bulk(buf, BULK_STRING, s),
			RespValue::Array(arr) => encode_array(buf, arr)?,
			RespValue::Null => encode_null(buf),
			RespValue::Boolean(b) => encode_boolean(buf, *b),
			RespValue::Double(d) => encode_double(buf, *d),
			RespValue::BigNumber(n) => encode_big_number(buf, n)?,
			RespValue::BulkError(e) => encode_bulk(buf, BULK_ERROR, e),
			RespValue::VerbatimString { format, data } => {
				encode_verbatim_string(buf, format, data)?
			}
			RespValue::Map(m) => encode_map(buf, m)?,
			RespValue::Set(s) => encode_set(buf, s)?,
			RespValue::Push(p) => encode_push(buf, p)?,
		}
		Ok(())
	}
}

/// What [`Encoder`] does with a value that cannot be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodePolicy {
	/// Return the error to the caller.
	#[default]
	Strict,
	/// Drop the offending top-level value, log it and keep going.
	Skip,
}

impl FromStr for EncodePolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"strict" => Ok(EncodePolicy::Strict),
			"skip" => Ok(EncodePolicy::Skip),
			_ => Err(format!(
				"invalid encode policy '{}', expected 'strict' or 'skip'",
				s
			)),
		}
	}
}

impl fmt::Display for EncodePolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EncodePolicy::Strict => f.write_str("strict"),
			EncodePolicy::Skip => f.write_str("skip"),
		}
	}
}

/// Accumulates several encoded values into one reply buffer.
///
/// ```rust
/// use resp::Encoder;
/// use resp::RespValue;
///
/// let mut encoder = Encoder::new();
/// encoder.encode(&RespValue::simple_string("OK"))?.encode_unsigned(7);
/// assert_eq!(&encoder.build()[..], b"+OK\r\n:7\r\n");
/// assert!(encoder.is_empty());
/// # Ok::<(), resp::EncodeError>(())
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
	buf: BytesMut,
	policy: EncodePolicy,
	skipped: Vec<EncodeError>,
}

impl Encoder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_policy(policy: EncodePolicy) -> Self {
		Self {
			policy,
			..Self::default()
		}
	}

	/// Append `value`. Under [`EncodePolicy::Skip`] an invalid value leaves the
	/// buffer as it was and is recorded in [`skipped`](Self::skipped).
	pub fn encode(&mut self, value: &RespValue) -> Result<&mut Self, EncodeError> {
		let mark = self.buf.len();
		if let Err(e) = value.encode_to(&mut self.buf) {
			self.buf.truncate(mark);
			match self.policy {
				EncodePolicy::Strict => return Err(e),
				EncodePolicy::Skip => {
					warn!(error = %e, "Skipping value that cannot be encoded");
					self.skipped.push(e);
				}
			}
		}
		Ok(self)
	}

	/// Append an unsigned integer, which may exceed `i64::MAX`.
	pub fn encode_unsigned(&mut self, n: u64) -> &mut Self {
		encode_unsigned(&mut self.buf, n);
		self
	}

	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Values dropped under [`EncodePolicy::Skip`] since the last build.
	pub fn skipped(&self) -> &[EncodeError] {
		&self.skipped
	}

	/// Take everything encoded so far and reset the encoder.
	pub fn build(&mut self) -> Bytes {
		self.skipped.clear();
		self.buf.split().freeze()
	}
}

#[inline]
fn encode_line(buf: &mut BytesMut, marker: u8, s: &Bytes, what: &str) -> Result<(), EncodeError> {
	if has_line_break(s) {
		return Err(EncodeError::InvalidValue(format!(
			"{} contains a line break",
			what
		)));
	}
	buf.put_u8(marker);
	buf.put_slice(s);
	buf.put_slice(CRLF);
	Ok(())
}

#[inline]
fn encode_integer(buf: &mut BytesMut, i: i64) {
	buf.put_u8(INTEGER);
	buf.put_slice(i.to_string().as_bytes());
	buf.put_slice(CRLF);
}

#[inline]
pub(crate) fn encode_unsigned(buf: &mut BytesMut, n: u64) {
	buf.put_u8(INTEGER);
	buf.put_slice(n.to_string().as_bytes());
	buf.put_slice(CRLF);
}

#[inline]
fn encode_header(buf: &mut BytesMut, marker: u8, header: &str) {
	buf.put_u8(marker);
	buf.put_slice(header.as_bytes());
	buf.put_slice(CRLF);
}

#[inline]
fn encode_length(buf: &mut BytesMut, marker: u8, length: usize) {
	encode_header(buf, marker, &length.to_string());
}

#[inline]
fn encode_bulk(buf: &mut BytesMut, marker: u8, s: &Bytes) {
	encode_length(buf, marker, s.len());
	buf.put_slice(s);
	buf.put_slice(CRLF);
}

fn encode_array(buf: &mut BytesMut, arr: &[RespValue]) -> Result<(), EncodeError> {
	if arr.is_empty() {
		// Empty and null arrays share the legacy `*-1` header.
		encode_header(buf, ARRAY, "-1");
		return Ok(());
	}
	encode_length(buf, ARRAY, arr.len());
	for value in arr {
		value.encode_to(buf)?;
	}
	Ok(())
}

#[inline]
fn encode_null(buf: &mut BytesMut) {
	buf.put_u8(NULL);
	buf.put_slice(CRLF);
}

#[inline]
fn encode_boolean(buf: &mut BytesMut, b: bool) {
	buf.put_u8(BOOLEAN);
	buf.put_u8(if b { b't' } else { b'f' });
	buf.put_slice(CRLF);
}

#[inline]
fn encode_double(buf: &mut BytesMut, d: f64) {
	buf.put_u8(DOUBLE);
	if d.is_nan() {
		buf.put_slice(b"nan");
	} else if d.is_infinite() {
		if d.is_sign_positive() {
			buf.put_slice(b"inf");
		} else {
			buf.put_slice(b"-inf");
		}
	} else {
		// Display is the shortest text that round-trips and never uses
		// exponent notation.
		buf.put_slice(d.to_string().as_bytes());
	}
	buf.put_slice(CRLF);
}

#[inline]
fn encode_big_number(buf: &mut BytesMut, n: &Bytes) -> Result<(), EncodeError> {
	parse_big_number(n).map_err(|e| EncodeError::InvalidValue(e.to_string()))?;
	buf.put_u8(BIG_NUMBER);
	buf.put_slice(n);
	buf.put_slice(CRLF);
	Ok(())
}

#[inline]
fn encode_verbatim_string(buf: &mut BytesMut, format: &Bytes, data: &Bytes) -> Result<(), EncodeError> {
	if format.len() != 3 {
		return Err(EncodeError::InvalidValue(format!(
			"verbatim format must be 3 bytes, got {}",
			format.len()
		)));
	}
	let total_len = 4 + data.len();
	encode_length(buf, VERBATIM_STRING, total_len);
	buf.put_slice(format);
	buf.put_u8(b':');
	buf.put_slice(data);
	buf.put_slice(CRLF);
	Ok(())
}

fn encode_map(buf: &mut BytesMut, map: &HashMap<RespValue, RespValue>) -> Result<(), EncodeError> {
	encode_length(buf, MAP, map.len());
	for (key, value) in map {
		key.encode_to(buf)?;
		value.encode_to(buf)?;
	}
	Ok(())
}

fn encode_set(buf: &mut BytesMut, set: &HashSet<RespValue>) -> Result<(), EncodeError> {
	encode_length(buf, SET, set.len());
	for value in set {
		value.encode_to(buf)?;
	}
	Ok(())
}

fn encode_push(buf: &mut BytesMut, push: &PushQueue) -> Result<(), EncodeError> {
	encode_length(buf, PUSH, push.len());
	for value in push.iter() {
		value.encode_to(buf)?;
	}
	Ok(())
}
