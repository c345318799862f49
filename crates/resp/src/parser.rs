//! Recursive-descent RESP decoder with zero-copy payloads.

use std::collections::HashMap;
use std::collections::HashSet;

use bytes::Bytes;
use bytes::BytesMut;
use tracing::debug;

use crate::error::ParseError;
use crate::error::RespError;
use crate::limits::Limits;
use crate::types::PushOrder;
use crate::types::PushQueue;
use crate::types::RespValue;
use crate::types::push_order;
use crate::utils::*;
use crate::validate::Validator;

/// Result of a decoding attempt.
#[derive(Debug)]
pub enum RespParseResult {
	/// A complete RESP value was decoded, followed by the undecoded
	/// remainder of the input.
	Complete(RespValue, Bytes),
	/// The buffer does not contain enough data to decode a complete value.
	Incomplete,
	/// An error occurred during decoding.
	Error(RespError),
}

/// Decodes RESP values out of byte buffers.
///
/// A decoder holds no buffer state; it can be shared freely and reused for
/// any number of inputs. Push elements are ordered by the comparator given
/// to [`Decoder::new`].
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
	limits: Limits,
	push_order: PushOrder,
}

impl Decoder {
	pub fn new(push_order: PushOrder) -> Self {
		Self {
			limits: Limits::default(),
			push_order,
		}
	}

	pub fn with_limits(mut self, limits: Limits) -> Self {
		self.limits = limits;
		self
	}

	pub fn limits(&self) -> &Limits {
		&self.limits
	}

	/// Decode one value from the front of `buf`.
	///
	/// The input is never modified; payloads of the returned value are
	/// slices of it. Inputs shorter than two bytes, and inputs that end in
	/// the middle of a value, report `Incomplete` so the caller can buffer
	/// more data and retry. A malformed header anywhere in the tree aborts
	/// the whole decode.
	pub fn decode(&self, buf: &Bytes) -> RespParseResult {
		if buf.len() < 2 {
			return RespParseResult::Incomplete;
		}

		match self.decode_value(buf, 0) {
			Ok((value, rest)) => RespParseResult::Complete(value, rest),
			Err(ParseError::UnexpectedEOF) => RespParseResult::Incomplete,
			Err(e) => RespParseResult::Error(RespError::Parse(e)),
		}
	}

	/// Take one complete message off the front of a stream buffer.
	///
	/// The validator measures the message first, so exactly its bytes are
	/// split off `buf` and bytes of the next message are left in place.
	/// Returns `Ok(None)` while the message is still incomplete.
	pub fn decode_frame(&self, buf: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
		let frame_len = match Validator::new().with_limits(self.limits).frame_len(&buf[..]) {
			Ok(len) => len,
			Err(e) if e.is_incomplete() => return Ok(None),
			Err(e) => {
				debug!(error = %e, buffered = buf.len(), "Rejecting malformed frame");
				return Err(e.into());
			}
		};

		let frame = buf.split_to(frame_len).freeze();
		match self.decode(&frame) {
			RespParseResult::Complete(value, _) => Ok(Some(value)),
			RespParseResult::Incomplete => Err(ParseError::UnexpectedEOF.into()),
			RespParseResult::Error(e) => Err(e),
		}
	}

	fn decode_value(&self, buf: &Bytes, depth: usize) -> Result<(RespValue, Bytes), ParseError> {
		let marker = *buf.first().ok_or(ParseError::UnexpectedEOF)?;
		if !is_valid_type_marker(marker) {
			return decode_untyped_line(buf);
		}

		let (header, line_len) = extract_line(&buf[1..])?;
		let text = buf.slice(1..1 + header.len());
		let rest = buf.slice(1 + line_len..);

		let value = match marker {
			SIMPLE_STRING => RespValue::SimpleString(single_line(text, "Simple string")?),
			ERROR => RespValue::Error(single_line(text, "Simple error")?),
			INTEGER => RespValue::Integer(parse_integer(header)?),
			NULL => {
				if !header.is_empty() {
					return Err(ParseError::InvalidFormat(
						"Null must have an empty payload".to_string(),
					));
				}
				RespValue::Null
			}
			BOOLEAN => match header {
				b"t" => RespValue::Boolean(true),
				b"f" => RespValue::Boolean(false),
				_ => {
					return Err(ParseError::InvalidFormat(
						"Boolean must be 't' or 'f'".to_string(),
					));
				}
			},
			DOUBLE => RespValue::Double(parse_double(header)?),
			BIG_NUMBER => {
				parse_big_number(header)?;
				RespValue::BigNumber(text)
			}
			BULK_STRING => {
				let length = parse_integer(header)?;
				if length == -1 {
					return Ok((RespValue::Null, rest));
				}
				let (data, rest) = self.take_payload(length, &rest, "bulk string")?;
				return Ok((RespValue::BulkString(data), rest));
			}
			BULK_ERROR => {
				let length = parse_integer(header)?;
				let (data, rest) = self.take_payload(length, &rest, "bulk error")?;
				return Ok((RespValue::BulkError(data), rest));
			}
			VERBATIM_STRING => {
				let length = parse_integer(header)?;
				let (data, rest) = self.take_payload(length, &rest, "verbatim string")?;
				if data.len() < 4 || data[3] != b':' {
					return Err(ParseError::InvalidFormat(
						"Verbatim string must have format prefix".to_string(),
					));
				}
				let value = RespValue::VerbatimString {
					format: data.slice(0..3),
					data: data.slice(4..),
				};
				return Ok((value, rest));
			}
			ARRAY => {
				let count = parse_integer(header)?;
				if count < 0 {
					// Legacy null array, surfaced as an empty array.
					return Ok((RespValue::Array(Vec::new()), rest));
				}
				return self.decode_array(count, rest, depth);
			}
			MAP => {
				let count = parse_integer(header)?;
				return self.decode_map(count, rest, depth);
			}
			SET => {
				let count = parse_integer(header)?;
				return self.decode_set(count, rest, depth);
			}
			PUSH => {
				let count = parse_integer(header)?;
				return self.decode_push(count, rest, depth);
			}
			_ => unreachable!("marker checked by is_valid_type_marker"),
		};

		Ok((value, rest))
	}

	/// Slice a length-prefixed payload and its CRLF off the front of `rest`.
	fn take_payload(
		&self,
		length: i64,
		rest: &Bytes,
		what: &str,
	) -> Result<(Bytes, Bytes), ParseError> {
		if length < 0 {
			return Err(ParseError::InvalidBulkStringLength(length));
		}
		if self.limits.bulk_exceeds(length) {
			return Err(ParseError::BulkTooLarge(length));
		}

		let length = length as usize;
		if rest.len() < length + 2 {
			return Err(ParseError::UnexpectedEOF);
		}
		if &rest[length..length + 2] != CRLF {
			return Err(ParseError::InvalidFormat(format!(
				"Missing CRLF after {}",
				what
			)));
		}

		Ok((rest.slice(..length), rest.slice(length + 2..)))
	}

	/// Check an aggregate header against the limits before descending.
	fn enter_aggregate(&self, count: i64, depth: usize) -> Result<usize, ParseError> {
		if count < 0 {
			return Err(ParseError::InvalidArrayLength(count));
		}
		if depth >= self.limits.max_depth {
			return Err(ParseError::NestingTooDeep(depth + 1));
		}
		if self.limits.count_exceeds(count) {
			return Err(ParseError::CollectionTooLarge(count));
		}
		Ok(count as usize)
	}

	fn decode_array(
		&self,
		count: i64,
		mut rest: Bytes,
		depth: usize,
	) -> Result<(RespValue, Bytes), ParseError> {
		let count = self.enter_aggregate(count, depth)?;
		// Every element takes at least three bytes on the wire.
		let mut elements = Vec::with_capacity(count.min(rest.len() / 3));
		for _ in 0..count {
			let (value, next) = self.decode_value(&rest, depth + 1)?;
			elements.push(value);
			rest = next;
		}
		Ok((RespValue::Array(elements), rest))
	}

	fn decode_map(
		&self,
		count: i64,
		mut rest: Bytes,
		depth: usize,
	) -> Result<(RespValue, Bytes), ParseError> {
		let count = self.enter_aggregate(count, depth)?;
		let mut map = HashMap::with_capacity(count.min(rest.len() / 6));
		for _ in 0..count {
			let (key, next) = self.decode_value(&rest, depth + 1)?;
			let (value, next) = self.decode_value(&next, depth + 1)?;
			map.insert(key, value);
			rest = next;
		}
		Ok((RespValue::Map(map), rest))
	}

	fn decode_set(
		&self,
		count: i64,
		mut rest: Bytes,
		depth: usize,
	) -> Result<(RespValue, Bytes), ParseError> {
		let count = self.enter_aggregate(count, depth)?;
		let mut set = HashSet::with_capacity(count.min(rest.len() / 3));
		for _ in 0..count {
			let (value, next) = self.decode_value(&rest, depth + 1)?;
			set.insert(value);
			rest = next;
		}
		Ok((RespValue::Set(set), rest))
	}

	fn decode_push(
		&self,
		count: i64,
		mut rest: Bytes,
		depth: usize,
	) -> Result<(RespValue, Bytes), ParseError> {
		let count = self.enter_aggregate(count, depth)?;
		let mut queue = PushQueue::with_capacity(self.push_order, count.min(rest.len() / 3));
		for _ in 0..count {
			let (value, next) = self.decode_value(&rest, depth + 1)?;
			queue.push(value);
			rest = next;
		}
		Ok((RespValue::Push(queue), rest))
	}
}

/// A line without a type marker is taken verbatim as plain text.
fn decode_untyped_line(buf: &Bytes) -> Result<(RespValue, Bytes), ParseError> {
	let (line, line_len) = extract_line(buf)?;
	let text = single_line(buf.slice(..line.len()), "Untyped line")?;
	Ok((RespValue::SimpleString(text), buf.slice(line_len..)))
}

/// Reject a lone CR or LF inside a line-framed string.
fn single_line(text: Bytes, what: &str) -> Result<Bytes, ParseError> {
	if has_line_break(&text) {
		return Err(ParseError::InvalidFormat(format!(
			"{} contains a line break",
			what
		)));
	}
	Ok(text)
}

/// Convenience function for one-off decoding.
///
/// Uses default limits and keeps push elements in arrival order. Trailing
/// bytes after the first value are ignored; use [`Decoder::decode`] to get
/// them back.
pub fn parse(buf: &Bytes) -> Result<RespValue, ParseError> {
	match Decoder::new(push_order::arrival).decode(buf) {
		RespParseResult::Complete(value, _) => Ok(value),
		RespParseResult::Incomplete => Err(ParseError::UnexpectedEOF),
		RespParseResult::Error(RespError::Parse(e)) => Err(e),
		RespParseResult::Error(e) => Err(ParseError::InvalidFormat(e.to_string())),
	}
}
