//! Grammar and length checking without materializing values.
//!
//! The validator walks the same grammar as the decoder but only accumulates
//! byte counts. A stream reader calls [`Validator::frame_len`] to learn how
//! many buffered bytes make up the next message, splits exactly that many
//! off, and hands them to the decoder.

use crate::error::ValidationError;
use crate::error::ValidationErrorKind;
use crate::error::ValidationErrorKind::*;
use crate::limits::Limits;
use crate::utils::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
	limits: Limits,
}

impl Validator {
	pub const fn new() -> Self {
		Self {
			limits: Limits::new(),
		}
	}

	pub const fn with_limits(mut self, limits: Limits) -> Self {
		self.limits = limits;
		self
	}

	/// Number of leading bytes of `buf` that form one complete message.
	///
	/// Bytes after the message are never inspected. An error whose
	/// [`is_incomplete`](ValidationError::is_incomplete) is true means the
	/// message may still be arriving.
	pub fn frame_len(&self, buf: &[u8]) -> Result<usize, ValidationError> {
		Scan {
			buf,
			limits: &self.limits,
			whole: false,
		}
		.value(0, 0)
	}

	/// Check that `buf` is exactly one well-formed message: no truncation and
	/// no trailing bytes.
	pub fn validate(&self, buf: &[u8]) -> Result<(), ValidationError> {
		if buf.len() < 3 {
			return Err(ValidationError::new(0, TooShort));
		}
		if !buf.ends_with(CRLF) {
			return Err(ValidationError::new(buf.len(), MissingTerminator));
		}

		let consumed = Scan {
			buf,
			limits: &self.limits,
			whole: true,
		}
		.value(0, 0)?;

		if consumed != buf.len() {
			return Err(ValidationError::new(
				consumed,
				TrailingBytes {
					consumed,
					total: buf.len(),
				},
			));
		}
		Ok(())
	}
}

/// [`Validator::frame_len`] with default limits.
pub fn frame_len(buf: &[u8]) -> Result<usize, ValidationError> {
	Validator::new().frame_len(buf)
}

/// [`Validator::validate`] with default limits.
pub fn validate(buf: &[u8]) -> Result<(), ValidationError> {
	Validator::new().validate(buf)
}

struct Scan<'a> {
	buf: &'a [u8],
	limits: &'a Limits,
	// The buffer is known to hold the entire message, so a short payload is
	// a length mismatch rather than a message still in flight.
	whole: bool,
}

impl Scan<'_> {
	/// Validate the value starting at `pos` and return the position just
	/// past it.
	fn value(&self, pos: usize, depth: usize) -> Result<usize, ValidationError> {
		let marker = *self.buf.get(pos).ok_or_else(|| self.incomplete())?;
		if !is_valid_type_marker(marker) {
			return Err(ValidationError::new(pos, InvalidTypeMarker(marker)));
		}

		let (header, line_len) = peek_line(&self.buf[pos + 1..]).ok_or_else(|| self.incomplete())?;
		let header_pos = pos + 1;
		let body = header_pos + line_len;

		match marker {
			SIMPLE_STRING | ERROR => {
				if has_line_break(header) {
					return Err(invalid_header(header_pos, "line break inside a simple string"));
				}
				Ok(body)
			}
			INTEGER => {
				parse_integer(header).map_err(|e| invalid_header(header_pos, e))?;
				Ok(body)
			}
			NULL => {
				if !header.is_empty() {
					return Err(invalid_header(header_pos, "null must have an empty payload"));
				}
				Ok(body)
			}
			BOOLEAN => match header {
				b"t" | b"f" => Ok(body),
				_ => Err(invalid_header(header_pos, "boolean must be 't' or 'f'")),
			},
			DOUBLE => {
				parse_double(header).map_err(|e| invalid_header(header_pos, e))?;
				Ok(body)
			}
			BIG_NUMBER => {
				parse_big_number(header).map_err(|e| invalid_header(header_pos, e))?;
				Ok(body)
			}
			BULK_STRING => {
				let length = parse_integer(header).map_err(|e| invalid_header(header_pos, e))?;
				if length == -1 {
					return Ok(body);
				}
				self.payload(length, header_pos, body).map(|(_, end)| end)
			}
			BULK_ERROR => {
				let length = parse_integer(header).map_err(|e| invalid_header(header_pos, e))?;
				self.payload(length, header_pos, body).map(|(_, end)| end)
			}
			VERBATIM_STRING => {
				let length = parse_integer(header).map_err(|e| invalid_header(header_pos, e))?;
				let (payload, end) = self.payload(length, header_pos, body)?;
				if payload.len() < 4 || payload[3] != b':' {
					return Err(ValidationError::new(body, InvalidVerbatimFormat));
				}
				Ok(end)
			}
			ARRAY => {
				let count = parse_integer(header).map_err(|e| invalid_header(header_pos, e))?;
				if count < 0 {
					return Ok(body);
				}
				self.children(count, 1, pos, body, depth)
			}
			MAP => {
				let count = parse_integer(header).map_err(|e| invalid_header(header_pos, e))?;
				self.children(count, 2, pos, body, depth)
			}
			SET | PUSH => {
				let count = parse_integer(header).map_err(|e| invalid_header(header_pos, e))?;
				self.children(count, 1, pos, body, depth)
			}
			_ => Err(ValidationError::new(pos, InvalidTypeMarker(marker))),
		}
	}

	/// Check a length-prefixed payload starting at `start`.
	///
	/// Returns the payload and the position past its terminator. The
	/// declared length is accepted when CRLF follows exactly `length` bytes,
	/// so binary payloads may themselves contain CRLF.
	fn payload(
		&self,
		length: i64,
		header_pos: usize,
		start: usize,
	) -> Result<(&[u8], usize), ValidationError> {
		if length < 0 {
			return Err(invalid_header(
				header_pos,
				format!("negative length {}", length),
			));
		}
		if self.limits.bulk_exceeds(length) {
			return Err(ValidationError::new(header_pos, BulkTooLarge(length)));
		}

		let declared = length as usize;
		let rest = &self.buf[start..];
		let available = rest.len() >= declared + 2;
		if available && &rest[declared..declared + 2] == CRLF {
			return Ok((&rest[..declared], start + declared + 2));
		}
		if !available && !self.whole {
			return Err(self.incomplete());
		}

		match find_crlf(rest) {
			Some(actual) => Err(ValidationError::new(
				start,
				LengthMismatch { declared, actual },
			)),
			None if available => Err(ValidationError::new(
				start,
				LengthMismatch {
					declared,
					actual: rest.len(),
				},
			)),
			None => Err(self.incomplete()),
		}
	}

	/// Validate `count * per_entry` children following an aggregate header.
	fn children(
		&self,
		count: i64,
		per_entry: usize,
		pos: usize,
		start: usize,
		depth: usize,
	) -> Result<usize, ValidationError> {
		if count < 0 {
			return Err(invalid_header(
				pos + 1,
				format!("negative count {}", count),
			));
		}
		if depth >= self.limits.max_depth {
			return Err(ValidationError::new(pos, NestingTooDeep(depth + 1)));
		}
		if self.limits.count_exceeds(count) {
			return Err(ValidationError::new(pos + 1, CollectionTooLarge(count)));
		}

		let mut cursor = start;
		for _ in 0..count {
			for _ in 0..per_entry {
				cursor = self.value(cursor, depth + 1)?;
			}
		}
		Ok(cursor)
	}

	fn incomplete(&self) -> ValidationError {
		ValidationError::new(self.buf.len(), Incomplete)
	}
}

fn invalid_header(offset: usize, reason: impl ToString) -> ValidationError {
	ValidationError::new(offset, ValidationErrorKind::InvalidHeader(reason.to_string()))
}
