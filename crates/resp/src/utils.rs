//! Utility functions and constants for RESP protocol.

use crate::error::ParseError;

/// CRLF line ending
pub const CRLF: &[u8] = b"\r\n";

/// Type markers for RESP2
pub const SIMPLE_STRING: u8 = b'+';
pub const ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK_STRING: u8 = b'$';
pub const ARRAY: u8 = b'*';

/// Type markers for RESP3
pub const NULL: u8 = b'_';
pub const BOOLEAN: u8 = b'#';
pub const DOUBLE: u8 = b',';
pub const BIG_NUMBER: u8 = b'(';
pub const BULK_ERROR: u8 = b'!';
pub const VERBATIM_STRING: u8 = b'=';
pub const MAP: u8 = b'%';
pub const SET: u8 = b'~';
pub const PUSH: u8 = b'>';

/// Find the position of CRLF in a byte slice
#[inline]
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
	memchr::memmem::find(buf, CRLF)
}

/// True if `buf` holds a CR or LF byte anywhere.
///
/// Simple strings and simple errors may not carry either, even unpaired.
#[inline]
pub fn has_line_break(buf: &[u8]) -> bool {
	memchr::memchr2(b'\r', b'\n', buf).is_some()
}

/// Split a line off the front of `buf`.
///
/// Returns the line without its terminator and the number of bytes the line
/// occupies including CRLF, or `None` if no terminator is buffered yet.
#[inline]
pub fn peek_line(buf: &[u8]) -> Option<(&[u8], usize)> {
	find_crlf(buf).map(|pos| (&buf[..pos], pos + 2))
}

/// Extract a line from buffer (without CRLF)
#[inline]
pub fn extract_line(buf: &[u8]) -> Result<(&[u8], usize), ParseError> {
	peek_line(buf).ok_or(ParseError::UnexpectedEOF)
}

/// Parse an integer from a byte slice
#[inline]
pub fn parse_integer(buf: &[u8]) -> Result<i64, ParseError> {
	let s = std::str::from_utf8(buf)?;
	s.parse::<i64>()
		.map_err(|e| ParseError::InvalidInteger(format!("{:?}: {}", s, e)))
}

/// Parse a double from a byte slice
#[inline]
pub fn parse_double(buf: &[u8]) -> Result<f64, ParseError> {
	let s = std::str::from_utf8(buf)?;

	// Handle special values
	match s {
		"inf" | "+inf" => Ok(f64::INFINITY),
		"-inf" => Ok(f64::NEG_INFINITY),
		"nan" => Ok(f64::NAN),
		_ => s
			.parse::<f64>()
			.map_err(|e| ParseError::InvalidDouble(format!("{:?}: {}", s, e))),
	}
}

/// Check that a byte slice is an optionally signed run of decimal digits.
#[inline]
pub fn parse_big_number(buf: &[u8]) -> Result<(), ParseError> {
	let digits = match buf.first() {
		Some(b'+') | Some(b'-') => &buf[1..],
		_ => buf,
	};
	if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
		return Err(ParseError::InvalidBigNumber(
			String::from_utf8_lossy(buf).into_owned(),
		));
	}
	Ok(())
}

/// Check if a type marker is valid
#[inline]
pub fn is_valid_type_marker(marker: u8) -> bool {
	matches!(
		marker,
		SIMPLE_STRING
			| ERROR | INTEGER
			| BULK_STRING
			| ARRAY | NULL
			| BOOLEAN | DOUBLE
			| BIG_NUMBER
			| BULK_ERROR
			| VERBATIM_STRING
			| MAP | SET
			| PUSH
	)
}
