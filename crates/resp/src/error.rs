//! Error types for RESP decoding and validation.

use thiserror::Error;

use crate::encode::EncodeError;

/// Main error type for RESP operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RespError {
	/// Error during decoding
	#[error("Parse error: {0}")]
	Parse(#[from] ParseError),

	/// The buffer is not a well-formed message
	#[error("Validation error: {0}")]
	Validation(#[from] ValidationError),

	/// Error during encoding
	#[error("Encode error: {0}")]
	Encode(#[from] EncodeError),
}

/// Errors that can occur during RESP decoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
	/// Unexpected end of input while parsing
	#[error("Unexpected end of input")]
	UnexpectedEOF,

	/// Invalid format for the current type
	#[error("Invalid format: {0}")]
	InvalidFormat(String),

	/// Invalid integer value
	#[error("Invalid integer: {0}")]
	InvalidInteger(String),

	/// Invalid bulk string length
	#[error("Invalid bulk string length: {0}")]
	InvalidBulkStringLength(i64),

	/// Invalid aggregate length
	#[error("Invalid array length: {0}")]
	InvalidArrayLength(i64),

	/// UTF-8 conversion error
	#[error("UTF-8 error: {0}")]
	Utf8Error(String),

	/// Invalid double value
	#[error("Invalid double: {0}")]
	InvalidDouble(String),

	/// Big number is not a run of decimal digits
	#[error("Invalid big number: {0}")]
	InvalidBigNumber(String),

	/// Aggregates nested deeper than the configured limit
	#[error("Nesting too deep: {0} levels")]
	NestingTooDeep(usize),

	/// Declared aggregate count above the configured limit
	#[error("Collection too large: {0} elements")]
	CollectionTooLarge(i64),

	/// Declared bulk length above the configured limit
	#[error("Bulk payload too large: {0} bytes")]
	BulkTooLarge(i64),
}

impl From<std::str::Utf8Error> for ParseError {
	fn from(e: std::str::Utf8Error) -> Self {
		ParseError::Utf8Error(e.to_string())
	}
}

impl From<std::num::ParseIntError> for ParseError {
	fn from(e: std::num::ParseIntError) -> Self {
		ParseError::InvalidInteger(e.to_string())
	}
}

impl From<std::num::ParseFloatError> for ParseError {
	fn from(e: std::num::ParseFloatError) -> Self {
		ParseError::InvalidDouble(e.to_string())
	}
}

/// A buffer that is not exactly one well-formed message.
///
/// `offset` is the absolute byte position, from the start of the validated
/// buffer, where validation stopped.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} (at byte {offset})")]
pub struct ValidationError {
	pub offset: usize,
	pub kind: ValidationErrorKind,
}

impl ValidationError {
	pub(crate) fn new(offset: usize, kind: ValidationErrorKind) -> Self {
		Self { offset, kind }
	}

	/// The buffer ends before the message does. A stream reader should wait
	/// for more bytes instead of treating this as a protocol violation.
	pub fn is_incomplete(&self) -> bool {
		matches!(self.kind, ValidationErrorKind::Incomplete)
	}
}

/// What made a buffer fail validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
	#[error("Message shorter than 3 bytes")]
	TooShort,

	#[error("Message does not end with CRLF")]
	MissingTerminator,

	#[error("Message is truncated")]
	Incomplete,

	#[error("Unrecognized type marker: 0x{0:02X}")]
	InvalidTypeMarker(u8),

	#[error("Invalid header: {0}")]
	InvalidHeader(String),

	#[error("Length mismatch: declared {declared}, actual {actual}")]
	LengthMismatch { declared: usize, actual: usize },

	#[error("Verbatim string must start with a 3-byte format and ':'")]
	InvalidVerbatimFormat,

	#[error("Nesting too deep: {0} levels")]
	NestingTooDeep(usize),

	#[error("Collection too large: {0} elements")]
	CollectionTooLarge(i64),

	#[error("Bulk payload too large: {0} bytes")]
	BulkTooLarge(i64),

	#[error("Trailing bytes: message ends at {consumed} of {total}")]
	TrailingBytes { consumed: usize, total: usize },
}
