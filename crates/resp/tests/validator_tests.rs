//! Integration tests for the RESP validator

use bytes::Bytes;
use resp::Limits;
use resp::ValidationErrorKind;
use resp::Validator;
use rstest::rstest;

const MESSAGES: &[&[u8]] = &[
	b"+OK\r\n",
	b":-2324\r\n",
	b"$3\r\nGET\r\n",
	b"$-1\r\n",
	b"$4\r\na\r\nb\r\n",
	b"=15\r\ntxt:Some string\r\n",
	b"(3492890328409238509324850943850943825024385\r\n",
	b"*2\r\n$3\r\nGET\r\n$1\r\na\r\n",
	b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n",
	b">3\r\n+pubsub\r\n+message\r\n$5\r\nhello\r\n",
	b"*2\r\n*1\r\n~1\r\n#t\r\n,1.5\r\n",
];

#[test]
fn test_frame_len_of_concatenated_messages() {
	for a in MESSAGES {
		for b in MESSAGES {
			let mut joined = a.to_vec();
			joined.extend_from_slice(b);
			assert_eq!(
				resp::frame_len(&joined),
				Ok(a.len()),
				"{:?} followed by {:?}",
				Bytes::copy_from_slice(a),
				Bytes::copy_from_slice(b)
			);
		}
	}
}

#[test]
fn test_every_proper_prefix_is_incomplete() {
	for message in MESSAGES {
		for end in 0..message.len() {
			let prefix = &message[..end];
			let err = resp::frame_len(prefix).unwrap_err();
			assert!(
				err.is_incomplete(),
				"prefix {:?} gave {:?}",
				Bytes::copy_from_slice(prefix),
				err
			);
			// Whole-buffer validation must reject the prefix without panicking.
			assert!(resp::validate(prefix).is_err());
		}
	}
}

#[test]
fn test_validate_agrees_with_decoder() {
	for message in MESSAGES {
		assert_eq!(resp::validate(message), Ok(()));
		let parsed = resp::parse(&Bytes::copy_from_slice(message));
		assert!(parsed.is_ok(), "{:?}", parsed);
	}
}

#[rstest]
#[case(0, false)]
#[case(1, false)]
#[case(2, true)]
#[case(3, false)]
#[case(4, false)]
fn test_bulk_length_must_match_payload(#[case] declared: usize, #[case] valid: bool) {
	let message = format!("${}\r\nab\r\n", declared);
	let result = resp::validate(message.as_bytes());
	assert_eq!(result.is_ok(), valid, "{:?} gave {:?}", message, result);
	if let Err(err) = result {
		assert_eq!(
			err.kind,
			ValidationErrorKind::LengthMismatch {
				declared,
				actual: 2
			}
		);
		assert_eq!(err.offset, 4);
	}
}

#[rstest]
#[case(b"*3\r\n:1\r\n:2\r\n", ValidationErrorKind::Incomplete, 12)]
#[case(b"*1\r\n:1\r\n:2\r\n", ValidationErrorKind::TrailingBytes { consumed: 8, total: 12 }, 8)]
#[case(b"*1\r\n&1\r\n", ValidationErrorKind::InvalidTypeMarker(b'&'), 4)]
#[case(b"\r\n\r\n", ValidationErrorKind::InvalidTypeMarker(b'\r'), 0)]
#[case(b"=4\r\ntxt\r\n", ValidationErrorKind::LengthMismatch { declared: 4, actual: 3 }, 4)]
fn test_validate_reports_kind_and_offset(
	#[case] input: &[u8],
	#[case] kind: ValidationErrorKind,
	#[case] offset: usize,
) {
	let err = resp::validate(input).unwrap_err();
	assert_eq!(err.kind, kind);
	assert_eq!(err.offset, offset);
}

#[test]
fn test_validate_bulk_with_embedded_crlf() {
	assert_eq!(resp::validate(b"$6\r\nfoo\r\nb\r\n"), Ok(()));
	assert_eq!(resp::frame_len(b"$6\r\nfoo\r\nb\r\n+OK\r\n"), Ok(12));
}

#[test]
fn test_limits_reject_hostile_headers() {
	let validator = Validator::new().with_limits(
		Limits::new()
			.max_depth(4)
			.max_count(16)
			.max_bulk_len(64),
	);

	let err = validator.frame_len(b"*1000000000\r\n").unwrap_err();
	assert_eq!(err.kind, ValidationErrorKind::CollectionTooLarge(1_000_000_000));

	let err = validator.frame_len(b"$1000000000\r\n").unwrap_err();
	assert_eq!(err.kind, ValidationErrorKind::BulkTooLarge(1_000_000_000));

	let deep = b"*1\r\n".repeat(5);
	let err = validator.frame_len(&deep).unwrap_err();
	assert_eq!(err.kind, ValidationErrorKind::NestingTooDeep(5));
	assert_eq!(err.offset, 16);
}

#[test]
fn test_error_display_includes_offset() {
	let err = resp::validate(b"?bad\r\n").unwrap_err();
	assert_eq!(err.to_string(), "Unrecognized type marker: 0x3F (at byte 0)");
}
