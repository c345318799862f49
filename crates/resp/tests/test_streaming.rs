use bytes::Bytes;
use bytes::BytesMut;
use resp::Decoder;
use resp::Encoder;
use resp::RespError;
use resp::RespValue;
use resp::push_order;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;

#[test]
fn test_streaming_parse_success() {
	let decoder = Decoder::new(push_order::arrival);
	let mut buf = BytesMut::new();

	// Partial write
	buf.extend_from_slice(b"+HEL");
	assert_eq!(decoder.decode_frame(&mut buf), Ok(None));
	assert_eq!(&buf[..], b"+HEL");

	// Complete the write
	buf.extend_from_slice(b"LO\r\n");
	assert_eq!(
		decoder.decode_frame(&mut buf),
		Ok(Some(RespValue::simple_string("HELLO")))
	);
	assert!(buf.is_empty());
}

#[test]
fn test_streaming_array_split() {
	let decoder = Decoder::new(push_order::arrival);
	let mut buf = BytesMut::new();

	buf.extend_from_slice(b"*2\r\n$3\r\nf");
	assert_eq!(decoder.decode_frame(&mut buf), Ok(None));

	buf.extend_from_slice(b"oo\r\n");
	// Still incomplete because we need the second element
	assert_eq!(decoder.decode_frame(&mut buf), Ok(None));

	buf.extend_from_slice(b"$3\r\nbar\r\n");
	let value = decoder.decode_frame(&mut buf).unwrap().unwrap();
	assert_eq!(
		value,
		RespValue::array(vec![
			RespValue::BulkString(Bytes::from("foo")),
			RespValue::BulkString(Bytes::from("bar")),
		])
	);
}

#[test]
fn test_streaming_protocol_error_is_not_incomplete() {
	let decoder = Decoder::new(push_order::arrival);
	let mut buf = BytesMut::from(&b"?garbage\r\n"[..]);
	assert!(matches!(
		decoder.decode_frame(&mut buf),
		Err(RespError::Validation(_))
	));
}

/// Read frames off `reader` until EOF, feeding arbitrary chunk boundaries
/// through the decoder.
async fn read_frames<R>(mut reader: R, decoder: Decoder) -> Result<Vec<RespValue>, RespError>
where
	R: tokio::io::AsyncRead + Unpin,
{
	let mut buf = BytesMut::with_capacity(16);
	let mut frames = Vec::new();
	loop {
		while let Some(value) = decoder.decode_frame(&mut buf)? {
			frames.push(value);
		}
		let n = reader.read_buf(&mut buf).await.unwrap();
		if n == 0 {
			assert!(buf.is_empty(), "Stream ended mid-message: {:?}", buf);
			return Ok(frames);
		}
	}
}

#[tokio::test]
async fn test_duplex_stream_with_small_writes() {
	let (mut client, server) = tokio::io::duplex(64);

	let sent = vec![
		RespValue::array(vec![
			RespValue::bulk_string("SET"),
			RespValue::bulk_string("key"),
			RespValue::bulk_string("a\r\nvalue with CRLF"),
		]),
		RespValue::simple_string("OK"),
		RespValue::integer(-2324),
		RespValue::verbatim("txt", "Some string"),
		RespValue::big_number("3492890328409238509324850943850943825024385"),
		RespValue::bulk_string(vec![b'x'; 300]),
		RespValue::Null,
	];

	let mut encoder = Encoder::new();
	for value in &sent {
		encoder.encode(value).unwrap();
	}
	let wire = encoder.build();

	let writer = tokio::spawn(async move {
		for chunk in wire.chunks(7) {
			client.write_all(chunk).await.unwrap();
		}
		client.shutdown().await.unwrap();
	});

	let received = read_frames(server, Decoder::new(push_order::arrival))
		.await
		.unwrap();
	writer.await.unwrap();

	assert_eq!(received, sent);
}

#[tokio::test]
async fn test_duplex_stream_rejects_bad_frame() {
	let (mut client, server) = tokio::io::duplex(64);

	let writer = tokio::spawn(async move {
		client.write_all(b"+OK\r\n$2\r\nabc\r\n").await.unwrap();
		client.shutdown().await.unwrap();
	});

	let result = read_frames(server, Decoder::new(push_order::arrival)).await;
	writer.await.unwrap();

	match result {
		Err(RespError::Validation(err)) => {
			assert_eq!(err.offset, 4);
		}
		other => panic!("Expected validation error, got {:?}", other),
	}
}
