use bytes::BytesMut;
use resp::Decoder;
use resp::push_order;

fn main() {
	println!("--- RESP Streaming Parse Example ---");

	// Simulate a TCP stream with fragmented data
	// We are sending:
	// - A Simple String: "+OK\r\n"
	// - An Integer: ":1000\r\n"
	// - An Array: "*2\r\n$3\r\nSET\r\n$3\r\nkey\r\n"
	// - A Push: ">2\r\n+message\r\n$5\r\nhello\r\n"
	// - But split into random chunks.
	let data_chunks = vec![
		b"+O".as_slice(),
		b"K\r\n:1".as_slice(),
		b"00".as_slice(),
		b"0\r\n*2\r\n$3\r\nSE".as_slice(),
		b"T\r\n$3\r\nk".as_slice(),
		b"ey\r\n>2\r\n+message\r".as_slice(),
		b"\n$5\r\nhello\r\n".as_slice(),
	];

	let decoder = Decoder::new(push_order::arrival);
	let mut buffer = BytesMut::new();

	for (i, chunk) in data_chunks.iter().enumerate() {
		println!(
			"\n[Stream] Received Chunk {}: {:?}",
			i,
			String::from_utf8_lossy(chunk)
		);

		buffer.extend_from_slice(chunk);

		// Drain every complete frame currently buffered
		loop {
			match decoder.decode_frame(&mut buffer) {
				Ok(Some(value)) => println!("[Decoder] Complete: {:?}", value),
				Ok(None) => {
					println!(
						"[Decoder] Incomplete, {} bytes buffered, waiting for more data...",
						buffer.len()
					);
					break;
				}
				Err(e) => {
					eprintln!("[Decoder] Error: {}", e);
					return;
				}
			}
		}
	}
}
