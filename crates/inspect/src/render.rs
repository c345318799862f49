//! Human-readable rendering of decoded values, in the style of `redis-cli`.

use std::fmt::Write;

use resp::RespValue;

/// Render `value` the way `redis-cli` prints replies.
///
/// Aggregates are numbered from 1 and nested aggregates hang under their
/// index:
///
/// ```text
/// 1) "GET"
/// 2) 1) (integer) 1
///    2) (nil)
/// ```
pub fn render(value: &RespValue) -> String {
	match value {
		RespValue::SimpleString(s) => escape(s),
		RespValue::Error(e) | RespValue::BulkError(e) => format!("(error) {}", escape(e)),
		RespValue::Integer(i) => format!("(integer) {}", i),
		RespValue::BulkString(s) => quote(s),
		RespValue::Null => "(nil)".to_string(),
		RespValue::Boolean(b) => format!("({})", b),
		RespValue::Double(d) => format!("(double) {}", d),
		RespValue::BigNumber(n) => format!("(big number) {}", String::from_utf8_lossy(n)),
		RespValue::VerbatimString { data, .. } => quote(data),
		RespValue::Array(items) => render_items(items.iter(), items.len(), ")", "(empty array)"),
		RespValue::Set(items) => render_items(items.iter(), items.len(), "~", "(empty set)"),
		RespValue::Push(items) => render_items(items.iter(), items.len(), ")", "(empty push)"),
		RespValue::Map(map) => {
			if map.is_empty() {
				return "(empty hash)".to_string();
			}
			let width = index_width(map.len());
			let entries: Vec<String> = map
				.iter()
				.enumerate()
				.map(|(i, (key, value))| {
					let entry = hang(&format!("{} => ", render(key)), &render(value));
					hang(&format!("{:>width$}# ", i + 1), &entry)
				})
				.collect();
			entries.join("\n")
		}
	}
}

fn render_items<'a>(
	items: impl Iterator<Item = &'a RespValue>,
	len: usize,
	suffix: &str,
	empty: &str,
) -> String {
	if len == 0 {
		return empty.to_string();
	}
	let width = index_width(len);
	items
		.enumerate()
		.map(|(i, item)| hang(&format!("{:>width$}{} ", i + 1, suffix), &render(item)))
		.collect::<Vec<_>>()
		.join("\n")
}

fn index_width(len: usize) -> usize {
	len.to_string().len()
}

/// Prefix the first line of `body` and indent the rest to line up under it.
fn hang(prefix: &str, body: &str) -> String {
	let indent = " ".repeat(prefix.chars().count());
	let mut out = String::with_capacity(prefix.len() + body.len());
	for (i, line) in body.split('\n').enumerate() {
		if i == 0 {
			out.push_str(prefix);
		} else {
			out.push('\n');
			out.push_str(&indent);
		}
		out.push_str(line);
	}
	out
}

/// Double-quote `bytes`, escaping quotes, backslashes and non-printable bytes.
pub fn quote(bytes: &[u8]) -> String {
	format!("\"{}\"", escape(bytes))
}

/// Escape control and non-ASCII bytes so raw wire data fits on one line.
pub fn escape(bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len());
	for &b in bytes {
		match b {
			b'\\' => out.push_str("\\\\"),
			b'"' => out.push_str("\\\""),
			b'\n' => out.push_str("\\n"),
			b'\r' => out.push_str("\\r"),
			b'\t' => out.push_str("\\t"),
			0x20..=0x7e => out.push(b as char),
			_ => {
				let _ = write!(out, "\\x{:02x}", b);
			}
		}
	}
	out
}
