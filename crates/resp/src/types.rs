//! RESP data types and value representation.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::collections::HashSet;

use bytes::Bytes;

/// Represents a RESP protocol value.
///
/// Supports both RESP2 and RESP3 types.
///
/// Doubles compare by bit pattern, so `NaN` equals itself and `0.0` differs
/// from `-0.0`. This keeps equality consistent with `Hash` for map keys and
/// set members.
#[derive(Debug, Clone)]
pub enum RespValue {
	// RESP2 types
	/// Simple string: `+OK\r\n`
	SimpleString(Bytes),

	/// Error: `-ERR message\r\n`
	Error(Bytes),

	/// Integer: `:1000\r\n`
	Integer(i64),

	/// Bulk string: `$6\r\nfoobar\r\n`
	BulkString(Bytes),

	/// Array: `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`
	///
	/// An empty array travels as `*-1\r\n`, the legacy null array.
	Array(Vec<RespValue>),

	/// Null: `_\r\n` (RESP3), also produced by `$-1\r\n` (RESP2)
	Null,

	// RESP3 types
	/// Boolean: `#t\r\n` or `#f\r\n`
	Boolean(bool),

	/// Double: `,3.14\r\n`
	Double(f64),

	/// Big number, kept as its decimal text:
	/// `(3492890328409238509324850943850943825024385\r\n`
	BigNumber(Bytes),

	/// Bulk error: `!21\r\nSYNTAX invalid syntax\r\n`
	BulkError(Bytes),

	/// Verbatim string: `=15\r\ntxt:Some string\r\n`
	VerbatimString { format: Bytes, data: Bytes },

	/// Map: `%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n`
	Map(HashMap<RespValue, RespValue>),

	/// Set: `~5\r\n+orange\r\n+apple\r\n...\r\n`
	Set(HashSet<RespValue>),

	/// Push: `>4\r\n+pubsub\r\n+message\r\n...\r\n`
	Push(PushQueue),
}

impl RespValue {
	/// Check if the value is an error
	pub fn is_error(&self) -> bool {
		matches!(self, RespValue::Error(_) | RespValue::BulkError(_))
	}

	/// Check if the value is null
	pub fn is_null(&self) -> bool {
		matches!(self, RespValue::Null)
	}

	/// Try to convert to a string slice
	pub fn as_str(&self) -> Option<&str> {
		match self {
			RespValue::SimpleString(s) | RespValue::BulkString(s) => std::str::from_utf8(s).ok(),
			_ => None,
		}
	}

	/// Try to convert to bytes
	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			RespValue::SimpleString(b) | RespValue::BulkString(b) => Some(b),
			_ => None,
		}
	}

	/// Try to convert to integer
	pub fn as_integer(&self) -> Option<i64> {
		match self {
			RespValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	/// Try to convert to array
	pub fn as_array(&self) -> Option<&Vec<RespValue>> {
		match self {
			RespValue::Array(a) => Some(a),
			_ => None,
		}
	}

	/// Try to convert to boolean
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			RespValue::Boolean(b) => Some(*b),
			_ => None,
		}
	}

	/// Try to convert to double
	pub fn as_double(&self) -> Option<f64> {
		match self {
			RespValue::Double(d) => Some(*d),
			_ => None,
		}
	}

	/// Try to convert to map
	pub fn as_map(&self) -> Option<&HashMap<RespValue, RespValue>> {
		match self {
			RespValue::Map(m) => Some(m),
			_ => None,
		}
	}

	/// Convert to String with lossy UTF-8 conversion
	pub fn to_string_lossy(&self) -> Option<String> {
		match self {
			RespValue::SimpleString(s) | RespValue::BulkString(s) => {
				Some(String::from_utf8_lossy(s).into_owned())
			}
			_ => None,
		}
	}

	/// Try to consume and convert to Vec<RespValue>. Push elements come out
	/// in pop order.
	pub fn into_vec(self) -> Option<Vec<RespValue>> {
		match self {
			RespValue::Array(a) => Some(a),
			RespValue::Push(p) => Some(p.into_sorted_vec()),
			_ => None,
		}
	}

	// Convenience constructors

	/// Create a simple string value
	pub fn simple_string(s: impl Into<Bytes>) -> Self {
		RespValue::SimpleString(s.into())
	}

	/// Create a bulk string value
	pub fn bulk_string(s: impl Into<Bytes>) -> Self {
		RespValue::BulkString(s.into())
	}

	/// Create an error value
	pub fn error(e: impl Into<Bytes>) -> Self {
		RespValue::Error(e.into())
	}

	/// Create a bulk error value
	pub fn bulk_error(e: impl Into<Bytes>) -> Self {
		RespValue::BulkError(e.into())
	}

	/// Create an integer value
	pub fn integer(i: i64) -> Self {
		RespValue::Integer(i)
	}

	/// Create a big number from its decimal text
	pub fn big_number(n: impl Into<Bytes>) -> Self {
		RespValue::BigNumber(n.into())
	}

	/// Create a verbatim string with a 3-byte format such as `txt` or `mkd`
	pub fn verbatim(format: impl Into<Bytes>, data: impl Into<Bytes>) -> Self {
		RespValue::VerbatimString {
			format: format.into(),
			data: data.into(),
		}
	}

	/// Create an array value from an iterator
	pub fn array(items: impl IntoIterator<Item = RespValue>) -> Self {
		RespValue::Array(items.into_iter().collect())
	}

	/// Create a null value
	pub fn null() -> Self {
		RespValue::Null
	}
}

// Implement Hash for RespValue (needed for Set and Map keys)
impl std::hash::Hash for RespValue {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		match self {
			RespValue::SimpleString(s) | RespValue::BulkString(s) => {
				0u8.hash(state);
				s.hash(state);
			}
			RespValue::Error(e) => {
				1u8.hash(state);
				e.hash(state);
			}
			RespValue::Integer(i) => {
				2u8.hash(state);
				i.hash(state);
			}
			RespValue::Null => 3u8.hash(state),
			RespValue::Boolean(b) => {
				4u8.hash(state);
				b.hash(state);
			}
			RespValue::Double(d) => {
				5u8.hash(state);
				d.to_bits().hash(state);
			}
			RespValue::BigNumber(n) => {
				6u8.hash(state);
				n.hash(state);
			}
			RespValue::BulkError(e) => {
				7u8.hash(state);
				e.hash(state);
			}
			RespValue::VerbatimString { format, data } => {
				8u8.hash(state);
				format.hash(state);
				data.hash(state);
			}
			RespValue::Array(_) | RespValue::Map(_) | RespValue::Set(_) | RespValue::Push(_) => {
				// Collections can't be hashed easily, use type discriminant
				std::mem::discriminant(self).hash(state);
			}
		}
	}
}

impl PartialEq for RespValue {
	fn eq(&self, other: &Self) -> bool {
		use RespValue::*;

		match (self, other) {
			(SimpleString(a), SimpleString(b))
			| (Error(a), Error(b))
			| (BulkString(a), BulkString(b))
			| (BigNumber(a), BigNumber(b))
			| (BulkError(a), BulkError(b)) => a == b,
			(Integer(a), Integer(b)) => a == b,
			(Array(a), Array(b)) => a == b,
			(Null, Null) => true,
			(Boolean(a), Boolean(b)) => a == b,
			(Double(a), Double(b)) => a.to_bits() == b.to_bits(),
			(
				VerbatimString {
					format: fa,
					data: da,
				},
				VerbatimString {
					format: fb,
					data: db,
				},
			) => fa == fb && da == db,
			(Map(a), Map(b)) => a == b,
			(Set(a), Set(b)) => a == b,
			(Push(a), Push(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for RespValue {}

/// Priority comparison used to order the elements of a [`PushQueue`].
pub type PushOrder = fn(&RespValue, &RespValue) -> Ordering;

/// Stock comparators for [`PushQueue`].
pub mod push_order {
	use std::cmp::Ordering;

	use super::RespValue;

	/// Every element has the same priority, so elements pop in the order they
	/// were pushed.
	pub fn arrival(_: &RespValue, _: &RespValue) -> Ordering {
		Ordering::Equal
	}
}

/// Min-priority queue backing the RESP3 push type.
///
/// The smallest element under the queue's [`PushOrder`] pops first; elements
/// that compare equal pop in arrival order. Encoding writes elements in pop
/// order. Push and pop are `O(log n)`.
#[derive(Clone)]
pub struct PushQueue {
	heap: BinaryHeap<PushEntry>,
	order: PushOrder,
	next_seq: u64,
}

/// Heap slot carrying the arrival sequence used to break ties.
#[derive(Clone)]
struct PushEntry {
	value: RespValue,
	seq: u64,
	order: PushOrder,
}

impl Ord for PushEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		// BinaryHeap pops its greatest entry, so both keys are reversed.
		(self.order)(&other.value, &self.value).then_with(|| other.seq.cmp(&self.seq))
	}
}

impl PartialOrd for PushEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialEq for PushEntry {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for PushEntry {}

impl PushQueue {
	pub fn new(order: PushOrder) -> Self {
		Self::with_capacity(order, 0)
	}

	pub fn with_capacity(order: PushOrder, capacity: usize) -> Self {
		Self {
			heap: BinaryHeap::with_capacity(capacity),
			order,
			next_seq: 0,
		}
	}

	/// Build a queue from `items` under `order`.
	pub fn from_iter_with(order: PushOrder, items: impl IntoIterator<Item = RespValue>) -> Self {
		let mut queue = Self::new(order);
		for item in items {
			queue.push(item);
		}
		queue
	}

	pub fn push(&mut self, value: RespValue) {
		let seq = self.next_seq;
		self.next_seq += 1;
		self.heap.push(PushEntry {
			value,
			seq,
			order: self.order,
		});
	}

	/// Remove and return the smallest element.
	pub fn pop(&mut self) -> Option<RespValue> {
		self.heap.pop().map(|entry| entry.value)
	}

	pub fn peek(&self) -> Option<&RespValue> {
		self.heap.peek().map(|entry| &entry.value)
	}

	pub fn len(&self) -> usize {
		self.heap.len()
	}

	pub fn is_empty(&self) -> bool {
		self.heap.is_empty()
	}

	pub fn order(&self) -> PushOrder {
		self.order
	}

	/// Iterate in pop order without consuming the queue.
	pub fn iter(&self) -> impl Iterator<Item = &RespValue> {
		let mut entries: Vec<&PushEntry> = self.heap.iter().collect();
		// Sequence numbers are unique, so the order is total.
		entries.sort_unstable_by(|a, b| b.cmp(a));
		entries.into_iter().map(|entry| &entry.value)
	}

	/// Consume the queue, returning its elements in pop order.
	pub fn into_sorted_vec(self) -> Vec<RespValue> {
		self.heap
			.into_sorted_vec()
			.into_iter()
			.rev()
			.map(|entry| entry.value)
			.collect()
	}
}

impl PartialEq for PushQueue {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().eq(other.iter())
	}
}

impl std::fmt::Debug for PushQueue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

// Convenient From implementations
impl From<&str> for RespValue {
	fn from(s: &str) -> Self {
		RespValue::BulkString(Bytes::from(s.to_string()))
	}
}

impl From<String> for RespValue {
	fn from(s: String) -> Self {
		RespValue::BulkString(Bytes::from(s))
	}
}

impl From<&[u8]> for RespValue {
	fn from(b: &[u8]) -> Self {
		RespValue::BulkString(Bytes::copy_from_slice(b))
	}
}

impl From<Vec<u8>> for RespValue {
	fn from(v: Vec<u8>) -> Self {
		RespValue::BulkString(Bytes::from(v))
	}
}

impl From<i64> for RespValue {
	fn from(i: i64) -> Self {
		RespValue::Integer(i)
	}
}

impl From<i32> for RespValue {
	fn from(i: i32) -> Self {
		RespValue::Integer(i as i64)
	}
}

impl From<u32> for RespValue {
	fn from(i: u32) -> Self {
		RespValue::Integer(i as i64)
	}
}

impl From<bool> for RespValue {
	fn from(b: bool) -> Self {
		RespValue::Boolean(b)
	}
}

impl From<f64> for RespValue {
	fn from(d: f64) -> Self {
		RespValue::Double(d)
	}
}

impl From<Bytes> for RespValue {
	fn from(b: Bytes) -> Self {
		RespValue::BulkString(b)
	}
}

impl From<PushQueue> for RespValue {
	fn from(p: PushQueue) -> Self {
		RespValue::Push(p)
	}
}

impl<T: Into<RespValue>> From<Vec<T>> for RespValue {
	fn from(v: Vec<T>) -> Self {
		RespValue::Array(v.into_iter().map(|x| x.into()).collect())
	}
}

impl<T: Into<RespValue>> From<Option<T>> for RespValue {
	fn from(o: Option<T>) -> Self {
		match o {
			Some(v) => v.into(),
			None => RespValue::Null,
		}
	}
}
