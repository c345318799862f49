//! Resource limits shared by the decoder and the validator.

/// Default maximum nesting depth of aggregates (arrays, maps, sets, pushes).
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default maximum declared element count of a single aggregate.
///
/// Matches the multibulk limit Redis applies to client requests.
pub const DEFAULT_MAX_COUNT: usize = 1024 * 1024;

/// Default maximum declared length of a bulk string, bulk error or verbatim
/// string. Matches Redis' `proto-max-bulk-len`.
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Bounds applied to untrusted input before recursing or allocating.
///
/// Declared counts and lengths are checked against these limits as soon as a
/// header is read, so a hostile header such as `*9999999999\r\n` is rejected
/// without reserving memory for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
	/// Maximum aggregate nesting depth. A top-level scalar is depth 0.
	pub max_depth: usize,
	/// Maximum declared element (or pair) count of one aggregate.
	pub max_count: usize,
	/// Maximum declared payload length of one framed value.
	pub max_bulk_len: usize,
}

impl Default for Limits {
	fn default() -> Self {
		Self::new()
	}
}

impl Limits {
	pub const fn new() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			max_count: DEFAULT_MAX_COUNT,
			max_bulk_len: DEFAULT_MAX_BULK_LEN,
		}
	}

	/// Set the maximum nesting depth.
	pub const fn max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth;
		self
	}

	/// Set the maximum aggregate count.
	pub const fn max_count(mut self, count: usize) -> Self {
		self.max_count = count;
		self
	}

	/// Set the maximum bulk payload length.
	pub const fn max_bulk_len(mut self, len: usize) -> Self {
		self.max_bulk_len = len;
		self
	}

	#[inline]
	pub(crate) fn count_exceeds(&self, count: i64) -> bool {
		usize::try_from(count).map_or(true, |c| c > self.max_count)
	}

	#[inline]
	pub(crate) fn bulk_exceeds(&self, len: i64) -> bool {
		usize::try_from(len).map_or(true, |l| l > self.max_bulk_len)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder() {
		let limits = Limits::new().max_depth(4).max_count(10).max_bulk_len(64);
		assert_eq!(limits.max_depth, 4);
		assert_eq!(limits.max_count, 10);
		assert_eq!(limits.max_bulk_len, 64);
		assert_eq!(Limits::default(), Limits::new());
	}

	#[test]
	fn test_exceeds() {
		let limits = Limits::new().max_count(10).max_bulk_len(64);
		assert!(!limits.count_exceeds(10));
		assert!(limits.count_exceeds(11));
		assert!(!limits.bulk_exceeds(64));
		assert!(limits.bulk_exceeds(65));
	}
}
