// SPDX-License-Identifier: Apache-2.0

use all_asserts::debug_assert_le;
use crate::error::{Error, ErrorKind, Operation, Result};

/// The position, limit, mark and capacity of a buffer, kept apart from its
/// storage. Every buffer owns its cursor exclusively, even when its storage is
/// shared with other buffers.
///
/// The cursor upholds `mark <= position <= limit <= capacity` at all times, with
/// the mark discarded whenever a move would place it past the position.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cursor {
	capacity: usize,
	limit: usize,
	position: usize,
	mark: Option<usize>,
}

impl Cursor {
	/// Creates a cursor over `capacity` elements, positioned at zero with the
	/// limit at the capacity.
	pub const fn new(capacity: usize) -> Self {
		Self {
			capacity,
			limit: capacity,
			position: 0,
			mark: None,
		}
	}

	/// Creates a cursor with an explicit position and limit.
	pub fn with_bounds(capacity: usize, position: usize, limit: usize) -> Result<Self> {
		if limit > capacity {
			return Err(Error::invalid_arg(Operation::Limit))
		}
		if position > limit {
			return Err(Error::invalid_arg(Operation::Position))
		}

		Ok(Self { capacity, limit, position, mark: None })
	}

	pub fn capacity(&self) -> usize { self.capacity }
	pub fn limit   (&self) -> usize { self.limit }
	pub fn position(&self) -> usize { self.position }
	/// Returns the marked position, if any.
	pub fn mark_value(&self) -> Option<usize> { self.mark }

	/// Returns the number of elements between the position and the limit.
	pub fn remaining(&self) -> usize { self.limit - self.position }
	/// Returns `true` if any elements remain between the position and the limit.
	pub fn has_remaining(&self) -> bool { self.position < self.limit }

	/// Sets the limit. The position is clamped to the new limit, and the mark is
	/// discarded if it lies beyond it.
	pub fn set_limit(&mut self, limit: usize) -> Result {
		if limit > self.capacity {
			return Err(Error::invalid_arg(Operation::Limit))
		}

		self.limit = limit;
		if self.position > limit {
			self.position = limit;
		}
		if self.mark.is_some_and(|mark| mark > limit) {
			self.mark = None;
		}
		self.check_invariant();
		Ok(())
	}

	/// Sets the position, discarding the mark if it lies beyond it.
	pub fn set_position(&mut self, position: usize) -> Result {
		if position > self.limit {
			return Err(Error::invalid_arg(Operation::Position))
		}

		self.position = position;
		if self.mark.is_some_and(|mark| mark > position) {
			self.mark = None;
		}
		self.check_invariant();
		Ok(())
	}

	/// Marks the current position.
	pub fn mark(&mut self) {
		self.mark = Some(self.position);
	}

	/// Moves the position back to the mark.
	pub fn reset(&mut self) -> Result {
		let Some(mark) = self.mark else {
			return Err(Error::of(Operation::Reset, ErrorKind::InvalidMark))
		};
		self.position = mark;
		Ok(())
	}

	/// Prepares for a fresh fill: position zero, limit at capacity, no mark.
	pub fn clear(&mut self) {
		self.position = 0;
		self.limit = self.capacity;
		self.mark = None;
	}

	/// Prepares written content for reading: the limit moves to the position, then
	/// the position to zero. The mark is discarded.
	pub fn flip(&mut self) {
		self.limit = self.position;
		self.position = 0;
		self.mark = None;
	}

	/// Prepares for re-reading: position zero, no mark.
	pub fn rewind(&mut self) {
		self.position = 0;
		self.mark = None;
	}

	/// Returns the position if at least `count` elements remain to be read, failing
	/// with underflow otherwise. The position is not moved; see [`skip`](Self::skip).
	pub(crate) fn get_start(&self, count: usize) -> Result<usize> {
		if self.remaining() < count {
			Err(Error::underflow(Operation::Get))
		} else {
			Ok(self.position)
		}
	}

	/// Returns the position if at least `count` elements of space remain to be
	/// written, failing with overflow otherwise.
	pub(crate) fn put_start(&self, count: usize) -> Result<usize> {
		if self.remaining() < count {
			Err(Error::overflow(Operation::Put))
		} else {
			Ok(self.position)
		}
	}

	/// Advances the position by `count` after a checked transfer.
	pub(crate) fn skip(&mut self, count: usize) {
		debug_assert_le!(count, self.remaining());
		self.position += count;
	}

	/// Fails if `index` is not below the limit.
	pub(crate) fn check_index(&self, index: usize, op: Operation) -> Result<usize> {
		self.check_range(index, 1, op)
	}

	/// Fails if `index..index + count` exceeds the limit.
	pub(crate) fn check_range(&self, index: usize, count: usize, op: Operation) -> Result<usize> {
		match index.checked_add(count) {
			Some(end) if end <= self.limit => Ok(index),
			_ => Err(Error::out_of_range(op))
		}
	}

	fn check_invariant(&self) {
		if let Some(mark) = self.mark {
			debug_assert_le!(mark, self.position);
		}
		debug_assert_le!(self.position, self.limit);
		debug_assert_le!(self.limit, self.capacity);
	}
}
