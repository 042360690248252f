// SPDX-License-Identifier: Apache-2.0

mod bytes;
mod chars;
mod cmp;

use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use crate::cursor::Cursor;
use crate::element::Element;
use crate::error::{Error, Operation, Result, ResultContext};
use crate::order::ByteOrder;
use crate::storage::{NativeRegion, SharedArray, Storage};

pub type ByteBuffer   = Buffer<u8>;
pub type CharBuffer   = Buffer<u16>;
pub type ShortBuffer  = Buffer<i16>;
pub type IntBuffer    = Buffer<i32>;
pub type LongBuffer   = Buffer<i64>;
pub type FloatBuffer  = Buffer<f32>;
pub type DoubleBuffer = Buffer<f64>;

/// A fixed-capacity window over elements of type `T`, with a cursor of position,
/// limit and mark.
///
/// A buffer's storage may be shared with other buffers: [`slice`], [`duplicate`],
/// [`as_read_only`] and the typed views of byte buffers all share storage with
/// the buffer they were created from, each with an independent cursor. Writes
/// through any of them are visible through all of them.
///
/// Relative operations ([`get`], [`put`], and the bulk transfers) act at the
/// position and advance it; absolute operations ([`get_at`], [`put_at`]) take an
/// index below the limit and leave the cursor alone. A failed operation leaves
/// the cursor unchanged.
///
/// [`slice`]: Self::slice
/// [`duplicate`]: Self::duplicate
/// [`as_read_only`]: Self::as_read_only
/// [`get`]: Self::get
/// [`put`]: Self::put
/// [`get_at`]: Self::get_at
/// [`put_at`]: Self::put_at
pub struct Buffer<T: Element> {
	storage: Storage<T>,
	cursor: Cursor,
	read_only: bool,
	order: ByteOrder,
}

impl<T: Element> Buffer<T> {
	fn new(storage: Storage<T>, cursor: Cursor, read_only: bool, order: ByteOrder) -> Self {
		debug_assert_eq!(storage.len(), cursor.capacity());
		Self { storage, cursor, read_only, order }
	}

	fn heap(array: SharedArray<T>, cursor: Cursor) -> Self {
		// Byte buffers default to big-endian; wider elements are stored as-is.
		let order = if T::SIZE == 1 {
			ByteOrder::BigEndian
		} else {
			ByteOrder::native()
		};
		Self::new(Storage::array(array), cursor, false, order)
	}

	/// Allocates a buffer over a new, zero-filled array of `capacity` elements.
	pub fn allocate(capacity: usize) -> Self {
		Self::wrap(SharedArray::new(capacity))
	}

	/// Wraps a shared array without copying. The buffer's capacity and limit are
	/// the array's length, and its position is zero.
	pub fn wrap(array: SharedArray<T>) -> Self {
		let cursor = Cursor::new(array.len());
		Self::heap(array, cursor)
	}

	/// Wraps a shared array without copying, with the position at `start` and the
	/// limit at `start + len`. The capacity is the array's length.
	pub fn wrap_range(array: SharedArray<T>, start: usize, len: usize) -> Result<Self> {
		let capacity = array.len();
		let limit = match start.checked_add(len) {
			Some(limit) if limit <= capacity => limit,
			_ => return Err(Error::out_of_range(Operation::Wrap))
		};
		let cursor = Cursor::with_bounds(capacity, start, limit).context(Operation::Wrap)?;
		Ok(Self::heap(array, cursor))
	}

	/// Returns the cursor.
	pub fn cursor(&self) -> &Cursor { &self.cursor }

	pub fn capacity(&self) -> usize { self.cursor.capacity() }
	pub fn position(&self) -> usize { self.cursor.position() }
	pub fn limit   (&self) -> usize { self.cursor.limit() }
	pub fn remaining(&self) -> usize { self.cursor.remaining() }
	pub fn has_remaining(&self) -> bool { self.cursor.has_remaining() }

	/// Sets the position. Fails if it would exceed the limit; discards the mark if
	/// it lies beyond the new position.
	pub fn set_position(&mut self, position: usize) -> Result<&mut Self> {
		self.cursor.set_position(position)?;
		Ok(self)
	}

	/// Sets the limit. Fails if it would exceed the capacity. The position is
	/// clamped to the new limit, and the mark discarded if it lies beyond.
	pub fn set_limit(&mut self, limit: usize) -> Result<&mut Self> {
		self.cursor.set_limit(limit)?;
		Ok(self)
	}

	/// Marks the current position.
	pub fn mark(&mut self) -> &mut Self {
		self.cursor.mark();
		self
	}

	/// Moves the position back to the mark.
	pub fn reset(&mut self) -> Result<&mut Self> {
		self.cursor.reset()?;
		Ok(self)
	}

	/// Clears the cursor for a fresh fill. The content is untouched.
	pub fn clear(&mut self) -> &mut Self {
		self.cursor.clear();
		self
	}

	/// Flips the cursor from writing to reading what was written.
	pub fn flip(&mut self) -> &mut Self {
		self.cursor.flip();
		self
	}

	/// Rewinds the cursor to re-read the content.
	pub fn rewind(&mut self) -> &mut Self {
		self.cursor.rewind();
		self
	}

	/// Returns `true` if put operations are rejected.
	pub fn is_read_only(&self) -> bool { self.read_only }

	/// Returns `true` if the buffer is backed by native memory.
	pub fn is_direct(&self) -> bool { self.storage.is_direct() }

	/// Returns `true` if the buffer exposes an accessible backing array, that is,
	/// it is array-backed and writable.
	pub fn has_array(&self) -> bool {
		!self.read_only && self.storage.backing_array().is_some()
	}

	/// Returns a handle to the backing array.
	///
	/// Fails with [`Unsupported`] for buffers without a backing array, such as
	/// native buffers and views, and with [`ReadOnly`] for read-only buffers,
	/// since writing through the array would bypass the protection.
	///
	/// [`Unsupported`]: crate::ErrorKind::Unsupported
	/// [`ReadOnly`]: crate::ErrorKind::ReadOnly
	pub fn array(&self) -> Result<SharedArray<T>> {
		self.backing_array().map(|(array, _)| array.clone())
	}

	/// Returns the index of the backing array corresponding to buffer index zero.
	/// Fails as [`array`](Self::array) does.
	pub fn array_offset(&self) -> Result<usize> {
		self.backing_array().map(|(_, offset)| offset)
	}

	fn backing_array(&self) -> Result<(&SharedArray<T>, usize)> {
		let Some(array) = self.storage.backing_array() else {
			return Err(Error::unsupported(Operation::Array))
		};
		if self.read_only {
			return Err(Error::read_only(Operation::Array))
		}
		Ok(array)
	}

	/// Returns the byte order elements are stored in. Byte buffers report their
	/// order attribute, views the order they were created with, and array-backed
	/// buffers the platform's order.
	pub fn order(&self) -> ByteOrder { self.order }

	/// Reads the element at the position, then advances it.
	pub fn get(&mut self) -> Result<T> {
		self.storage.check(Operation::Get)?;
		let index = self.cursor.get_start(1)?;
		let value = self.storage.get(index).context(Operation::Get)?;
		self.cursor.skip(1);
		Ok(value)
	}

	/// Reads the element at `index`.
	pub fn get_at(&self, index: usize) -> Result<T> {
		self.storage.check(Operation::Get)?;
		self.cursor.check_index(index, Operation::Get)?;
		self.storage.get(index).context(Operation::Get)
	}

	/// Writes `value` at the position, then advances it.
	pub fn put(&mut self, value: T) -> Result<&mut Self> {
		self.check_writable(Operation::Put)?;
		let index = self.cursor.put_start(1)?;
		self.storage.set(index, value).context(Operation::Put)?;
		self.cursor.skip(1);
		Ok(self)
	}

	/// Writes `value` at `index`.
	pub fn put_at(&mut self, index: usize, value: T) -> Result<&mut Self> {
		self.check_writable(Operation::Put)?;
		self.cursor.check_index(index, Operation::Put)?;
		self.storage.set(index, value).context(Operation::Put)?;
		Ok(self)
	}

	/// Reads `len` elements into `dst[off..off + len]`, advancing the position.
	///
	/// Fails with [`IndexOutOfRange`] if the range lies outside `dst` and with
	/// [`Underflow`] if fewer than `len` elements remain. Arguments are validated
	/// before any element moves, but no rollback is attempted should the storage
	/// fail partway.
	///
	/// [`IndexOutOfRange`]: crate::ErrorKind::IndexOutOfRange
	/// [`Underflow`]: crate::ErrorKind::Underflow
	pub fn get_into(&mut self, dst: &mut [T], off: usize, len: usize) -> Result<&mut Self> {
		self.storage.check(Operation::Get)?;
		let dst = sub_range(dst.len(), off, len, Operation::Get).map(|range| &mut dst[range])?;
		let index = self.cursor.get_start(len)?;
		self.storage.read(index, dst).context(Operation::Get)?;
		self.cursor.skip(len);
		Ok(self)
	}

	/// Fills `dst` from the position, advancing it by `dst.len()`.
	pub fn get_slice(&mut self, dst: &mut [T]) -> Result<&mut Self> {
		let len = dst.len();
		self.get_into(dst, 0, len)
	}

	/// Writes `src[off..off + len]` at the position, advancing it.
	///
	/// Fails with [`IndexOutOfRange`] if the range lies outside `src`, with
	/// [`Overflow`] if less than `len` elements of space remain, and with
	/// [`ReadOnly`] on read-only buffers.
	///
	/// [`IndexOutOfRange`]: crate::ErrorKind::IndexOutOfRange
	/// [`Overflow`]: crate::ErrorKind::Overflow
	/// [`ReadOnly`]: crate::ErrorKind::ReadOnly
	pub fn put_from(&mut self, src: &[T], off: usize, len: usize) -> Result<&mut Self> {
		self.check_writable(Operation::Put)?;
		let src = sub_range(src.len(), off, len, Operation::Put).map(|range| &src[range])?;
		let index = self.cursor.put_start(len)?;
		self.storage.write(index, src).context(Operation::Put)?;
		self.cursor.skip(len);
		Ok(self)
	}

	/// Writes all of `src` at the position, advancing it by `src.len()`.
	pub fn put_slice(&mut self, src: &[T]) -> Result<&mut Self> {
		self.put_from(src, 0, src.len())
	}

	/// Transfers the remaining elements of `src` into this buffer, advancing both
	/// positions by the count transferred.
	///
	/// `src` cannot be this buffer; the borrow rules reject that at compile time.
	/// It may be another buffer sharing this buffer's storage, even overlapping
	/// regions, in which case the transfer behaves as if the source elements were
	/// copied out before any were written.
	pub fn put_buffer(&mut self, src: &mut Buffer<T>) -> Result<&mut Self> {
		self.check_writable(Operation::Put)?;
		let count = src.remaining();
		let index = self.cursor.put_start(count)?;
		let elements = src.to_vec()?;
		self.storage.write(index, &elements).context(Operation::Put)?;
		src.cursor.skip(count);
		self.cursor.skip(count);
		Ok(self)
	}

	/// Copies the remaining elements into a vector without moving the position.
	pub fn to_vec(&self) -> Result<Vec<T>> {
		self.storage.check(Operation::Get)?;
		let mut vec = vec![T::default(); self.remaining()];
		self.storage.read(self.position(), &mut vec).context(Operation::Get)?;
		Ok(vec)
	}

	/// Moves the remaining elements to the start of the buffer, then sets the
	/// position after them and the limit to the capacity. The mark is discarded.
	pub fn compact(&mut self) -> Result<&mut Self> {
		self.check_writable(Operation::Compact)?;
		let remaining = self.remaining();
		let position = self.position();
		if position > 0 && remaining > 0 {
			self.storage.copy_within(position..self.limit(), 0).context(Operation::Compact)?;
		} else {
			self.storage.check(Operation::Compact)?;
		}
		self.cursor.clear();
		self.cursor.skip(remaining);
		Ok(self)
	}

	/// Creates a buffer sharing the remaining region: its index zero is this
	/// buffer's position, and its capacity and limit are this buffer's remaining
	/// count.
	pub fn slice(&self) -> Result<Self> {
		self.storage.check(Operation::Slice)?;
		let remaining = self.remaining();
		let storage = self.storage.slice(self.position(), remaining);
		Ok(Self::new(storage, Cursor::new(remaining), self.read_only, self.order))
	}

	/// Creates a buffer sharing this buffer's storage, with an identical cursor,
	/// read-only state and byte order.
	pub fn duplicate(&self) -> Result<Self> {
		self.storage.check(Operation::Duplicate)?;
		Ok(Self::new(self.storage.clone(), self.cursor, self.read_only, self.order))
	}

	/// Creates a read-only buffer sharing this buffer's storage, with an identical
	/// cursor. A new buffer is returned even if this buffer is already read-only.
	pub fn as_read_only(&self) -> Result<Self> {
		let mut dup = self.duplicate()?;
		dup.read_only = true;
		Ok(dup)
	}

	/// Releases the native memory backing the buffer, invalidating every buffer
	/// sharing it. Later calls do nothing.
	///
	/// Fails with [`Unsupported`](crate::ErrorKind::Unsupported) for buffers not
	/// backed by native memory.
	pub fn free(&self) -> Result {
		let region = self.region().ok_or_else(|| Error::unsupported(Operation::Free))?;
		region.free();
		Ok(())
	}

	/// Returns `true` if the buffer's native memory has been released.
	pub fn is_freed(&self) -> bool {
		self.region().is_some_and(|region| !region.is_valid())
	}

	pub(crate) fn region(&self) -> Option<&Rc<NativeRegion>> {
		self.storage.region()
	}

	pub(crate) fn check_writable(&self, op: Operation) -> Result {
		if self.read_only {
			Err(Error::read_only(op))
		} else {
			self.storage.check(op)
		}
	}
}

/// Returns `off..off + len` if it lies within `0..len_total`.
fn sub_range(len_total: usize, off: usize, len: usize, op: Operation) -> Result<std::ops::Range<usize>> {
	match off.checked_add(len) {
		Some(end) if end <= len_total => Ok(off..end),
		_ => Err(Error::out_of_range(op))
	}
}

impl<T: Element> From<Vec<T>> for Buffer<T> {
	fn from(value: Vec<T>) -> Self {
		Self::wrap(value.into())
	}
}

impl<T: Element> From<Box<[T]>> for Buffer<T> {
	fn from(value: Box<[T]>) -> Self {
		Self::wrap(value.into())
	}
}

impl<T: Element> From<&[T]> for Buffer<T> {
	fn from(value: &[T]) -> Self {
		Self::wrap(value.into())
	}
}

impl<T: Element> From<SharedArray<T>> for Buffer<T> {
	fn from(value: SharedArray<T>) -> Self {
		Self::wrap(value)
	}
}

impl<T: Element> Display for Buffer<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}[pos={} lim={} cap={}]",
			T::NAME,
			self.position(),
			self.limit(),
			self.capacity()
		)
	}
}

impl<T: Element> Debug for Buffer<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct(T::NAME)
			.field("position", &self.position())
			.field("limit", &self.limit())
			.field("capacity", &self.capacity())
			.field("mark", &self.cursor.mark_value())
			.field("read_only", &self.read_only)
			.field("direct", &self.is_direct())
			.field("order", &self.order())
			.finish_non_exhaustive()
	}
}
