// SPDX-License-Identifier: Apache-2.0

use std::rc::Rc;
use crate::cursor::Cursor;
use crate::element::Element;
use crate::error::{Operation, Result, ResultContext};
use crate::order::{ByteOrder, decode, encode, MAX_WIDTH};
use crate::storage::{NativeRegion, Storage};
use crate::storage::view::Memory;
use super::{Buffer, CharBuffer, DoubleBuffer, FloatBuffer, IntBuffer, LongBuffer, ShortBuffer};

impl Buffer<u8> {
	/// Allocates a byte buffer over `capacity` bytes of zeroed native memory.
	///
	/// The memory is released by [`free`](Self::free), or once this buffer and
	/// every buffer sharing its memory are dropped.
	pub fn allocate_direct(capacity: usize) -> Result<Self> {
		let region = NativeRegion::allocate(capacity)?;
		Ok(Self::from_region(Rc::new(region), false))
	}

	/// Creates a byte buffer over all of `region`.
	pub(crate) fn from_region(region: Rc<NativeRegion>, read_only: bool) -> Self {
		let len = region.len();
		let storage = Storage::view(Memory::Native(region), 0, len, ByteOrder::BigEndian);
		Self::new(storage, Cursor::new(len), read_only, ByteOrder::BigEndian)
	}

	/// Sets the byte order used by multi-byte gets and puts, and by views created
	/// after this call. Views created earlier keep their order.
	pub fn set_order(&mut self, order: ByteOrder) -> &mut Self {
		self.order = order;
		self
	}

	/// Reads a `T` from the next `T::SIZE` bytes in the buffer's byte order, then
	/// advances the position past them.
	pub fn get_as<T: Element>(&mut self) -> Result<T> {
		self.storage.check(Operation::Get)?;
		let index = self.cursor.get_start(T::SIZE)?;
		let value = self.read_as(index)?;
		self.cursor.skip(T::SIZE);
		Ok(value)
	}

	/// Reads a `T` from the `T::SIZE` bytes at `index`.
	pub fn get_as_at<T: Element>(&self, index: usize) -> Result<T> {
		self.storage.check(Operation::Get)?;
		self.cursor.check_range(index, T::SIZE, Operation::Get)?;
		self.read_as(index)
	}

	/// Writes `value` into the next `T::SIZE` bytes in the buffer's byte order,
	/// then advances the position past them.
	pub fn put_as<T: Element>(&mut self, value: T) -> Result<&mut Self> {
		self.check_writable(Operation::Put)?;
		let index = self.cursor.put_start(T::SIZE)?;
		self.write_as(index, value)?;
		self.cursor.skip(T::SIZE);
		Ok(self)
	}

	/// Writes `value` into the `T::SIZE` bytes at `index`.
	pub fn put_as_at<T: Element>(&mut self, index: usize, value: T) -> Result<&mut Self> {
		self.check_writable(Operation::Put)?;
		self.cursor.check_range(index, T::SIZE, Operation::Put)?;
		self.write_as(index, value)?;
		Ok(self)
	}

	fn read_as<T: Element>(&self, index: usize) -> Result<T> {
		let mut bytes = [0; MAX_WIDTH];
		let bytes = &mut bytes[..T::SIZE];
		self.storage.read_bytes(index, bytes).context(Operation::Get)?;
		Ok(decode(bytes, self.order))
	}

	fn write_as<T: Element>(&self, index: usize, value: T) -> Result {
		let mut bytes = [0; MAX_WIDTH];
		let bytes = &mut bytes[..T::SIZE];
		encode(value, self.order, bytes);
		self.storage.write_bytes(index, bytes).context(Operation::Put)
	}

	/// Creates a view of the remaining bytes as elements of type `T`, in the
	/// buffer's current byte order.
	///
	/// The view's capacity is the remaining byte count divided by `T::SIZE`,
	/// rounded down; trailing bytes are not part of it. Its element `i` is stored
	/// at byte `position + i * T::SIZE` of this buffer. The view is direct if this
	/// buffer is, read-only if this buffer is, and never array-backed.
	pub fn as_view<T: Element>(&self) -> Result<Buffer<T>> {
		self.storage.check(Operation::View)?;
		let (memory, offset) = self.storage.memory_at(self.position());
		let len = self.remaining() / T::SIZE;
		let storage = Storage::view(memory, offset, len, self.order);
		Ok(Buffer::new(storage, Cursor::new(len), self.read_only, self.order))
	}
}

macro_rules! typed {
	($($ty:ident $view:ident $buf:ident $get:ident $get_at:ident $put:ident $put_at:ident),+) => {
		impl Buffer<u8> {
			$(
			#[doc = concat!("Reads a `", stringify!($ty), "` at the position, advancing it.")]
			#[inline]
			pub fn $get(&mut self) -> Result<$ty> { self.get_as() }

			#[doc = concat!("Reads a `", stringify!($ty), "` at `index`.")]
			#[inline]
			pub fn $get_at(&self, index: usize) -> Result<$ty> { self.get_as_at(index) }

			#[doc = concat!("Writes a `", stringify!($ty), "` at the position, advancing it.")]
			#[inline]
			pub fn $put(&mut self, value: $ty) -> Result<&mut Self> { self.put_as(value) }

			#[doc = concat!("Writes a `", stringify!($ty), "` at `index`.")]
			#[inline]
			pub fn $put_at(&mut self, index: usize, value: $ty) -> Result<&mut Self> {
				self.put_as_at(index, value)
			}

			#[doc = concat!("Creates a view of the remaining bytes as a [`", stringify!($buf), "`].")]
			#[inline]
			pub fn $view(&self) -> Result<$buf> { self.as_view() }
			)+
		}
	};
}

typed! {
	u16 as_char_buffer   CharBuffer   get_char   get_char_at   put_char   put_char_at,
	i16 as_short_buffer  ShortBuffer  get_short  get_short_at  put_short  put_short_at,
	i32 as_int_buffer    IntBuffer    get_int    get_int_at    put_int    put_int_at,
	i64 as_long_buffer   LongBuffer   get_long   get_long_at   put_long   put_long_at,
	f32 as_float_buffer  FloatBuffer  get_float  get_float_at  put_float  put_float_at,
	f64 as_double_buffer DoubleBuffer get_double get_double_at put_double put_double_at
}
