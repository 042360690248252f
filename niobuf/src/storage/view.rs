// SPDX-License-Identifier: Apache-2.0

use std::marker::PhantomData;
use std::ops::Range;
use std::rc::Rc;
use crate::element::Element;
use crate::error::{Error, Operation, Result, ResultContext};
use crate::order::{ByteOrder, decode, encode, MAX_WIDTH};
use super::array::SharedArray;
use super::native::NativeRegion;

/// Byte memory a view encodes its elements into.
#[derive(Clone, Debug)]
pub(crate) enum Memory {
	/// A managed byte array.
	Heap(SharedArray<u8>),
	/// A native region.
	Native(Rc<NativeRegion>),
}

impl Memory {
	pub fn is_direct(&self) -> bool { matches!(self, Self::Native(_)) }

	pub fn region(&self) -> Option<&Rc<NativeRegion>> {
		if let Self::Native(region) = self {
			Some(region)
		} else {
			None
		}
	}

	pub fn check(&self, op: Operation) -> Result {
		match self {
			Self::Heap(_) => Ok(()),
			Self::Native(region) => region.check(op)
		}
	}

	pub fn read(&self, at: usize, dst: &mut [u8]) -> Result {
		match self {
			Self::Heap(array) => {
				let data = array.try_borrow().context(Operation::Get)?;
				let src = data.get(at..at + dst.len()).ok_or_else(|| Error::out_of_range(Operation::Get))?;
				dst.copy_from_slice(src);
				Ok(())
			}
			Self::Native(region) => region.read(at, dst)
		}
	}

	pub fn write(&self, at: usize, src: &[u8]) -> Result {
		match self {
			Self::Heap(array) => {
				let mut data = array.try_borrow_mut().context(Operation::Put)?;
				let dst = data.get_mut(at..at + src.len()).ok_or_else(|| Error::out_of_range(Operation::Put))?;
				dst.copy_from_slice(src);
				Ok(())
			}
			Self::Native(region) => region.write(at, src)
		}
	}

	pub fn copy_within(&self, src: Range<usize>, dst: usize) -> Result {
		match self {
			Self::Heap(array) => {
				let mut data = array.try_borrow_mut().context(Operation::Compact)?;
				if src.end > data.len() || dst + src.len() > data.len() {
					return Err(Error::out_of_range(Operation::Compact))
				}
				data.copy_within(src, dst);
				Ok(())
			}
			Self::Native(region) => region.copy_within(src, dst)
		}
	}
}

/// Storage that encodes elements of type `T` into byte memory, in a fixed byte
/// order. Element `i` occupies bytes `offset + i * T::SIZE` onward.
///
/// Native byte buffers are views of `u8` over a [`NativeRegion`]; typed views of
/// byte buffers are views of wider elements over either kind of memory.
#[derive(Clone, Debug)]
pub(crate) struct ByteView<T> {
	memory: Memory,
	/// The byte offset of element zero.
	offset: usize,
	/// The element count.
	len: usize,
	order: ByteOrder,
	_element: PhantomData<T>,
}

impl<T: Element> ByteView<T> {
	pub fn new(memory: Memory, offset: usize, len: usize, order: ByteOrder) -> Self {
		Self {
			memory,
			offset,
			len,
			order,
			_element: PhantomData,
		}
	}

	pub fn len(&self) -> usize { self.len }
	pub fn offset(&self) -> usize { self.offset }
	pub fn memory(&self) -> &Memory { &self.memory }

	pub fn get(&self, index: usize) -> Result<T> {
		debug_assert!(index < self.len);
		let mut bytes = [0; MAX_WIDTH];
		let bytes = &mut bytes[..T::SIZE];
		self.memory.read(self.byte_index(index), bytes)?;
		Ok(decode(bytes, self.order))
	}

	pub fn set(&self, index: usize, value: T) -> Result {
		debug_assert!(index < self.len);
		let mut bytes = [0; MAX_WIDTH];
		let bytes = &mut bytes[..T::SIZE];
		encode(value, self.order, bytes);
		self.memory.write(self.byte_index(index), bytes)
	}

	/// Decodes `dst.len()` elements starting at `index` into `dst`.
	pub fn read(&self, index: usize, dst: &mut [T]) -> Result {
		self.bounds(index, dst.len(), Operation::Get)?;
		let mut bytes = vec![0; dst.len() * T::SIZE];
		self.memory.read(self.byte_index(index), &mut bytes)?;
		for (value, src) in dst.iter_mut().zip(bytes.chunks_exact(T::SIZE)) {
			*value = decode(src, self.order);
		}
		Ok(())
	}

	/// Encodes `src` into the memory starting at element `index`.
	pub fn write(&self, index: usize, src: &[T]) -> Result {
		self.bounds(index, src.len(), Operation::Put)?;
		let mut bytes = vec![0; src.len() * T::SIZE];
		for (&value, dst) in src.iter().zip(bytes.chunks_exact_mut(T::SIZE)) {
			encode(value, self.order, dst);
		}
		self.memory.write(self.byte_index(index), &bytes)
	}

	/// Moves the elements in `src` to start at element `dst`, scaling both by the
	/// element width.
	pub fn copy_within(&self, src: Range<usize>, dst: usize) -> Result {
		let Range { start, end } = src;
		self.bounds(start, end - start, Operation::Compact)?;
		self.bounds(dst, end - start, Operation::Compact)?;
		self.memory.copy_within(
			self.byte_index(start)..self.byte_index(end),
			self.byte_index(dst)
		)
	}

	/// Returns a view of `len` elements from `index`, sharing the memory.
	pub fn slice(&self, index: usize, len: usize) -> Self {
		debug_assert!(index + len <= self.len);
		Self::new(self.memory.clone(), self.byte_index(index), len, self.order)
	}

	fn byte_index(&self, index: usize) -> usize {
		self.offset + index * T::SIZE
	}

	fn bounds(&self, index: usize, count: usize, op: Operation) -> Result {
		match index.checked_add(count) {
			Some(end) if end <= self.len => Ok(()),
			_ => Err(Error::out_of_range(op))
		}
	}
}

impl ByteView<u8> {
	/// Copies raw bytes starting at byte `index` of the view.
	pub fn read_bytes(&self, index: usize, dst: &mut [u8]) -> Result {
		self.bounds(index, dst.len(), Operation::Get)?;
		self.memory.read(self.offset + index, dst)
	}

	/// Writes raw bytes starting at byte `index` of the view.
	pub fn write_bytes(&self, index: usize, src: &[u8]) -> Result {
		self.bounds(index, src.len(), Operation::Put)?;
		self.memory.write(self.offset + index, src)
	}
}

#[cfg(test)]
mod test {
	use std::rc::Rc;
	use crate::order::ByteOrder::{BigEndian, LittleEndian};
	use crate::storage::array::SharedArray;
	use crate::storage::native::NativeRegion;
	use super::{ByteView, Memory};

	#[test]
	fn ints_over_heap_bytes() {
		let array = SharedArray::<u8>::new(12);
		let view = ByteView::<i32>::new(Memory::Heap(array.clone()), 0, 3, BigEndian);
		view.set(1, 0x01020304).unwrap();
		assert_eq!(array.borrow()[4..8], [1, 2, 3, 4]);
		assert_eq!(view.get(1).unwrap(), 0x01020304);
	}

	#[test]
	fn shorts_over_native_bytes() {
		let region = Rc::new(NativeRegion::allocate(8).unwrap());
		let view = ByteView::<i16>::new(Memory::Native(region.clone()), 2, 3, LittleEndian);
		view.write(0, &[1, 2, 3]).unwrap();
		let mut bytes = [0; 8];
		region.read(0, &mut bytes).unwrap();
		assert_eq!(bytes, [0, 0, 1, 0, 2, 0, 3, 0]);

		let mut values = [0; 2];
		view.read(1, &mut values).unwrap();
		assert_eq!(values, [2, 3]);
	}

	#[test]
	fn scaled_copy() {
		let array = SharedArray::from(vec![0u8, 1, 0, 2, 0, 3, 0, 4]);
		let view = ByteView::<u16>::new(Memory::Heap(array.clone()), 0, 4, BigEndian);
		view.copy_within(2..4, 0).unwrap();
		assert_eq!(array.to_vec(), [0, 3, 0, 4, 0, 3, 0, 4]);
	}

	#[test]
	fn slice_offsets_in_bytes() {
		let array = SharedArray::<u8>::new(16);
		let view = ByteView::<i64>::new(Memory::Heap(array.clone()), 0, 2, BigEndian);
		let slice = view.slice(1, 1);
		assert_eq!(slice.offset(), 8);
		slice.set(0, -1).unwrap();
		assert_eq!(array.borrow()[8..], [0xFF; 8]);
	}

	#[test]
	fn freed_memory() {
		let region = Rc::new(NativeRegion::allocate(4).unwrap());
		let view = ByteView::<f32>::new(Memory::Native(region.clone()), 0, 1, BigEndian);
		region.free();
		assert!(view.get(0).unwrap_err().kind().is_use_after_free());
		assert!(view.set(0, 1.0).unwrap_err().kind().is_use_after_free());
	}
}
