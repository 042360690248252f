// SPDX-License-Identifier: Apache-2.0

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::Range;
use std::rc::Rc;
use crate::element::Element;
use crate::error::{Error, Operation, Result, ResultContext};

struct ArrayCell<T> {
	len: usize,
	data: RefCell<Box<[T]>>,
}

/// A shared handle to a managed array. Cloning the handle shares the array:
/// every clone, and every buffer wrapping it, reads and writes the same elements.
///
/// The array's length is fixed; borrows expose it as a slice, never as the owning
/// box.
pub struct SharedArray<T>(Rc<ArrayCell<T>>);

impl<T> Clone for SharedArray<T> {
	fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Element> SharedArray<T> {
	/// Creates a zero-filled array of `len` elements.
	pub fn new(len: usize) -> Self {
		vec![T::default(); len].into()
	}

	/// Copies the array's elements into a vector.
	pub fn to_vec(&self) -> Vec<T> { self.borrow().to_vec() }
}

impl<T> SharedArray<T> {
	/// Returns the number of elements in the array.
	pub fn len(&self) -> usize { self.0.len }
	/// Returns `true` if the array is empty.
	pub fn is_empty(&self) -> bool { self.0.len == 0 }

	/// Borrows the array.
	///
	/// # Panics
	///
	/// Panics if the array is mutably borrowed.
	pub fn borrow(&self) -> Ref<'_, [T]> {
		Ref::map(self.0.data.borrow(), |data| &**data)
	}

	/// Borrows the array mutably.
	///
	/// # Panics
	///
	/// Panics if the array is borrowed.
	pub fn borrow_mut(&self) -> RefMut<'_, [T]> {
		RefMut::map(self.0.data.borrow_mut(), |data| &mut **data)
	}

	/// Borrows the array, failing if it is mutably borrowed.
	pub fn try_borrow(&self) -> Result<Ref<'_, [T]>> {
		Ok(Ref::map(self.0.data.try_borrow()?, |data| &**data))
	}

	/// Borrows the array mutably, failing if it is borrowed.
	pub fn try_borrow_mut(&self) -> Result<RefMut<'_, [T]>> {
		Ok(RefMut::map(self.0.data.try_borrow_mut()?, |data| &mut **data))
	}

	/// Returns `true` if both handles share the same array.
	pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }

	/// Returns the number of handles sharing the array.
	pub fn share_count(&self) -> usize { Rc::strong_count(&self.0) }
}

impl<T> From<Box<[T]>> for SharedArray<T> {
	fn from(data: Box<[T]>) -> Self {
		Self(Rc::new(ArrayCell {
			len: data.len(),
			data: RefCell::new(data),
		}))
	}
}

impl<T> From<Vec<T>> for SharedArray<T> {
	fn from(value: Vec<T>) -> Self { value.into_boxed_slice().into() }
}

impl<T: Copy> From<&[T]> for SharedArray<T> {
	fn from(value: &[T]) -> Self { Box::<[T]>::from(value).into() }
}

impl<T: Debug> Debug for SharedArray<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.0.data.try_borrow() {
			Ok(data) => f.debug_tuple("SharedArray").field(&&**data).finish(),
			Err(_) => f.debug_tuple("SharedArray").field(&"<borrowed>").finish()
		}
	}
}

/// Buffer storage over a window of a [`SharedArray`].
#[derive(Clone, Debug)]
pub(crate) struct ArrayStorage<T> {
	array: SharedArray<T>,
	/// The array index of storage index zero.
	offset: usize,
	len: usize,
}

impl<T: Element> ArrayStorage<T> {
	pub fn new(array: SharedArray<T>) -> Self {
		let len = array.len();
		Self { array, offset: 0, len }
	}

	pub fn len(&self) -> usize { self.len }
	pub fn offset(&self) -> usize { self.offset }
	pub fn array(&self) -> &SharedArray<T> { &self.array }

	pub fn get(&self, index: usize) -> Result<T> {
		debug_assert!(index < self.len);
		let data = self.array.try_borrow().context(Operation::Get)?;
		Ok(data[self.offset + index])
	}

	pub fn set(&self, index: usize, value: T) -> Result {
		debug_assert!(index < self.len);
		let mut data = self.array.try_borrow_mut().context(Operation::Put)?;
		data[self.offset + index] = value;
		Ok(())
	}

	/// Copies `dst.len()` elements starting at `index` into `dst`.
	pub fn read(&self, index: usize, dst: &mut [T]) -> Result {
		let range = self.range(index, dst.len(), Operation::Get)?;
		let data = self.array.try_borrow().context(Operation::Get)?;
		dst.copy_from_slice(&data[range]);
		Ok(())
	}

	/// Copies `src` into the storage starting at `index`.
	pub fn write(&self, index: usize, src: &[T]) -> Result {
		let range = self.range(index, src.len(), Operation::Put)?;
		let mut data = self.array.try_borrow_mut().context(Operation::Put)?;
		data[range].copy_from_slice(src);
		Ok(())
	}

	/// Moves the elements in `src` to start at `dst`.
	pub fn copy_within(&self, src: Range<usize>, dst: usize) -> Result {
		let Range { start, end } = src;
		self.range(start, end - start, Operation::Compact)?;
		self.range(dst, end - start, Operation::Compact)?;
		let mut data = self.array.try_borrow_mut().context(Operation::Compact)?;
		let off = self.offset;
		data.copy_within(off + start..off + end, off + dst);
		Ok(())
	}

	/// Returns storage over `len` elements from `index`, sharing the array.
	pub fn slice(&self, index: usize, len: usize) -> Self {
		debug_assert!(index + len <= self.len);
		Self {
			array: self.array.clone(),
			offset: self.offset + index,
			len,
		}
	}

	fn range(&self, index: usize, count: usize, op: Operation) -> Result<Range<usize>> {
		match index.checked_add(count) {
			Some(end) if end <= self.len => Ok(self.offset + index..self.offset + end),
			_ => Err(Error::out_of_range(op))
		}
	}
}
