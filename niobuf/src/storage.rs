// SPDX-License-Identifier: Apache-2.0

//! Buffer storage backends. A buffer's content lives in one of:
//!
//! - a managed array ([`SharedArray`]), directly indexed;
//! - byte memory, either a managed byte array or a [`NativeRegion`], with each
//!   element encoded in a fixed byte order.
//!
//! Storage is shared by handle. Slicing, duplicating or viewing a buffer clones
//! the handle into a new storage value with its own window, so writes through one
//! buffer are visible through every other buffer sharing the memory.

pub(crate) mod array;
pub(crate) mod native;
pub(crate) mod view;

pub use array::SharedArray;
pub use native::{AllocError, NativeRegion};

use std::ops::Range;
use std::rc::Rc;
use crate::element::Element;
use crate::error::{Operation, Result};
use crate::order::ByteOrder;
use array::ArrayStorage;
use view::{ByteView, Memory};

#[derive(Clone, Debug)]
pub(crate) enum Storage<T: Element> {
	Array(ArrayStorage<T>),
	View(ByteView<T>),
}

impl<T: Element> Storage<T> {
	pub fn array(array: SharedArray<T>) -> Self {
		Self::Array(ArrayStorage::new(array))
	}

	pub fn view(memory: Memory, offset: usize, len: usize, order: ByteOrder) -> Self {
		Self::View(ByteView::new(memory, offset, len, order))
	}

	pub fn len(&self) -> usize {
		match self {
			Self::Array(array) => array.len(),
			Self::View(view) => view.len()
		}
	}

	pub fn is_direct(&self) -> bool {
		matches!(self, Self::View(view) if view.memory().is_direct())
	}

	/// Returns the native region the storage is backed by, if any.
	pub fn region(&self) -> Option<&Rc<NativeRegion>> {
		match self {
			Self::Array(_) => None,
			Self::View(view) => view.memory().region()
		}
	}

	/// Returns the backing array and the array index of storage index zero, if
	/// array-backed.
	pub fn backing_array(&self) -> Option<(&SharedArray<T>, usize)> {
		match self {
			Self::Array(array) => Some((array.array(), array.offset())),
			Self::View(_) => None
		}
	}

	/// Fails if the storage's memory has been released.
	pub fn check(&self, op: Operation) -> Result {
		match self {
			Self::Array(_) => Ok(()),
			Self::View(view) => view.memory().check(op)
		}
	}

	pub fn get(&self, index: usize) -> Result<T> {
		match self {
			Self::Array(array) => array.get(index),
			Self::View(view) => view.get(index)
		}
	}

	pub fn set(&self, index: usize, value: T) -> Result {
		match self {
			Self::Array(array) => array.set(index, value),
			Self::View(view) => view.set(index, value)
		}
	}

	pub fn read(&self, index: usize, dst: &mut [T]) -> Result {
		match self {
			Self::Array(array) => array.read(index, dst),
			Self::View(view) => view.read(index, dst)
		}
	}

	pub fn write(&self, index: usize, src: &[T]) -> Result {
		match self {
			Self::Array(array) => array.write(index, src),
			Self::View(view) => view.write(index, src)
		}
	}

	pub fn copy_within(&self, src: Range<usize>, dst: usize) -> Result {
		match self {
			Self::Array(array) => array.copy_within(src, dst),
			Self::View(view) => view.copy_within(src, dst)
		}
	}

	pub fn slice(&self, index: usize, len: usize) -> Self {
		match self {
			Self::Array(array) => Self::Array(array.slice(index, len)),
			Self::View(view) => Self::View(view.slice(index, len))
		}
	}
}

impl Storage<u8> {
	/// Copies raw bytes starting at `index`.
	pub fn read_bytes(&self, index: usize, dst: &mut [u8]) -> Result {
		match self {
			Self::Array(array) => array.read(index, dst),
			Self::View(view) => view.read_bytes(index, dst)
		}
	}

	/// Writes raw bytes starting at `index`.
	pub fn write_bytes(&self, index: usize, src: &[u8]) -> Result {
		match self {
			Self::Array(array) => array.write(index, src),
			Self::View(view) => view.write_bytes(index, src)
		}
	}

	/// Returns the memory and byte offset of storage index `index`, for creating
	/// views of wider elements.
	pub fn memory_at(&self, index: usize) -> (Memory, usize) {
		match self {
			Self::Array(array) => (Memory::Heap(array.array().clone()), array.offset() + index),
			Self::View(view) => (view.memory().clone(), view.offset() + index)
		}
	}
}
