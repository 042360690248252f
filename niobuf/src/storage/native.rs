// SPDX-License-Identifier: Apache-2.0

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::cell::RefCell;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::Range;
use std::ptr;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};
use crate::error::{Error, ErrorKind, Operation, Result};

/// The alignment of native allocations, wide enough for any element.
pub(crate) const ALIGN: usize = 8;

/// A native allocation could not be made.
#[derive(Copy, Clone, Debug, thiserror::Error)]
#[error("cannot allocate {size} bytes of native memory")]
pub struct AllocError {
	pub size: usize,
}

/// What a region's address points into, released when the region is.
enum Backing {
	Alloc(Layout),
	#[cfg(feature = "mmap")]
	Mapped(memmap2::Mmap),
	#[cfg(feature = "mmap")]
	MappedMut(memmap2::MmapMut),
}

/// A native memory region shared by every buffer created from it: a base address,
/// a length, and a validity flag all sharing buffers observe. The region is
/// released exactly once, either by [`free`](Self::free) or when the last handle
/// is dropped.
///
/// The region never hands out references into its memory; all access copies in
/// or out after a validity check, so releasing it cannot invalidate a borrow.
pub struct NativeRegion {
	ptr: NonNull<u8>,
	len: usize,
	writable: bool,
	valid: AtomicBool,
	backing: RefCell<Option<Backing>>,
}

impl NativeRegion {
	/// Allocates a zeroed region of `len` bytes. Empty regions allocate nothing.
	pub fn allocate(len: usize) -> Result<Self> {
		let err = || Error::new(
			Operation::Allocate,
			ErrorKind::Alloc,
			Some(AllocError { size: len }.into())
		);

		if len == 0 {
			return Ok(Self::new(NonNull::dangling(), 0, true, None))
		}

		let layout = Layout::from_size_align(len, ALIGN).map_err(|_| err())?;
		// Safety: the layout has a non-zero size.
		let ptr = unsafe { alloc_zeroed(layout) };
		let ptr = NonNull::new(ptr).ok_or_else(err)?;
		debug!(len, "allocated native region");
		Ok(Self::new(ptr, len, true, Some(Backing::Alloc(layout))))
	}

	/// Wraps a read-only mapping.
	#[cfg(feature = "mmap")]
	pub(crate) fn mapped(map: memmap2::Mmap) -> Self {
		let len = map.len();
		let ptr = NonNull::new(map.as_ptr() as *mut u8).unwrap_or(NonNull::dangling());
		Self::new(ptr, len, false, Some(Backing::Mapped(map)))
	}

	/// Wraps a writable mapping.
	#[cfg(feature = "mmap")]
	pub(crate) fn mapped_mut(mut map: memmap2::MmapMut) -> Self {
		let len = map.len();
		let ptr = NonNull::new(map.as_mut_ptr()).unwrap_or(NonNull::dangling());
		Self::new(ptr, len, true, Some(Backing::MappedMut(map)))
	}

	fn new(ptr: NonNull<u8>, len: usize, writable: bool, backing: Option<Backing>) -> Self {
		Self {
			ptr,
			len,
			writable,
			valid: AtomicBool::new(true),
			backing: RefCell::new(backing),
		}
	}

	/// Returns the region length in bytes.
	pub fn len(&self) -> usize { self.len }
	pub fn is_empty(&self) -> bool { self.len == 0 }
	/// Returns `true` if the region may be written.
	pub fn is_writable(&self) -> bool { self.writable }

	/// Returns `true` until the region is released.
	pub fn is_valid(&self) -> bool { self.valid.load(Ordering::Acquire) }

	/// Fails with [`ErrorKind::UseAfterFree`] if the region has been released.
	pub fn check(&self, op: Operation) -> Result {
		if self.is_valid() {
			Ok(())
		} else {
			Err(Error::freed(op))
		}
	}

	/// Releases the region. The first call frees the memory and invalidates every
	/// buffer sharing it; later calls do nothing.
	pub fn free(&self) {
		if self.valid.swap(false, Ordering::AcqRel) {
			debug!(len = self.len, "freed native region");
			self.release();
		}
	}

	/// Copies `dst.len()` bytes starting at byte `at` into `dst`.
	pub fn read(&self, at: usize, dst: &mut [u8]) -> Result {
		self.check(Operation::Get)?;
		self.bounds(at, dst.len(), Operation::Get)?;
		// Safety: the region is live and `at..at + dst.len()` lies within it; `dst`
		// is a distinct Rust allocation, never memory of this region.
		unsafe {
			ptr::copy_nonoverlapping(self.ptr.as_ptr().add(at), dst.as_mut_ptr(), dst.len());
		}
		Ok(())
	}

	/// Copies `src` into the region starting at byte `at`.
	pub fn write(&self, at: usize, src: &[u8]) -> Result {
		self.check(Operation::Put)?;
		self.check_writable(Operation::Put)?;
		self.bounds(at, src.len(), Operation::Put)?;
		// Safety: as in read, and the region is writable.
		unsafe {
			ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr().add(at), src.len());
		}
		Ok(())
	}

	/// Moves the bytes in `src` to start at byte `dst`. The ranges may overlap.
	pub fn copy_within(&self, src: Range<usize>, dst: usize) -> Result {
		self.check(Operation::Compact)?;
		self.check_writable(Operation::Compact)?;
		let Range { start, end } = src;
		let count = end - start;
		self.bounds(start, count, Operation::Compact)?;
		self.bounds(dst, count, Operation::Compact)?;
		// Safety: both ranges lie within the live region; copy handles overlap.
		unsafe {
			let base = self.ptr.as_ptr();
			ptr::copy(base.add(start), base.add(dst), count);
		}
		Ok(())
	}

	/// Flushes a writable mapping to its file. Other regions are unaffected.
	#[cfg(feature = "mmap")]
	pub(crate) fn flush(&self) -> Result {
		self.check(Operation::Force)?;
		if let Some(Backing::MappedMut(map)) = &*self.backing.borrow() {
			map.flush().map_err(|err| Error::io(Operation::Force, err))?;
			trace!(len = self.len, "flushed mapped region");
		}
		Ok(())
	}

	/// Advises the kernel that the mapped pages will be needed soon.
	#[cfg(feature = "mmap")]
	pub(crate) fn advise_will_need(&self) -> Result {
		self.check(Operation::Load)?;
		#[cfg(unix)]
		{
			use memmap2::Advice::WillNeed;
			let result = match &*self.backing.borrow() {
				Some(Backing::Mapped(map)) => map.advise(WillNeed),
				Some(Backing::MappedMut(map)) => map.advise(WillNeed),
				_ => Ok(())
			};
			result.map_err(|err| Error::io(Operation::Load, err))?;
		}
		Ok(())
	}

	fn check_writable(&self, op: Operation) -> Result {
		if self.writable {
			Ok(())
		} else {
			Err(Error::read_only(op))
		}
	}

	fn bounds(&self, at: usize, count: usize, op: Operation) -> Result {
		match at.checked_add(count) {
			Some(end) if end <= self.len => Ok(()),
			_ => Err(Error::out_of_range(op))
		}
	}

	fn release(&self) {
		match self.backing.borrow_mut().take() {
			// Safety: allocated in `allocate` with this layout, and taken from the
			// backing so it cannot be released twice.
			Some(Backing::Alloc(layout)) => unsafe { dealloc(self.ptr.as_ptr(), layout) },
			#[cfg(feature = "mmap")]
			Some(map) => drop(map),
			None => { }
		}
	}
}

impl Drop for NativeRegion {
	fn drop(&mut self) {
		if self.valid.swap(false, Ordering::AcqRel) {
			trace!(len = self.len, "releasing unreferenced native region");
			self.release();
		}
	}
}

impl Debug for NativeRegion {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("NativeRegion")
			.field("address", &self.ptr)
			.field("len", &self.len)
			.field("writable", &self.writable)
			.field("valid", &self.is_valid())
			.finish()
	}
}

#[cfg(test)]
mod test {
	use std::rc::Rc;
	use super::NativeRegion;
	use crate::Operation;

	#[test]
	fn starts_zeroed() {
		let region = NativeRegion::allocate(16).unwrap();
		let mut bytes = [0xFF; 16];
		region.read(0, &mut bytes).unwrap();
		assert_eq!(bytes, [0; 16]);
	}

	#[test]
	fn read_write_bounds() {
		let region = NativeRegion::allocate(4).unwrap();
		region.write(1, &[1, 2, 3]).unwrap();
		assert!(region.write(2, &[1, 2, 3]).unwrap_err().kind().is_index_out_of_range());
		let mut bytes = [0; 4];
		region.read(0, &mut bytes).unwrap();
		assert_eq!(bytes, [0, 1, 2, 3]);
		assert!(region.read(usize::MAX, &mut bytes).is_err());
	}

	#[test]
	fn overlapping_copy() {
		let region = NativeRegion::allocate(6).unwrap();
		region.write(0, &[1, 2, 3, 4, 5, 6]).unwrap();
		region.copy_within(0..4, 2).unwrap();
		let mut bytes = [0; 6];
		region.read(0, &mut bytes).unwrap();
		assert_eq!(bytes, [1, 2, 1, 2, 3, 4]);
	}

	#[test]
	fn free_is_idempotent_and_shared() {
		let region = Rc::new(NativeRegion::allocate(8).unwrap());
		let other = region.clone();
		region.free();
		assert!(!other.is_valid());
		assert!(other.check(Operation::Get).unwrap_err().kind().is_use_after_free());
		assert!(other.read(0, &mut [0; 1]).unwrap_err().kind().is_use_after_free());
		other.free();
		drop(region);
		drop(other);
	}

	#[test]
	fn empty_region() {
		let region = NativeRegion::allocate(0).unwrap();
		assert!(region.is_empty());
		region.read(0, &mut []).unwrap();
		region.free();
		assert!(!region.is_valid());
	}
}
