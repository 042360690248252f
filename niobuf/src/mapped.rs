// SPDX-License-Identifier: Apache-2.0

//! Byte buffers over memory-mapped file regions.

use std::cell::Cell;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use amplify_derive::Display;
use cfg_if::cfg_if;
use memmap2::MmapOptions;
use tracing::debug;
use crate::buffer::ByteBuffer;
use crate::error::{Error, Operation, Result};
use crate::storage::NativeRegion;

cfg_if! {
	if #[cfg(all(target_os = "macos", target_arch = "aarch64"))] {
		const PAGE_SIZE: usize = 16384;
	} else {
		const PAGE_SIZE: usize = 4096;
	}
}

/// How a file region is mapped.
#[derive(Copy, Clone, Debug, Default, Display, Eq, PartialEq, Hash)]
pub enum MapMode {
	/// Reads only; the buffer is read-only.
	#[default]
	#[display("READ_ONLY")]
	ReadOnly,
	/// Reads and writes, with writes carried through to the file.
	#[display("READ_WRITE")]
	ReadWrite,
	/// Copy-on-write: writes are visible through the buffer, never in the file.
	#[display("PRIVATE")]
	Private,
}

/// A byte buffer whose content is a memory-mapped region of a file.
///
/// Dereferences to [`ByteBuffer`] for every buffer operation. The mapping is
/// unmapped by [`free`](ByteBuffer::free), or once this buffer and every buffer
/// sharing its memory are dropped.
pub struct MappedByteBuffer {
	buffer: ByteBuffer,
	mode: MapMode,
	loaded: Cell<bool>,
}

impl MappedByteBuffer {
	/// Maps `len` bytes of `file` from `offset`.
	///
	/// The file must be open for reading, and also for writing in [`ReadWrite`]
	/// mode. A [`ReadWrite`] mapping extending past the end of the file grows the
	/// file to fit; other modes fail with [`InvalidArgument`] instead.
	///
	/// The mapped memory is shared with the file. Modifying or truncating the file
	/// by other means while it is mapped has platform-dependent results.
	///
	/// [`ReadWrite`]: MapMode::ReadWrite
	/// [`InvalidArgument`]: crate::ErrorKind::InvalidArgument
	pub fn map(file: &File, mode: MapMode, offset: u64, len: usize) -> Result<Self> {
		let end = u64::try_from(len)
			.ok()
			.and_then(|len| offset.checked_add(len))
			.ok_or_else(|| Error::invalid_arg(Operation::Map))?;
		let file_len = file.metadata().map_err(|err| Error::io(Operation::Map, err))?.len();
		if end > file_len {
			if mode != MapMode::ReadWrite {
				return Err(Error::invalid_arg(Operation::Map))
			}
			file.set_len(end).map_err(|err| Error::io(Operation::Map, err))?;
		}

		let region = if len == 0 {
			// Empty mappings are rejected by the platform; nothing needs mapping.
			NativeRegion::allocate(0)?
		} else {
			let mut options = MmapOptions::new();
			options.offset(offset).len(len);
			// Safety: the mapping is only ever accessed by copying in and out after
			// a validity check; no reference into it outlives a single access.
			let map = unsafe {
				match mode {
					MapMode::ReadOnly  => options.map(file).map(NativeRegion::mapped),
					MapMode::ReadWrite => options.map_mut(file).map(NativeRegion::mapped_mut),
					MapMode::Private   => options.map_copy(file).map(NativeRegion::mapped_mut),
				}
			};
			map.map_err(|err| Error::io(Operation::Map, err))?
		};

		debug!(offset, len, %mode, "mapped file region");
		let read_only = mode == MapMode::ReadOnly;
		Ok(Self {
			buffer: ByteBuffer::from_region(Rc::new(region), read_only),
			mode,
			loaded: Cell::new(false),
		})
	}

	/// Returns the mode the region was mapped with.
	pub fn mode(&self) -> MapMode { self.mode }

	/// Loads the mapped content into physical memory, as far as the platform
	/// allows: the kernel is advised the pages will be needed, then each page is
	/// read once.
	pub fn load(&self) -> Result<&Self> {
		let region = self.mapped_region(Operation::Load)?;
		region.advise_will_need()?;
		let mut byte = [0];
		for at in (0..region.len()).step_by(PAGE_SIZE) {
			region.read(at, &mut byte)?;
		}
		self.loaded.set(true);
		debug!(len = region.len(), "loaded mapped region");
		Ok(self)
	}

	/// Returns `true` if the content was [loaded](Self::load) and the region has
	/// not been freed since.
	///
	/// The platform is not queried for page residency; this reports the outcome
	/// of the last load. The platform may have paged the content out since.
	pub fn is_loaded(&self) -> bool {
		self.loaded.get() && !self.buffer.is_freed()
	}

	/// Writes changes made through the buffer back to the file. Does nothing for
	/// read-only and private mappings.
	pub fn force(&self) -> Result<&Self> {
		let region = self.mapped_region(Operation::Force)?;
		if self.mode == MapMode::ReadWrite {
			region.flush()?;
			debug!(len = region.len(), "forced mapped region");
		}
		Ok(self)
	}

	/// Unwraps the byte buffer. The mapping lives on in the buffer.
	pub fn into_inner(self) -> ByteBuffer { self.buffer }

	fn mapped_region(&self, op: Operation) -> Result<&Rc<NativeRegion>> {
		let region = self.buffer.region().ok_or_else(|| Error::unsupported(op))?;
		region.check(op)?;
		Ok(region)
	}
}

impl Deref for MappedByteBuffer {
	type Target = ByteBuffer;

	fn deref(&self) -> &ByteBuffer { &self.buffer }
}

impl DerefMut for MappedByteBuffer {
	fn deref_mut(&mut self) -> &mut ByteBuffer { &mut self.buffer }
}

impl Debug for MappedByteBuffer {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MappedByteBuffer")
			.field("buffer", &self.buffer)
			.field("mode", &self.mode)
			.field("loaded", &self.is_loaded())
			.finish()
	}
}

impl From<MappedByteBuffer> for ByteBuffer {
	fn from(value: MappedByteBuffer) -> Self { value.into_inner() }
}

#[cfg(test)]
mod test {
	use std::io::Write;
	use super::{MapMode, MappedByteBuffer};

	#[test]
	fn read_only_mapping() {
		let mut file = tempfile::tempfile().unwrap();
		file.write_all(b"\x00\x01\x02\x03\x04\x05").unwrap();

		let mut buf = MappedByteBuffer::map(&file, MapMode::ReadOnly, 2, 4).unwrap();
		assert!(buf.is_read_only());
		assert!(buf.is_direct());
		assert_eq!(buf.get_int().unwrap(), 0x02030405);
		assert!(buf.put_at(0, 1).unwrap_err().kind().is_read_only());
	}

	#[test]
	fn past_end_of_file() {
		let file = tempfile::tempfile().unwrap();
		let err = MappedByteBuffer::map(&file, MapMode::ReadOnly, 0, 8).err().unwrap();
		assert!(err.kind().is_invalid_argument());
	}

	#[test]
	fn debug_shows_mode_and_load_state() {
		let mut file = tempfile::tempfile().unwrap();
		file.write_all(&[0; 4]).unwrap();
		let buf = MappedByteBuffer::map(&file, MapMode::Private, 0, 4).unwrap();
		buf.load().unwrap();
		let debug = format!("{buf:?}");
		assert!(debug.starts_with("MappedByteBuffer"), "{debug}");
		assert!(debug.contains("mode: Private"), "{debug}");
		assert!(debug.contains("loaded: true"), "{debug}");

		buf.free().unwrap();
		assert!(buf.force().unwrap_err().kind().is_use_after_free());
		assert!(format!("{buf:?}").contains("loaded: false"));
	}

	#[test]
	fn empty_mapping() {
		let file = tempfile::tempfile().unwrap();
		let buf = MappedByteBuffer::map(&file, MapMode::Private, 0, 0).unwrap();
		assert_eq!(buf.capacity(), 0);
		buf.load().unwrap();
		assert!(buf.is_loaded());
	}
}
