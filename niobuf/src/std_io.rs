// SPDX-License-Identifier: Apache-2.0

//! Interop between byte buffers and [`std::io`] streams.

use std::cmp::min;
use std::io;
use std::io::{Read, Write};
use tracing::trace;
use crate::buffer::ByteBuffer;
use crate::error::{Error, Operation, Result};

impl ByteBuffer {
	/// Reads from `reader` into the remaining region with a single read call,
	/// advancing the position by the number of bytes read. Returns `0` if the
	/// buffer is full or the reader has reached its end.
	///
	/// Read-only and freed buffers fail before the reader is touched.
	pub fn read_from(&mut self, reader: &mut impl Read) -> Result<usize> {
		self.check_writable(Operation::Io)?;
		if !self.has_remaining() {
			return Ok(0)
		}

		let mut bytes = vec![0; self.remaining()];
		let count = reader.read(&mut bytes).map_err(|err| Error::io(Operation::Io, err))?;
		self.put_slice(&bytes[..count])?;
		trace!(count, "read into buffer");
		Ok(count)
	}

	/// Writes the remaining bytes to `writer` with a single write call, advancing
	/// the position by the number of bytes written.
	///
	/// Freed buffers fail before the writer is touched.
	pub fn write_to(&mut self, writer: &mut impl Write) -> Result<usize> {
		let bytes = self.to_vec()?;
		if bytes.is_empty() {
			return Ok(0)
		}

		let count = writer.write(&bytes).map_err(|err| Error::io(Operation::Io, err))?;
		let position = self.position() + count;
		self.set_position(position)?;
		trace!(count, "wrote from buffer");
		Ok(count)
	}
}

impl Read for ByteBuffer {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let count = min(buf.len(), self.remaining());
		self.get_into(buf, 0, count)?;
		Ok(count)
	}
}

impl Write for ByteBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let count = min(buf.len(), self.remaining());
		self.put_from(buf, 0, count)?;
		Ok(count)
	}

	fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

#[cfg(feature = "bytes")]
mod bytes_conv {
	use bytes::Bytes;
	use crate::buffer::ByteBuffer;
	use crate::error::Error;

	impl From<Bytes> for ByteBuffer {
		/// Copies the bytes into a new array-backed buffer.
		fn from(value: Bytes) -> Self {
			value.to_vec().into()
		}
	}

	impl TryFrom<&ByteBuffer> for Bytes {
		type Error = Error;

		/// Copies the remaining bytes, leaving the position unchanged.
		fn try_from(value: &ByteBuffer) -> Result<Self, Error> {
			Ok(value.to_vec()?.into())
		}
	}

}

#[cfg(test)]
mod test {
	use std::io;
	use std::io::{Read, Write};
	use crate::ByteBuffer;

	#[test]
	fn read_stops_at_limit() {
		let mut buf = ByteBuffer::from(vec![1, 2, 3, 4]);
		buf.set_limit(3).unwrap();
		let mut out = [0; 8];
		assert_eq!(buf.read(&mut out).unwrap(), 3);
		assert_eq!(out[..3], [1, 2, 3]);
		assert_eq!(buf.read(&mut out).unwrap(), 0);
	}

	#[test]
	fn write_fills_remaining() {
		let mut buf = ByteBuffer::allocate(2);
		assert_eq!(buf.write(b"abc").unwrap(), 2);
		assert_eq!(buf.write(b"c").unwrap(), 0);
		assert!(buf.write_all(b"c").is_err());
	}

	#[test]
	fn write_to_read_only_is_denied() {
		let mut buf = ByteBuffer::allocate(2).as_read_only().unwrap();
		let err = buf.write(b"a").unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
	}

	#[test]
	fn freed_buffer_leaves_streams_untouched() {
		let mut buf = ByteBuffer::allocate_direct(4).unwrap();
		buf.free().unwrap();
		let mut reader = &b"abcd"[..];
		assert!(buf.read_from(&mut reader).unwrap_err().kind().is_use_after_free());
		assert_eq!(reader, b"abcd");

		let mut out = Vec::new();
		assert!(buf.write_to(&mut out).unwrap_err().kind().is_use_after_free());
		buf.clear().set_limit(0).unwrap();
		assert!(buf.write_to(&mut out).unwrap_err().kind().is_use_after_free());
		assert!(out.is_empty());
	}

	#[test]
	fn read_only_buffer_leaves_reader_untouched() {
		let mut buf = ByteBuffer::allocate(4).as_read_only().unwrap();
		let mut reader = &b"abcd"[..];
		assert!(buf.read_from(&mut reader).unwrap_err().kind().is_read_only());
		assert_eq!(reader, b"abcd");
		assert_eq!(buf.position(), 0);
	}

	#[test]
	fn stream_transfer() {
		let mut buf = ByteBuffer::allocate_direct(4).unwrap();
		assert_eq!(buf.read_from(&mut &b"xyz"[..]).unwrap(), 3);
		buf.flip();
		let mut out = Vec::new();
		assert_eq!(buf.write_to(&mut out).unwrap(), 3);
		assert_eq!(out, b"xyz");
		assert!(!buf.has_remaining());
	}
}
