// SPDX-License-Identifier: Apache-2.0

use std::mem;
use amplify_derive::Display;
use crate::element::Element;

/// The order in which the bytes of a multi-byte value are laid out in memory.
#[derive(Copy, Clone, Debug, Default, Display, Eq, PartialEq, Hash)]
pub enum ByteOrder {
	/// Most significant byte first. The default for byte buffers.
	#[default]
	#[display("BIG_ENDIAN")]
	BigEndian,
	/// Least significant byte first.
	#[display("LITTLE_ENDIAN")]
	LittleEndian,
}

impl ByteOrder {
	/// Returns the byte order of the target platform.
	pub const fn native() -> Self {
		if cfg!(target_endian = "big") {
			Self::BigEndian
		} else {
			Self::LittleEndian
		}
	}

	/// Returns `true` if this order matches the target platform's.
	pub fn is_native(&self) -> bool { *self == Self::native() }

	pub fn is_big_endian(&self) -> bool { matches!(self, Self::BigEndian) }
	pub fn is_little_endian(&self) -> bool { matches!(self, Self::LittleEndian) }
}

/// The widest element, in bytes.
pub(crate) const MAX_WIDTH: usize = mem::size_of::<u64>();

/// Encodes `value` into the first `T::SIZE` bytes of `dst` in `order`.
///
/// Every multi-byte access in the crate funnels through this function and
/// [`decode`]: typed access on byte buffers, view adapters and native storage.
///
/// # Panics
///
/// Panics if `dst` is shorter than `T::SIZE`.
#[inline]
pub fn encode<T: Element>(value: T, order: ByteOrder, dst: &mut [u8]) {
	let dst = &mut dst[..T::SIZE];
	dst.copy_from_slice(bytemuck::bytes_of(&value));
	if !order.is_native() {
		dst.reverse();
	}
}

/// Decodes a value from the first `T::SIZE` bytes of `src` in `order`.
///
/// # Panics
///
/// Panics if `src` is shorter than `T::SIZE`.
#[inline]
pub fn decode<T: Element>(src: &[u8], order: ByteOrder) -> T {
	let mut bytes = [0; MAX_WIDTH];
	let bytes = &mut bytes[..T::SIZE];
	bytes.copy_from_slice(&src[..T::SIZE]);
	if !order.is_native() {
		bytes.reverse();
	}
	bytemuck::pod_read_unaligned(bytes)
}

#[cfg(test)]
mod test {
	use quickcheck_macros::quickcheck;
	use super::{ByteOrder, decode, encode};

	#[test]
	fn big_endian_int() {
		let mut bytes = [0; 4];
		encode(0x01020304i32, ByteOrder::BigEndian, &mut bytes);
		assert_eq!(bytes, [1, 2, 3, 4]);
		assert_eq!(decode::<i32>(&bytes, ByteOrder::BigEndian), 0x01020304);
	}

	#[test]
	fn little_endian_int() {
		let mut bytes = [0; 4];
		encode(0x01020304i32, ByteOrder::LittleEndian, &mut bytes);
		assert_eq!(bytes, [4, 3, 2, 1]);
		assert_eq!(decode::<i32>(&[1, 2, 3, 4], ByteOrder::LittleEndian), 0x04030201);
	}

	#[test]
	fn encodes_prefix_only() {
		let mut bytes = [0xFF; 8];
		encode(0x0102u16, ByteOrder::BigEndian, &mut bytes);
		assert_eq!(bytes, [1, 2, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
	}

	#[test]
	fn double_bits() {
		let mut bytes = [0; 8];
		encode(1.0f64, ByteOrder::BigEndian, &mut bytes);
		assert_eq!(bytes, 1.0f64.to_be_bytes());
	}

	macro_rules! gen {
		($($name:ident $ty:ident),+) => {
			$(
			#[quickcheck]
			fn $name(value: $ty) -> bool {
				let mut be = [0; 8];
				let mut le = [0; 8];
				encode(value, ByteOrder::BigEndian, &mut be);
				encode(value, ByteOrder::LittleEndian, &mut le);
				be[..std::mem::size_of::<$ty>()] == value.to_be_bytes() &&
				le[..std::mem::size_of::<$ty>()] == value.to_le_bytes()
			}
			)+
		};
	}

	gen! {
		matches_std_u16 u16,
		matches_std_i16 i16,
		matches_std_i32 i32,
		matches_std_i64 i64
	}
}
