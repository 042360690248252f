// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::mem;

mod sealed {
	pub trait Sealed { }
}

/// A primitive buffer element: a byte, UTF-16 char unit, short, int, long, float
/// or double. Elements are plain data, so any byte pattern of the right width
/// decodes to some value.
pub trait Element: bytemuck::Pod + Default + Debug + Unpin + sealed::Sealed {
	/// The width in bytes.
	const SIZE: usize = mem::size_of::<Self>();
	/// The buffer type name, used for display.
	const NAME: &'static str;

	/// Buffer equality. Exact for integral types; floats additionally treat every
	/// NaN as equal to every other NaN.
	fn elem_eq(self, other: Self) -> bool;

	/// Buffer ordering, consistent with [`elem_eq`](Self::elem_eq).
	fn elem_cmp(self, other: Self) -> Ordering;

	/// The value's contribution to a buffer hash code, consistent with
	/// [`elem_eq`](Self::elem_eq).
	fn hash_key(self) -> i32;
}

macro_rules! integral {
	($($ty:ident $name:literal),+) => {
		$(
		impl sealed::Sealed for $ty { }

		impl Element for $ty {
			const NAME: &'static str = $name;

			#[inline]
			fn elem_eq(self, other: Self) -> bool { self == other }
			#[inline]
			fn elem_cmp(self, other: Self) -> Ordering { self.cmp(&other) }
			#[inline]
			fn hash_key(self) -> i32 { self as i32 }
		}
		)+
	};
}

integral! {
	u8  "ByteBuffer",
	u16 "CharBuffer",
	i16 "ShortBuffer",
	i32 "IntBuffer"
}

impl sealed::Sealed for i64 { }

impl Element for i64 {
	const NAME: &'static str = "LongBuffer";

	#[inline]
	fn elem_eq(self, other: Self) -> bool { self == other }
	#[inline]
	fn elem_cmp(self, other: Self) -> Ordering { self.cmp(&other) }
	#[inline]
	fn hash_key(self) -> i32 { (self ^ (self >> 32)) as i32 }
}

macro_rules! floating {
	($($ty:ident $bits:ident $name:literal $fold:expr),+) => {
		$(
		impl sealed::Sealed for $ty { }

		impl Element for $ty {
			const NAME: &'static str = $name;

			#[inline]
			fn elem_eq(self, other: Self) -> bool {
				self == other || (self.is_nan() && other.is_nan())
			}

			#[inline]
			fn elem_cmp(self, other: Self) -> Ordering {
				if self.elem_eq(other) {
					Ordering::Equal
				} else {
					// Only one side can be NaN here, and total_cmp places a
					// positive NaN above everything; negative NaNs are folded up.
					let fix = |v: $ty| if v.is_nan() { $ty::NAN } else { v };
					fix(self).total_cmp(&fix(other))
				}
			}

			#[inline]
			fn hash_key(self) -> i32 {
				let canonical = if self.is_nan() {
					$ty::NAN
				} else if self == 0.0 {
					0.0
				} else {
					self
				};
				let fold: fn($bits) -> i32 = $fold;
				fold(canonical.to_bits())
			}
		}
		)+
	};
}

floating! {
	f32 u32 "FloatBuffer" |bits| bits as i32,
	f64 u64 "DoubleBuffer" |bits| (bits ^ (bits >> 32)) as i32
}
