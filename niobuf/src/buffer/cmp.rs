// SPDX-License-Identifier: Apache-2.0

//! Content comparison. Two buffers compare by their remaining elements only; the
//! cursor positions, capacities, storage kinds and byte orders play no part.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use crate::element::Element;
use crate::error::{Operation, Result};
use super::Buffer;

impl<T: Element> Buffer<T> {
	/// Returns `true` if both buffers have the same number of remaining elements,
	/// and those elements are pairwise equal.
	///
	/// Floating-point elements equal each other if they are numerically equal or
	/// both NaN.
	pub fn equals(&self, other: &Self) -> Result<bool> {
		if self.remaining() != other.remaining() {
			// Still report freed memory on either side.
			self.storage.check(Operation::Get)?;
			other.storage.check(Operation::Get)?;
			return Ok(false)
		}

		let (a, b) = (self.to_vec()?, other.to_vec()?);
		Ok(a.iter().zip(&b).all(|(&a, &b)| a.elem_eq(b)))
	}

	/// Compares the remaining elements of both buffers lexicographically. If one
	/// buffer's remaining elements are a prefix of the other's, the shorter one
	/// orders first.
	pub fn compare(&self, other: &Self) -> Result<Ordering> {
		let (a, b) = (self.to_vec()?, other.to_vec()?);
		let ord = a.iter()
				   .zip(&b)
				   .map(|(&a, &b)| a.elem_cmp(b))
				   .find(|ord| ord.is_ne())
				   .unwrap_or_else(|| a.len().cmp(&b.len()));
		Ok(ord)
	}

	/// Computes a hash of the remaining elements, combining them last to first as
	/// `h = 31 * h + key` from `h = 1`. Buffers that are [`equals`](Self::equals)
	/// hash equally.
	///
	/// The hash depends on the position; it changes as elements are read.
	pub fn hash_code(&self) -> Result<i32> {
		let hash = self.to_vec()?
					   .iter()
					   .rev()
					   .fold(1i32, |h, &e| h.wrapping_mul(31).wrapping_add(e.hash_key()));
		Ok(hash)
	}
}

/// # Panics
///
/// Panics if either buffer's native memory has been freed, or its backing array is
/// mutably borrowed. Use [`Buffer::equals`] to handle these as errors.
impl<T: Element> PartialEq for Buffer<T> {
	fn eq(&self, other: &Self) -> bool {
		match self.equals(other) {
			Ok(eq) => eq,
			Err(err) => panic!("unable to compare buffers: {err}")
		}
	}
}

impl<T: Element> Eq for Buffer<T> { }

/// # Panics
///
/// Panics under the same conditions as [`PartialEq`]. Use [`Buffer::compare`] to
/// handle these as errors.
impl<T: Element> PartialOrd for Buffer<T> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T: Element> Ord for Buffer<T> {
	fn cmp(&self, other: &Self) -> Ordering {
		match self.compare(other) {
			Ok(ord) => ord,
			Err(err) => panic!("unable to compare buffers: {err}")
		}
	}
}

/// # Panics
///
/// Panics under the same conditions as [`PartialEq`]. Use [`Buffer::hash_code`]
/// to handle these as errors.
impl<T: Element> Hash for Buffer<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match self.hash_code() {
			Ok(hash) => state.write_i32(hash),
			Err(err) => panic!("unable to hash buffer: {err}")
		}
	}
}
