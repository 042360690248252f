// SPDX-License-Identifier: Apache-2.0

use std::convert::Infallible;
use std::result;
use std::str::FromStr;
use crate::error::{Error, Operation, Result};
use super::Buffer;

impl Buffer<u16> {
	/// Writes the UTF-16 encoding of `str` at the position, advancing it by the
	/// number of code units written. Fails with [`Overflow`] without writing if
	/// the units don't fit.
	///
	/// [`Overflow`]: crate::ErrorKind::Overflow
	pub fn put_str(&mut self, str: &str) -> Result<&mut Self> {
		let units: Vec<u16> = str.encode_utf16().collect();
		self.put_slice(&units)
	}

	/// Decodes the remaining code units as UTF-16, replacing unpaired surrogates
	/// with `U+FFFD`. The position does not move.
	pub fn to_string_lossy(&self) -> Result<String> {
		Ok(String::from_utf16_lossy(&self.to_vec()?))
	}

	/// Decodes the remaining code units as UTF-16, failing with
	/// [`InvalidArgument`] on unpaired surrogates. The position does not move.
	///
	/// [`InvalidArgument`]: crate::ErrorKind::InvalidArgument
	pub fn try_to_string(&self) -> Result<String> {
		String::from_utf16(&self.to_vec()?).map_err(|err|
			Error::invalid_arg(Operation::Get).with_source(err)
		)
	}
}

impl From<&str> for Buffer<u16> {
	/// Creates a char buffer over the UTF-16 encoding of `value`.
	fn from(value: &str) -> Self {
		value.encode_utf16().collect::<Vec<_>>().into()
	}
}

impl FromStr for Buffer<u16> {
	type Err = Infallible;

	fn from_str(s: &str) -> result::Result<Self, Infallible> {
		Ok(s.into())
	}
}
