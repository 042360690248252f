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

use std::{fmt, io, result};
use std::cell::{BorrowError, BorrowMutError};
use std::error::Error as StdError;
use std::fmt::{Debug, Display, Formatter};
use amplify_derive::Display;

pub type ErrorBox = Box<dyn StdError + Send + Sync>;

pub trait OperationKind: Copy + Debug + Display {
	fn unknown() -> Self;
}

pub trait ErrorKindType: Copy + Debug + Display {
	fn other(message: &'static str) -> Self;
}

/// An error raised by operation `O`, of kind `K`, optionally caused by another
/// error.
#[derive(Debug)]
pub struct OpError<O: OperationKind, K: ErrorKindType> {
	op: O,
	kind: K,
	source: Option<ErrorBox>,
}

impl<O: OperationKind, K: ErrorKindType> Display for OpError<O, K> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let Self { op, kind, source } = self;
		if let Some(source) = source {
			write!(f, "{op} failed; {kind} ({source})")
		} else {
			write!(f, "{op} failed; {kind}")
		}
	}
}

impl<O: OperationKind, K: ErrorKindType> StdError for OpError<O, K> {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.source.as_ref().map(|source| source.as_ref() as _)
	}
}

impl<O: OperationKind, K: ErrorKindType> OpError<O, K> {
	pub(crate) fn new(op: O, kind: K, source: Option<ErrorBox>) -> Self {
		Self { op, kind, source }
	}

	/// Creates a new error with a custom message.
	pub fn other(op: O, message: &'static str, source: Option<ErrorBox>) -> Self {
		Self::new(op, K::other(message), source)
	}

	/// Returns the operation kind.
	pub fn operation(&self) -> O { self.op }

	/// Sets the operation kind.
	pub fn with_operation(mut self, op: O) -> Self {
		self.op = op;
		self
	}

	/// Returns the error kind.
	pub fn kind(&self) -> K { self.kind }

	/// Sets the error kind.
	pub fn with_kind(mut self, kind: K) -> Self {
		self.kind = kind;
		self
	}

	/// Sets the source error.
	pub fn with_source(mut self, source: impl Into<ErrorBox>) -> Self {
		self.source = Some(source.into());
		self
	}
}

impl<O: OperationKind, K: ErrorKindType> From<&'static str> for OpError<O, K> {
	fn from(value: &'static str) -> Self {
		Self::other(O::unknown(), value, None)
	}
}

/// The buffer operation that failed.
#[derive(Copy, Clone, Debug, Default, Display, Eq, PartialEq)]
pub enum Operation {
	#[default]
	#[display("unknown operation")]
	Unknown,
	#[display("get")]
	Get,
	#[display("put")]
	Put,
	#[display("set position")]
	Position,
	#[display("set limit")]
	Limit,
	#[display("reset to mark")]
	Reset,
	#[display("compact")]
	Compact,
	#[display("slice")]
	Slice,
	#[display("duplicate")]
	Duplicate,
	#[display("create view")]
	View,
	#[display("wrap array")]
	Wrap,
	#[display("allocate")]
	Allocate,
	#[display("access backing array")]
	Array,
	#[display("free native memory")]
	Free,
	#[display("map file")]
	Map,
	#[display("load mapped region")]
	Load,
	#[display("force mapped region")]
	Force,
	#[display("transfer bytes")]
	Io,
	#[display("{0}")]
	Other(&'static str),
}

impl OperationKind for Operation {
	fn unknown() -> Self { Self::Unknown }
}

/// The kind of contract violation or failure a buffer operation reports.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
	/// A relative get with fewer elements remaining than requested.
	#[display("buffer underflow")]
	Underflow,
	/// A relative put with less space remaining than requested.
	#[display("buffer overflow")]
	Overflow,
	/// An index or array range outside the valid bounds.
	#[display("index out of range")]
	IndexOutOfRange,
	/// A structurally invalid argument, such as a limit beyond the capacity.
	#[display("invalid argument")]
	InvalidArgument,
	/// A reset with no mark set.
	#[display("mark not set")]
	InvalidMark,
	/// A mutation or array exposure on a read-only buffer.
	#[display("buffer is read-only")]
	ReadOnly,
	/// An operation the buffer's storage does not support.
	#[display("unsupported operation")]
	Unsupported,
	/// An access to native memory that has been released.
	#[display("native memory was freed")]
	UseAfterFree,
	/// The shared backing array was borrowed elsewhere for the duration of the
	/// operation.
	#[display("backing array is borrowed")]
	Borrowed,
	/// Native memory could not be allocated.
	#[display("allocation failed")]
	Alloc,
	#[display("IO error")]
	Io,
	#[display("{0}")]
	Other(&'static str),
}

impl ErrorKindType for ErrorKind {
	fn other(message: &'static str) -> Self { Self::Other(message) }
}

impl ErrorKind {
	pub fn is_underflow(&self) -> bool { matches!(self, Self::Underflow) }
	pub fn is_overflow (&self) -> bool { matches!(self, Self::Overflow) }
	pub fn is_index_out_of_range(&self) -> bool { matches!(self, Self::IndexOutOfRange) }
	pub fn is_invalid_argument  (&self) -> bool { matches!(self, Self::InvalidArgument) }
	pub fn is_invalid_mark(&self) -> bool { matches!(self, Self::InvalidMark) }
	pub fn is_read_only   (&self) -> bool { matches!(self, Self::ReadOnly) }
	pub fn is_unsupported (&self) -> bool { matches!(self, Self::Unsupported) }
	pub fn is_use_after_free(&self) -> bool { matches!(self, Self::UseAfterFree) }
	pub fn is_borrowed(&self) -> bool { matches!(self, Self::Borrowed) }
}

/// A buffer error.
pub type Error = OpError<Operation, ErrorKind>;
pub type Result<T = ()> = result::Result<T, Error>;

impl Error {
	pub(crate) fn of(op: Operation, kind: ErrorKind) -> Self {
		Self::new(op, kind, None)
	}

	pub(crate) fn underflow(op: Operation) -> Self { Self::of(op, ErrorKind::Underflow) }
	pub(crate) fn overflow (op: Operation) -> Self { Self::of(op, ErrorKind::Overflow) }
	pub(crate) fn out_of_range(op: Operation) -> Self { Self::of(op, ErrorKind::IndexOutOfRange) }
	pub(crate) fn invalid_arg (op: Operation) -> Self { Self::of(op, ErrorKind::InvalidArgument) }
	pub(crate) fn read_only  (op: Operation) -> Self { Self::of(op, ErrorKind::ReadOnly) }
	pub(crate) fn unsupported(op: Operation) -> Self { Self::of(op, ErrorKind::Unsupported) }
	pub(crate) fn freed(op: Operation) -> Self { Self::of(op, ErrorKind::UseAfterFree) }

	/// Creates a new IO error.
	pub fn io(op: Operation, error: io::Error) -> Self {
		Self::new(op, ErrorKind::Io, Some(error.into()))
	}

	/// Returns the source downcast into an IO Error, if possible.
	pub fn io_source(&self) -> Option<&io::Error> {
		self.source()?.downcast_ref()
	}
}

impl From<io::Error> for Error {
	fn from(value: io::Error) -> Self {
		Self::io(Operation::Unknown, value)
	}
}

impl From<BorrowError> for Error {
	fn from(_: BorrowError) -> Self { Self::of(Operation::Unknown, ErrorKind::Borrowed) }
}

impl From<BorrowMutError> for Error {
	fn from(_: BorrowMutError) -> Self { Self::of(Operation::Unknown, ErrorKind::Borrowed) }
}

impl From<Error> for io::Error {
	fn from(value: Error) -> Self {
		let kind = match value.kind() {
			ErrorKind::Underflow => io::ErrorKind::UnexpectedEof,
			ErrorKind::Overflow  => io::ErrorKind::WriteZero,
			ErrorKind::ReadOnly  => io::ErrorKind::PermissionDenied,
			ErrorKind::Unsupported => io::ErrorKind::Unsupported,
			ErrorKind::IndexOutOfRange |
			ErrorKind::InvalidArgument => io::ErrorKind::InvalidInput,
			ErrorKind::Borrowed => io::ErrorKind::WouldBlock,
			ErrorKind::Alloc => io::ErrorKind::OutOfMemory,
			_ => io::ErrorKind::Other,
		};
		io::Error::new(kind, value)
	}
}

/// Sets the operation on an error result, leaving `Ok` untouched.
pub(crate) trait ResultContext<T> {
	fn context(self, op: Operation) -> Result<T>;
}

impl<T, E: Into<Error>> ResultContext<T> for result::Result<T, E> {
	fn context(self, op: Operation) -> Result<T> {
		self.map_err(|err| err.into().with_operation(op))
	}
}
