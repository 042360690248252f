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

//! ## How it works
//!
//! A [`Buffer`] is a fixed-capacity window over elements of one primitive type:
//! bytes, UTF-16 code units, shorts, ints, longs, floats or doubles. Each buffer
//! keeps a *cursor* of four indices, `mark <= position <= limit <= capacity`.
//! Relative operations read or write at the position and advance it; absolute
//! operations take an index below the limit. The typical cycle is to fill the
//! buffer with puts, [`flip`](Buffer::flip) it, drain it with gets, then
//! [`clear`](Buffer::clear) or [`compact`](Buffer::compact) it for the next fill.
//!
//! ### Storage
//!
//! Content lives in one of three places:
//!
//! - a managed array, shared by handle through [`SharedArray`];
//! - native memory, for byte buffers from [`ByteBuffer::allocate_direct`];
//! - a mapped file region, for [`MappedByteBuffer`]s (with the `mmap` feature).
//!
//! Buffers created from another by slicing, duplicating or viewing share its
//! storage, each with its own cursor. A write through one is visible through all.
//! Native memory is reference counted and released when the last sharing buffer
//! drops, or earlier by [`free`](Buffer::free). Access after an explicit free
//! fails with [`ErrorKind::UseAfterFree`] on every sharing buffer.
//!
//! ### Byte order
//!
//! Byte buffers carry a [`ByteOrder`], big-endian by default. Their typed gets and
//! puts, such as [`get_int`](Buffer::get_int), and the typed views created from
//! them, such as [`as_int_buffer`](Buffer::as_int_buffer), encode and decode in
//! that order. A view captures the order when created; changing the byte buffer's
//! order later does not affect it.
//!
//! ### Threads
//!
//! Buffers share storage through reference-counted handles, so they are neither
//! `Send` nor `Sync`. A buffer and every buffer sharing its storage stay on the
//! thread that created them; to hand content to another thread, copy it out with
//! [`to_vec`](Buffer::to_vec).

mod buffer;
mod cursor;
mod element;
mod error;
#[cfg(feature = "mmap")]
mod mapped;
mod order;
mod storage;
mod std_io;

pub use buffer::*;
pub use cursor::Cursor;
pub use element::Element;
pub use error::{Error, ErrorBox, ErrorKind, ErrorKindType, OpError, Operation, OperationKind, Result};
#[cfg(feature = "mmap")]
pub use mapped::{MapMode, MappedByteBuffer};
pub use order::{decode, encode, ByteOrder};
pub use storage::{AllocError, NativeRegion, SharedArray};
