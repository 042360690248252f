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

#![allow(dead_code, unused_macros)]

use std::fmt::{Arguments, Debug};
use niobuf::ByteBuffer;
use tracing_subscriber::EnvFilter;

macro_rules! qc_assert_eq {
	($left:expr,$right:expr) => {{
		let left = $left;
		let right = $right;
		if left == right {
			TestResult::passed()
		} else {
			TestResult::error(
				common::format_qc_assert_error(&left, &right, None)
			)
		}
	}};
	($left:expr,$right:expr,$($arg:tt)+) => {{
		let left = $left;
		let right = $right;
		if left == right {
			TestResult::passed()
		} else {
			TestResult::error(
				common::format_qc_assert_error(&left, &right, Some(format_args!($($arg)+)))
			)
		}
	}};
}

pub fn format_qc_assert_error<L: Debug, R: Debug>(left: &L, right: &R, msg: Option<Arguments>) -> String {
	if let Some(msg) = msg {
		format!(
			"assertion failed `(left == right)`: {msg}\n \
			left: `{left:?}`,\nright: `{right:?}`",
		)
	} else {
		format!(
			"assertion failed `(left == right)`:\n \
			left: `{left:?}`,\nright: `{right:?}`",
		)
	}
}

/// Prints crate logs to the test output, filtered by `RUST_LOG`.
pub fn init_logging() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// Creates byte buffers with `data` as their remaining content, one for each kind
/// of storage: a heap array, native memory, and a slice of a larger array.
pub fn byte_buffers(data: &[u8]) -> [(&'static str, ByteBuffer); 3] {
	let heap = ByteBuffer::from(data);

	let mut direct = ByteBuffer::allocate_direct(data.len()).unwrap();
	direct.put_slice(data).unwrap().flip();

	let mut padded = vec![0xEE; data.len() + 2];
	padded[1..=data.len()].copy_from_slice(data);
	let mut outer = ByteBuffer::from(padded);
	outer.set_limit(data.len() + 1).unwrap()
		 .set_position(1).unwrap();
	let slice = outer.slice().unwrap();

	[("heap", heap), ("direct", direct), ("slice", slice)]
}
