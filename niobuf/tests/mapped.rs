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

#![cfg(feature = "mmap")]

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use pretty_assertions::assert_eq;
use tempfile::tempfile;
use niobuf::{ByteBuffer, MapMode, MappedByteBuffer};

#[macro_use]
mod common;

type Result<T = ()> = std::io::Result<T>;

fn file_with(content: &[u8]) -> Result<File> {
	let mut file = tempfile()?;
	file.write_all(content)?;
	file.seek(SeekFrom::Start(0))?;
	Ok(file)
}

fn read_all(file: &mut File) -> Result<Vec<u8>> {
	let mut content = Vec::new();
	file.seek(SeekFrom::Start(0))?;
	file.read_to_end(&mut content)?;
	Ok(content)
}

#[test]
fn read_write_mapping_reaches_file() -> Result {
	common::init_logging();
	let mut file = file_with(&[0; 16])?;
	let mut buf = MappedByteBuffer::map(&file, MapMode::ReadWrite, 4, 8)?;
	assert_eq!(buf.mode(), MapMode::ReadWrite);
	assert!(buf.is_direct() && !buf.is_read_only());

	buf.put_int(0x01020304)?.put_int(-1)?;
	buf.force()?;
	let mut expected = vec![0; 16];
	expected[4..12].copy_from_slice(&[1, 2, 3, 4, 0xFF, 0xFF, 0xFF, 0xFF]);
	assert_eq!(read_all(&mut file)?, expected);
	Ok(())
}

#[test]
fn read_write_mapping_grows_file() -> Result {
	let mut file = file_with(b"ab")?;
	let mut buf = MappedByteBuffer::map(&file, MapMode::ReadWrite, 0, 4)?;
	assert_eq!(buf.get_char()?, u16::from_be_bytes(*b"ab"));
	buf.put_slice(b"cd")?;
	drop(buf);
	assert_eq!(read_all(&mut file)?, b"abcd");
	Ok(())
}

#[test]
fn private_mapping_leaves_file() -> Result {
	let mut file = file_with(b"orig")?;
	let mut buf = MappedByteBuffer::map(&file, MapMode::Private, 0, 4)?;
	buf.put_slice(b"copy")?;
	buf.force()?;
	buf.flip();
	assert_eq!(buf.to_vec()?, b"copy");
	assert_eq!(read_all(&mut file)?, b"orig");
	Ok(())
}

#[test]
fn read_only_mapping() -> Result {
	let file = file_with(b"\x00\x00\x00\x2A")?;
	let mut buf = MappedByteBuffer::map(&file, MapMode::ReadOnly, 0, 4)?;
	assert!(buf.is_read_only());
	let view = buf.as_int_buffer()?;
	assert!(view.is_read_only() && view.is_direct());
	assert_eq!(view.get_at(0)?, 42);
	assert!(buf.put(1).unwrap_err().kind().is_read_only());
	buf.force()?;
	Ok(())
}

#[test]
fn load_marks_loaded() -> Result {
	let file = file_with(&vec![7; 3 * 4096 + 1])?;
	let buf = MappedByteBuffer::map(&file, MapMode::ReadOnly, 0, 3 * 4096 + 1)?;
	assert!(!buf.is_loaded());
	buf.load()?;
	assert!(buf.is_loaded());
	Ok(())
}

#[test]
fn free_unmaps() -> Result {
	let file = file_with(&[1; 8])?;
	let buf = MappedByteBuffer::map(&file, MapMode::ReadOnly, 0, 8)?;
	buf.load()?;
	let dup = buf.duplicate()?;
	buf.free()?;
	assert!(!buf.is_loaded());
	assert!(dup.get_at(0).unwrap_err().kind().is_use_after_free());
	assert!(buf.load().unwrap_err().kind().is_use_after_free());
	assert!(buf.force().unwrap_err().kind().is_use_after_free());
	Ok(())
}

#[test]
fn into_inner_keeps_mapping() -> Result {
	let file = file_with(&[0; 4])?;
	let mapped = MappedByteBuffer::map(&file, MapMode::ReadWrite, 0, 4)?;
	let mut buf: ByteBuffer = mapped.into();
	buf.put_int(5)?;
	assert_eq!(buf.get_int_at(0)?, 5);
	Ok(())
}
