// SPDX-License-Identifier: Apache-2.0

use std::mem;
use criterion::{BatchSize, Bencher, black_box, Criterion, criterion_group, criterion_main};
use niobuf::{ByteBuffer, ByteOrder, IntBuffer};

const SIZE: usize = 8192;

fn put_slice(c: &mut Criterion) {
	let data = vec![0xA5u8; SIZE];
	let mut group = c.benchmark_group("put_slice");
	group.bench_function("heap", |b| b.iter(|| {
		let mut buf = ByteBuffer::allocate(SIZE);
		buf.put_slice(&data).unwrap();
		buf
	}));
	group.bench_function("direct", |b| b.iter(|| {
		let mut buf = ByteBuffer::allocate_direct(SIZE).unwrap();
		buf.put_slice(&data).unwrap();
		buf
	}));
}

fn put_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("put_numbers");

	macro_rules! gen {
		($($name:literal $fn:ident $ty:ident $order:expr),+) => {
			$(
			group.bench_function($name, |b| {
				let mut buf = ByteBuffer::allocate_direct(SIZE).unwrap();
				buf.set_order($order);
				b.iter(|| {
					for _ in 0..SIZE / mem::size_of::<$ty>() {
						let _ = black_box(buf.$fn($ty::MAX));
					}
					buf.clear();
				})
			});
			)+
		};
	}

	gen!(
		"put_short"    put_short i16 ByteOrder::BigEndian,
		"put_short_le" put_short i16 ByteOrder::LittleEndian,
		"put_int"      put_int   i32 ByteOrder::BigEndian,
		"put_int_le"   put_int   i32 ByteOrder::LittleEndian,
		"put_long"     put_long  i64 ByteOrder::BigEndian,
		"put_long_le"  put_long  i64 ByteOrder::LittleEndian
	);
}

#[inline(always)]
fn read_loop<R>(b: &mut Bencher, buf: &ByteBuffer, read: impl FnMut(&mut ByteBuffer) -> R) {
	b.iter_batched_ref(|| buf.duplicate().unwrap(), read, BatchSize::SmallInput)
}

fn get_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("get_numbers");
	let buffer = ByteBuffer::from(vec![0xFF; SIZE]);

	macro_rules! gen {
		($($fn:ident $ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b|
				read_loop(b, &buffer, |buf|
					for _ in 0..SIZE / mem::size_of::<$ty>() {
						let _ = black_box(buf.$fn());
					}
				)
			);
			)+
		};
	}

	gen!(
		get_short i16,
		get_int   i32,
		get_long  i64,
		get_double f64
	);
}

fn int_view(c: &mut Criterion) {
	let bytes = ByteBuffer::allocate(SIZE);
	let values: Vec<i32> = (0..(SIZE / 4) as i32).collect();
	c.bench_function("int_view_put_slice", |b| b.iter(|| {
		let mut view = bytes.as_int_buffer().unwrap();
		view.put_slice(&values).unwrap();
		view
	}));
	c.bench_function("int_buffer_put_slice", |b| b.iter(|| {
		let mut buf = IntBuffer::allocate(SIZE / 4);
		buf.put_slice(&values).unwrap();
		buf
	}));
}

fn compare(c: &mut Criterion) {
	let a = ByteBuffer::from(vec![1; SIZE]);
	let b = ByteBuffer::from(vec![1; SIZE]);
	c.bench_function("equals", |bench| bench.iter(|| black_box(a.equals(&b).unwrap())));
	c.bench_function("hash_code", |bench| bench.iter(|| black_box(a.hash_code().unwrap())));
}

criterion_group!(benches, put_slice, put_numbers, get_numbers, int_view, compare);
criterion_main!(benches);
