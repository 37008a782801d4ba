//! Benchmarks for buffer construction and serialization

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use interop::{copy_bytes, CBuffer, Ownership, Primitive};

/// Benchmark scalar construct-and-read for a few kinds
fn bench_scalar_roundtrip(c: &mut Criterion) {
    c.bench_function("scalar_int32", |b| {
        b.iter(|| {
            let buf = CBuffer::int32(black_box(42)).unwrap();
            black_box(buf.to_i64().unwrap())
        })
    });

    c.bench_function("scalar_double", |b| {
        b.iter(|| {
            let buf = CBuffer::double(black_box(1.5)).unwrap();
            black_box(buf.to_f64().unwrap())
        })
    });
}

/// Benchmark array construction for varying element counts
fn bench_array_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_construct");

    for &size in &[16, 256, 4096] {
        let values: Vec<i32> = (0..size as i32).collect();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("{}_elems", size), |b| {
            b.iter(|| {
                let buf = CBuffer::int32_array(black_box(&values)).unwrap();
                black_box(buf)
            })
        });
    }

    group.finish();
}

/// Benchmark array readback
fn bench_array_serialize(c: &mut Criterion) {
    let values: Vec<i32> = (0..1024).collect();
    let buf = CBuffer::int32_array(&values).unwrap();

    c.bench_function("to_vec_1024", |b| {
        b.iter(|| black_box(buf.to_vec(1024).unwrap()))
    });
}

/// Benchmark string construction and readback
fn bench_strings(c: &mut Criterion) {
    let text = "the quick brown fox jumps over the lazy dog";

    c.bench_function("string_construct", |b| {
        b.iter(|| black_box(CBuffer::string(black_box(text)).unwrap()))
    });

    let buf = CBuffer::string(text).unwrap();
    c.bench_function("string_readback", |b| {
        b.iter(|| black_box(buf.to_string().unwrap()))
    });

    c.bench_function("string_array_construct", |b| {
        b.iter(|| black_box(CBuffer::string_array(black_box(&["ab", "cd", "ef"])).unwrap()))
    });
}

/// Benchmark bulk copy into an existing region
fn bench_copy(c: &mut Criterion) {
    let source: Vec<u8> = (0..4096u32).map(|i| i as u8).collect();
    let mut target = CBuffer::array(Primitive::U8, &source, Ownership::Owned).unwrap();

    let mut group = c.benchmark_group("copy_bytes");
    group.throughput(Throughput::Bytes(4096));
    group.bench_function("4096_bytes", |b| {
        b.iter(|| copy_bytes(&mut target, source.as_slice(), 4096).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_scalar_roundtrip,
    bench_array_construct,
    bench_array_serialize,
    bench_strings,
    bench_copy
);
criterion_main!(benches);
