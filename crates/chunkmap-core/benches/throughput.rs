//! In-place transform throughput benchmarks.
//!
//! Compares a plain loop over a byte buffer with the same transform driven
//! through `Task::collect` at several batch sizes.
//!
//! # Running
//! ```bash
//! cargo bench --package chunkmap-core
//! ```

use chunkmap_core::Task;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const BUFFER_LEN: usize = 16 * 1024 * 1024;

// ─── Workload ─────────────────────────────────────────────────────────────────

fn make_buffer(len: usize) -> Vec<u8> {
    // Cheap xorshift fill so the transform does not see a constant pattern
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect()
}

fn transform(x: &mut [u8]) {
    for b in x.iter_mut() {
        *b /= 3;
        *b = b.wrapping_add(1);
        *b = b.wrapping_mul(5);
        *b = b.wrapping_add(1);
        *b /= 7;
        *b = b.wrapping_add(1);
    }
}

// ─── Benchmarks ───────────────────────────────────────────────────────────────

fn bench_plain_loop(c: &mut Criterion) {
    let mut buf = make_buffer(BUFFER_LEN);
    let mut group = c.benchmark_group("plain_loop");
    group.throughput(Throughput::Bytes(BUFFER_LEN as u64));
    group.bench_function("single", |b| b.iter(|| transform(&mut buf)));
    group.finish();
}

fn bench_collect(c: &mut Criterion) {
    let mut buf = make_buffer(BUFFER_LEN);
    let mut group = c.benchmark_group("collect_in_place");
    group.throughput(Throughput::Bytes(BUFFER_LEN as u64));
    for batch in [512 * 1024, 1024 * 1024, 2 * 1024 * 1024] {
        for single in [false, true] {
            let id = format!("{}K/{}", batch / 1024, if single { "single" } else { "parallel" });
            group.bench_with_input(BenchmarkId::from_parameter(id), &batch, |b, &batch| {
                let mut task = Task::new(
                    &mut buf,
                    |_: usize, x: &mut [u8]| -> Result<Vec<u8>, String> {
                        transform(x);
                        Ok(Vec::new())
                    },
                    false,
                    single,
                );
                b.iter(|| task.collect(batch, true, true));
            });
        }
    }
    group.finish();
}

fn bench_pseudo(c: &mut Criterion) {
    let mut buf = make_buffer(BUFFER_LEN);
    let mut group = c.benchmark_group("pseudo_partition");
    group.throughput(Throughput::Bytes(BUFFER_LEN as u64));
    for batch in [64 * 1024, 1024 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            let mut task = Task::new(
                &mut buf,
                |_: usize, x: &mut [u8]| -> Result<Vec<u8>, String> { Ok(x.to_vec()) },
                true,
                true,
            );
            b.iter(|| task.collect(batch, true, true));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plain_loop, bench_collect, bench_pseudo);
criterion_main!(benches);
