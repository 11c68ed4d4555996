//! `chunkmap bench` — time an in-place byte transform driven through collect.

use crate::cmd_plan::batch_size;
use anyhow::{Context, Result};
use chunkmap_core::{ChunkPlan, Task, TaskConfig, TaskConfigError};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Instant;
use tracing::info;

pub struct BenchOptions {
    pub size: usize,
    pub batch: i64,
    pub single: bool,
    pub pseudo: bool,
    pub max_workers: Option<usize>,
    pub iterations: u32,
}

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub size: usize,
    pub batch: usize,
    pub chunks: usize,
    pub single: bool,
    pub pseudo: bool,
    pub dispatch: &'static str,
    pub iterations: u32,
    pub total_secs: f64,
    pub best_secs: f64,
    pub mb_per_sec: f64,
}

fn fill(buf: &mut [u8]) {
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    for b in buf.iter_mut() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        *b = state as u8;
    }
}

fn transform(_: usize, x: &mut [u8]) -> Result<Vec<u8>, Infallible> {
    for b in x.iter_mut() {
        *b /= 3;
        *b = b.wrapping_add(1);
        *b = b.wrapping_mul(5);
        *b = b.wrapping_add(1);
        *b /= 7;
        *b = b.wrapping_add(1);
    }
    Ok(Vec::new())
}

pub fn measure(opts: &BenchOptions) -> Result<BenchReport> {
    let batch = batch_size(opts.batch).context("invalid --batch")?;
    let plan = ChunkPlan::new(opts.size, batch).context("invalid bench layout")?;
    let dispatch = TaskConfig {
        max_workers: opts.max_workers,
        ..TaskConfig::default()
    }
    .dispatch()
    .context("invalid --max-workers")?;

    let mut buf = vec![0u8; opts.size];
    fill(&mut buf);

    let mut task = Task::new(&mut buf, transform, opts.pseudo, opts.single).with_dispatch(dispatch);
    info!(
        size = opts.size,
        batch,
        chunks = plan.chunk_count(),
        dispatch = task.dispatch().name(),
        "bench start"
    );

    let iterations = opts.iterations.max(1);
    let mut total = 0f64;
    let mut best = f64::MAX;
    for _ in 0..iterations {
        let start = Instant::now();
        task.collect(batch, true, true).context("collect failed")?;
        let secs = start.elapsed().as_secs_f64();
        total += secs;
        best = best.min(secs);
    }

    let mb = opts.size as f64 / (1024.0 * 1024.0);
    Ok(BenchReport {
        size: opts.size,
        batch,
        chunks: plan.chunk_count(),
        single: opts.single,
        pseudo: opts.pseudo,
        dispatch: task.dispatch().name(),
        iterations,
        total_secs: total,
        best_secs: best,
        mb_per_sec: mb * iterations as f64 / total.max(f64::EPSILON),
    })
}

pub fn run(opts: &BenchOptions, as_json: bool) -> Result<()> {
    println!(
        "Benchmarking {} bytes, batch {}, {} iteration(s) ...",
        opts.size, opts.batch, opts.iterations
    );
    let report = measure(opts)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Results:");
    println!("  Chunks:     {}", report.chunks);
    println!(
        "  Mode:       {}{}",
        if report.single { "single" } else { report.dispatch },
        if report.pseudo { " (pseudo)" } else { "" }
    );
    println!("  Duration:   {:.3}s total, {:.3}s best", report.total_secs, report.best_secs);
    println!("  Throughput: {:.1} MB/s", report.mb_per_sec);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(size: usize, batch: i64) -> BenchOptions {
        BenchOptions {
            size,
            batch,
            single: false,
            pseudo: false,
            max_workers: None,
            iterations: 2,
        }
    }

    #[test]
    fn small_parallel_run() {
        let report = measure(&opts(10_000, 1_000)).unwrap();
        assert_eq!(report.chunks, 10);
        assert_eq!(report.dispatch, "unbounded");
        assert_eq!(report.iterations, 2);
    }

    #[test]
    fn pooled_pseudo_run() {
        let mut o = opts(4_097, 1_024);
        o.pseudo = true;
        o.max_workers = Some(2);
        let report = measure(&o).unwrap();
        assert_eq!(report.chunks, 5);
        assert_eq!(report.dispatch, "pool");
    }

    #[test]
    fn bad_batch_rejected() {
        assert!(measure(&opts(100, 0)).is_err());
        assert!(measure(&opts(100, -1)).is_err());
        assert!(measure(&opts(0, 10)).is_err());
    }

    #[test]
    fn zero_workers_rejected() {
        let mut o = opts(100, 10);
        o.max_workers = Some(0);
        let err = measure(&o).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaskConfigError>(),
            Some(TaskConfigError::ZeroWorkers)
        ));
    }

    #[test]
    fn transform_is_deterministic() {
        let mut a = vec![0u8; 257];
        let mut b = vec![0u8; 257];
        fill(&mut a);
        fill(&mut b);
        transform(0, &mut a).unwrap();
        Task::new(&mut b, transform, false, false)
            .collect(16, true, true)
            .unwrap();
        assert_eq!(a, b);
    }
}
