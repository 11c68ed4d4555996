//! `chunkmap plan` — print the chunk layout for an item count and batch size.

use anyhow::{bail, Result};
use chunkmap_core::{ChunkPlan, PlanError};
use serde::Serialize;
use std::ops::Range;

#[derive(Serialize)]
struct PlanReport {
    #[serde(flatten)]
    plan: ChunkPlan,
    chunks: usize,
    single_chunk: bool,
    ranges: Vec<Range<usize>>,
}

/// Map a signed batch size from the command line onto the planner's input.
pub fn batch_size(batch: i64) -> Result<usize, PlanError> {
    usize::try_from(batch)
        .ok()
        .filter(|b| *b > 0)
        .ok_or(PlanError::InvalidBatch)
}

pub fn run(count: usize, batch: i64, as_json: bool) -> Result<()> {
    let plan = match batch_size(batch).and_then(|b| ChunkPlan::new(count, b)) {
        Ok(plan) => plan,
        Err(e) => bail!("cannot plan {count} items with batch {batch}: {e}"),
    };

    let report = PlanReport {
        plan,
        chunks: plan.chunk_count(),
        single_chunk: plan.is_single_chunk(),
        ranges: plan.ranges().collect(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} items / batch {} → {} chunk(s), {} full, remainder {}",
        count,
        plan.batch_size(),
        report.chunks,
        plan.full_chunks(),
        plan.remainder()
    );
    if report.single_chunk {
        println!("  single chunk: processed directly on the calling thread");
    }
    let last = report.chunks - 1;
    for (index, range) in report.ranges.iter().enumerate() {
        let runs_on = if report.single_chunk || (index == last && plan.remainder() > 0) {
            "caller"
        } else {
            "worker"
        };
        println!("  #{:<6} {:>10}..{:<10} ({})", index, range.start, range.end, runs_on);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_batch_is_invalid() {
        assert_eq!(batch_size(0), Err(PlanError::InvalidBatch));
        assert_eq!(batch_size(-3), Err(PlanError::InvalidBatch));
        assert_eq!(batch_size(7), Ok(7));
    }

    #[test]
    fn run_rejects_empty_and_invalid() {
        assert!(run(0, 3, false).is_err());
        assert!(run(3, 0, true).is_err());
        assert!(run(10, 3, true).is_ok());
    }
}
