//! # chunkmap-core
//!
//! Batch-parallel map over a slice: partition the items into contiguous
//! chunks, hand every chunk to a processing function (on the calling thread,
//! on scoped worker threads, or on a bounded rayon pool) and stitch the
//! per-chunk outputs and errors back together in chunk order.
//!
//! ## Features
//! - One worker per full chunk, the remainder chunk overlapped on the caller
//! - Sequential (`single`) and dry-run (`pseudo`) modes
//! - Positional error aggregation (`#1:x #3:y `)
//! - Output / error channels can be dropped independently
//! - Optional bounded worker pool via [`Dispatch::Pool`]
//!
//! ## Usage
//! ```
//! use chunkmap_core::Task;
//!
//! let mut items: Vec<u32> = (0..10).collect();
//! let mut task = Task::new(
//!     &mut items,
//!     |_: usize, chunk: &mut [u32]| -> Result<Vec<u32>, String> {
//!         Ok(chunk.iter().map(|v| v * 2).collect())
//!     },
//!     false,
//!     false,
//! );
//! let out = task.collect(3, false, true).unwrap().unwrap();
//! assert_eq!(out, (0..10).map(|v| v * 2).collect::<Vec<_>>());
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod plan;
pub mod task;

pub use aggregate::AggregateError;
pub use config::{Dispatch, TaskConfig, DEFAULT_BATCH_SIZE};
pub use error::{CollectError, PlanError, TaskConfigError};
pub use plan::ChunkPlan;
pub use task::Task;
