//! Task configuration and worker dispatch strategy.

use crate::error::TaskConfigError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Where full-size chunks run when a task is not `single`.
#[derive(Debug, Clone, Default)]
pub enum Dispatch {
    /// One scoped OS thread per full chunk, no cap.
    #[default]
    Unbounded,
    /// Full chunks are spawned onto a bounded rayon pool. The remainder chunk
    /// still runs on the calling thread.
    Pool(Arc<ThreadPool>),
}

impl Dispatch {
    /// Build a dedicated pool with `threads` workers (`0` = one per CPU).
    pub fn pool(threads: usize) -> Result<Self, TaskConfigError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("chunkmap-worker-{i}"))
            .build()?;
        Ok(Self::Pool(Arc::new(pool)))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unbounded => "unbounded",
            Self::Pool(_) => "pool",
        }
    }

    /// Upper bound on concurrent workers, `None` when unbounded.
    pub fn max_workers(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Pool(pool) => Some(pool.current_num_threads()),
        }
    }
}

/// Serializable description of a task and the way it is collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Items per chunk
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Drop chunk outputs instead of concatenating them
    #[serde(default)]
    pub ignore_output: bool,
    /// Drop chunk errors instead of aggregating them
    #[serde(default)]
    pub ignore_error: bool,
    /// Skip the processing function and return chunks verbatim
    #[serde(default)]
    pub pseudo: bool,
    /// Run every chunk on the calling thread
    #[serde(default)]
    pub single: bool,
    /// Route full chunks through a bounded pool of this many workers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            ignore_output: false,
            ignore_error: false,
            pseudo: false,
            single: false,
            max_workers: None,
        }
    }
}

impl TaskConfig {
    pub fn from_json_str(s: &str) -> Result<Self, TaskConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TaskConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), TaskConfigError> {
        if self.batch_size == 0 {
            return Err(TaskConfigError::ZeroBatch);
        }
        if self.max_workers == Some(0) {
            return Err(TaskConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// The dispatch strategy this config asks for. Builds a new pool each
    /// call when `max_workers` is set.
    pub fn dispatch(&self) -> Result<Dispatch, TaskConfigError> {
        match self.max_workers {
            None => Ok(Dispatch::Unbounded),
            Some(0) => Err(TaskConfigError::ZeroWorkers),
            Some(n) => Dispatch::pool(n),
        }
    }
}
