//! Error types for the chunkmap partition/dispatch/collect pipeline.

use crate::aggregate::AggregateError;
use thiserror::Error;

/// Input validation failures, detected before any chunk is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("invalid batch")]
    InvalidBatch,

    #[error("empty items")]
    EmptyItems,
}

/// Errors returned by [`Task::collect`](crate::Task::collect).
///
/// `T` is the item type and `E` the error type of the processing function.
#[derive(Debug, Error)]
pub enum CollectError<T, E> {
    /// The batch size was zero.
    #[error("invalid batch")]
    InvalidBatch,

    /// The task has no items to partition.
    #[error("empty items")]
    EmptyItems,

    /// The whole input fit in one chunk and the processing function failed.
    /// The error is returned as-is, without positional wrapping.
    #[error("{0}")]
    Process(E),

    /// One or more chunks failed. `partial` holds the concatenated output of
    /// the chunks that succeeded, or `None` when output collection was off.
    #[error("{errors}")]
    Chunks {
        errors: AggregateError<E>,
        partial: Option<Vec<T>>,
    },
}

impl<T, E> CollectError<T, E> {
    /// Returns `true` for the two pre-execution validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidBatch | Self::EmptyItems)
    }

    /// Positional chunk errors, if this is a [`CollectError::Chunks`] failure.
    pub fn chunk_errors(&self) -> Option<&AggregateError<E>> {
        match self {
            Self::Chunks { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Recover whatever output was collected before the error was reported.
    pub fn into_partial(self) -> Option<Vec<T>> {
        match self {
            Self::Chunks { partial, .. } => partial,
            _ => None,
        }
    }
}

impl<T, E> From<PlanError> for CollectError<T, E> {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidBatch => Self::InvalidBatch,
            PlanError::EmptyItems => Self::EmptyItems,
        }
    }
}

/// Errors raised while validating or loading a [`TaskConfig`](crate::TaskConfig).
#[derive(Debug, Error)]
pub enum TaskConfigError {
    #[error("batch_size must be greater than zero")]
    ZeroBatch,

    #[error("max_workers must be greater than zero when set")]
    ZeroWorkers,

    #[error("Thread pool build failed: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
