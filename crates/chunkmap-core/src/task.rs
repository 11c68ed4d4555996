//! Partition items into chunks, dispatch them, and gather the results back
//! in chunk order.

use crate::aggregate::AggregateError;
use crate::config::{Dispatch, TaskConfig};
use crate::error::{CollectError, TaskConfigError};
use crate::plan::ChunkPlan;
use std::fmt;
use std::panic;
use std::thread;
use tracing::{debug, trace, warn};

/// A batch-parallel map over a borrowed slice.
///
/// The processing function receives `(chunk index, chunk)` where the chunk is
/// a disjoint mutable view into the caller's storage, so in-place transforms
/// need no copy. It may be called from several threads at once.
pub struct Task<'a, T, F> {
    items: &'a mut [T],
    process: F,
    pseudo: bool,
    single: bool,
    dispatch: Dispatch,
}

impl<'a, T, F> Task<'a, T, F> {
    /// Create a task over `items`.
    ///
    /// - `pseudo`: never call `process`, return chunks verbatim
    /// - `single`: run every chunk on the calling thread
    pub fn new(items: &'a mut [T], process: F, pseudo: bool, single: bool) -> Self {
        Self {
            items,
            process,
            pseudo,
            single,
            dispatch: Dispatch::Unbounded,
        }
    }

    /// Build a task from a [`TaskConfig`], including its dispatch strategy.
    pub fn from_config(
        items: &'a mut [T],
        process: F,
        config: &TaskConfig,
    ) -> Result<Self, TaskConfigError> {
        config.validate()?;
        let dispatch = config.dispatch()?;
        Ok(Self::new(items, process, config.pseudo, config.single).with_dispatch(dispatch))
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn items(&self) -> &[T] {
        &*self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_pseudo(&self) -> bool {
        self.pseudo
    }

    pub fn is_single(&self) -> bool {
        self.single
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

impl<T, F> fmt::Debug for Task<'_, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("items", &self.items.len())
            .field("pseudo", &self.pseudo)
            .field("single", &self.single)
            .field("dispatch", &self.dispatch.name())
            .finish()
    }
}

/// Per-chunk result slot, `None` when the channel is ignored.
type Slot<'s, X> = Option<&'s mut Option<X>>;

fn empty_slots<X>(len: usize) -> Vec<Option<X>> {
    std::iter::repeat_with(|| None).take(len).collect()
}

/// Split pre-sized slots into the full-chunk part and the remainder slot.
fn split_slots<X>(
    slots: Option<&mut [Option<X>]>,
    mid: usize,
) -> (Option<&mut [Option<X>]>, Slot<'_, X>) {
    match slots {
        Some(slots) => {
            let (head, rest) = slots.split_at_mut(mid);
            (Some(head), rest.first_mut())
        }
        None => (None, None),
    }
}

/// One slot reference per chunk, yielding `None` forever for an ignored channel.
fn slot_refs<X>(slots: Option<&mut [Option<X>]>) -> impl Iterator<Item = Slot<'_, X>> {
    slots
        .into_iter()
        .flatten()
        .map(Some)
        .chain(std::iter::repeat_with(|| None))
}

/// Run one chunk and store whatever its kept channels ask for. Each worker
/// writes only its own slots.
fn run_chunk<T, E, F>(
    process: &F,
    pseudo: bool,
    index: usize,
    chunk: &mut [T],
    output: Slot<'_, Vec<T>>,
    error: Slot<'_, E>,
) where
    T: Clone,
    F: Fn(usize, &mut [T]) -> Result<Vec<T>, E>,
{
    trace!(index, len = chunk.len(), "chunk start");
    if pseudo {
        if let Some(slot) = output {
            *slot = Some(chunk.to_vec());
        }
        return;
    }
    match process(index, chunk) {
        Ok(out) => {
            if let Some(slot) = output {
                *slot = Some(out);
            }
        }
        Err(err) => {
            if let Some(slot) = error {
                *slot = Some(err);
            }
        }
    }
}

impl<T, E, F> Task<'_, T, F>
where
    T: Clone + Send,
    E: Send + fmt::Display,
    F: Fn(usize, &mut [T]) -> Result<Vec<T>, E> + Sync,
{
    /// Split the items into chunks of `batch_size`, run every chunk, and
    /// concatenate the outputs in chunk order.
    ///
    /// `ignore_output` / `ignore_error` drop the corresponding channel; with
    /// `ignore_output` set a successful run returns `Ok(None)`. A dropped
    /// channel gets no per-chunk storage at all.
    ///
    /// A chunk yields either output or an error, never both: a failed chunk
    /// contributes nothing to the `partial` output of
    /// [`CollectError::Chunks`].
    ///
    /// When the input fits in a single chunk, `process(0, items)` is called
    /// directly on this thread and its result returned as-is, whatever the
    /// ignore flags say. A failure there carries no output.
    ///
    /// # Errors
    /// - [`CollectError::InvalidBatch`] if `batch_size` is zero
    /// - [`CollectError::EmptyItems`] if there are no items
    /// - [`CollectError::Process`] if a single-chunk run failed
    /// - [`CollectError::Chunks`] if any chunk failed and errors are kept;
    ///   the output of the successful chunks rides along in `partial`
    ///
    /// # Panics
    /// Re-raises a panic from `process` once every other chunk has finished,
    /// and panics if the OS refuses to start a worker thread.
    pub fn collect(
        &mut self,
        batch_size: usize,
        ignore_output: bool,
        ignore_error: bool,
    ) -> Result<Option<Vec<T>>, CollectError<T, E>> {
        let count = self.items.len();
        let plan = ChunkPlan::new(count, batch_size)?;

        debug!(
            items = count,
            batch_size,
            chunks = plan.chunk_count(),
            remainder = plan.remainder(),
            pseudo = self.pseudo,
            single = self.single,
            dispatch = self.dispatch.name(),
            "collect"
        );

        if plan.is_single_chunk() {
            if self.pseudo {
                return Ok(Some(self.items.to_vec()));
            }
            return (self.process)(0, &mut *self.items)
                .map(Some)
                .map_err(CollectError::Process);
        }

        let pseudo = self.pseudo;
        let process = &self.process;
        let full = plan.full_chunks();

        let mut outputs: Option<Vec<Option<Vec<T>>>> =
            (!ignore_output).then(|| empty_slots(plan.chunk_count()));
        let mut errors: Option<Vec<Option<E>>> =
            (!ignore_error).then(|| empty_slots(plan.chunk_count()));

        let (body, tail) = self.items.split_at_mut(plan.full_len());
        let (body_out, tail_out) = split_slots(outputs.as_deref_mut(), full);
        let (body_err, tail_err) = split_slots(errors.as_deref_mut(), full);
        let chunks = body
            .chunks_exact_mut(batch_size)
            .zip(slot_refs(body_out))
            .zip(slot_refs(body_err))
            .enumerate();

        if self.single {
            for (index, ((chunk, out), err)) in chunks {
                run_chunk(process, pseudo, index, chunk, out, err);
            }
            if !tail.is_empty() {
                run_chunk(process, pseudo, full, tail, tail_out, tail_err);
            }
        } else {
            match &self.dispatch {
                Dispatch::Unbounded => thread::scope(|s| {
                    let handles: Vec<_> = chunks
                        .map(|(index, ((chunk, out), err))| {
                            thread::Builder::new()
                                .name(format!("chunkmap-chunk-{index}"))
                                .spawn_scoped(s, move || {
                                    run_chunk(process, pseudo, index, chunk, out, err)
                                })
                                .unwrap_or_else(|e| {
                                    warn!(index, error = %e, "failed to spawn chunk worker");
                                    panic!("failed to spawn worker for chunk {index}: {e}")
                                })
                        })
                        .collect();
                    if !tail.is_empty() {
                        run_chunk(process, pseudo, full, tail, tail_out, tail_err);
                    }
                    for handle in handles {
                        if let Err(payload) = handle.join() {
                            panic::resume_unwind(payload);
                        }
                    }
                }),
                Dispatch::Pool(pool) => pool.in_place_scope(|s| {
                    for (index, ((chunk, out), err)) in chunks {
                        s.spawn(move |_| run_chunk(process, pseudo, index, chunk, out, err));
                    }
                    if !tail.is_empty() {
                        run_chunk(process, pseudo, full, tail, tail_out, tail_err);
                    }
                }),
            }
        }

        let output = outputs.map(|slots| {
            let mut out = Vec::with_capacity(count);
            for chunk_out in slots.into_iter().flatten() {
                out.extend(chunk_out);
            }
            out
        });

        match errors.map(AggregateError::from_slots) {
            Some(errors) if !errors.is_empty() => {
                warn!(
                    failed = errors.error_count(),
                    chunks = errors.len(),
                    "collect finished with chunk errors"
                );
                Err(CollectError::Chunks {
                    errors,
                    partial: output,
                })
            }
            _ => Ok(output),
        }
    }

    /// [`collect`](Self::collect) using the batch size and ignore flags of
    /// `config`. The task's own `pseudo`, `single` and dispatch settings apply.
    pub fn collect_with(
        &mut self,
        config: &TaskConfig,
    ) -> Result<Option<Vec<T>>, CollectError<T, E>> {
        self.collect(config.batch_size, config.ignore_output, config.ignore_error)
    }
}
