//! Positional multi-error aggregation.
//!
//! An [`AggregateError`] holds one optional error per chunk, index-aligned
//! with the chunk index. It renders as `#<index>:<message> ` for every chunk
//! that failed, in ascending index order.

use std::fmt;

/// Index-aligned collection of per-chunk errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError<E> {
    slots: Vec<Option<E>>,
}

impl<E> AggregateError<E> {
    /// An aggregate with `len` empty slots.
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    pub fn from_slots(slots: Vec<Option<E>>) -> Self {
        Self { slots }
    }

    /// Number of slots (the chunk count of the run that produced it).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Store the error for chunk `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, err: E) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(err);
        }
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Returns `true` if any slot holds an error, regardless of how it renders.
    pub fn has_errors(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Number of chunks that reported an error.
    pub fn error_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Iterate `(chunk index, error)` pairs for the chunks that failed.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &E)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (i, e)))
    }

    pub fn into_inner(self) -> Vec<Option<E>> {
        self.slots
    }
}

impl<E: fmt::Display> AggregateError<E> {
    /// Emptiness is decided by the rendered text, which is how `collect`
    /// decides whether a run failed. See [`has_errors`](Self::has_errors)
    /// for the slot-based check.
    pub fn is_empty(&self) -> bool {
        self.to_string().is_empty()
    }
}

impl<E> FromIterator<Option<E>> for AggregateError<E> {
    fn from_iter<I: IntoIterator<Item = Option<E>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, err) in self.iter() {
            write!(f, "#{}:{} ", index, err)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AggregateError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_only_failed_slots() {
        let agg: AggregateError<&str> = vec![None, Some("x"), None, Some("y")]
            .into_iter()
            .collect();
        assert_eq!(agg.to_string(), "#1:x #3:y ");
        assert_eq!(agg.len(), 4);
        assert_eq!(agg.error_count(), 2);
        assert!(!agg.is_empty());
    }

    #[test]
    fn all_none_is_empty() {
        let agg: AggregateError<String> = AggregateError::with_len(3);
        assert_eq!(agg.to_string(), "");
        assert!(agg.is_empty());
        assert!(!agg.has_errors());
    }

    #[test]
    fn empty_message_still_renders_index() {
        let mut agg = AggregateError::with_len(2);
        agg.set(0, String::new());
        assert_eq!(agg.to_string(), "#0: ");
        assert!(!agg.is_empty());
        assert!(agg.has_errors());
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut agg = AggregateError::with_len(1);
        agg.set(5, "late");
        assert!(!agg.has_errors());
        agg.set(0, "first");
        assert_eq!(agg.get(0), Some(&"first"));
        assert_eq!(agg.iter().collect::<Vec<_>>(), vec![(0, &"first")]);
    }
}
