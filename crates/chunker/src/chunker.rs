use crate::config::{ChunkSize, ChunkerConfig};
use crate::error::{ChunkerError, Result};
use crate::source::{SharedSource, SourceHandle};
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

/// Split `source` into lazy chunks of at most `chunk_size` elements.
///
/// The size is validated before `source` is turned into an iterator, so an
/// invalid size never pulls anything.
///
/// The source's `next()` runs while the shared cursor is mutably borrowed.
/// A source must not call back into the [`Chunks`] or [`Chunk`] it feeds;
/// doing so panics with a `RefCell` borrow error.
///
/// ```rust
/// use chunkstream_chunker::chunk;
///
/// let chunks: Vec<Vec<i32>> = chunk(1..=7, 2)
///     .unwrap()
///     .map(Iterator::collect)
///     .collect();
/// assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5, 6], vec![7]]);
/// ```
pub fn chunk<S, K>(source: S, chunk_size: K) -> Result<Chunks<S::IntoIter>>
where
    S: IntoIterator,
    K: TryInto<ChunkSize, Error = ChunkerError>,
{
    let chunk_size = chunk_size.try_into()?;
    Ok(Chunks::new(source, chunk_size))
}

/// Extension trait adding [`lazy_chunks`](LazyChunkExt::lazy_chunks) to every iterator.
pub trait LazyChunkExt: Iterator + Sized {
    /// See [`chunk`].
    fn lazy_chunks<K>(self, chunk_size: K) -> Result<Chunks<Self>>
    where
        K: TryInto<ChunkSize, Error = ChunkerError>,
    {
        chunk(self, chunk_size)
    }
}

impl<I: Iterator> LazyChunkExt for I {}

/// Lifecycle of a [`Chunks`] sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkerState {
    /// More chunks may follow
    Ready,
    /// The source was found empty at the start of a chunk; terminal
    Exhausted,
}

/// Outer sequence of lazy chunks over one single-pass source.
///
/// Every [`Chunk`] shares the source cursor with this iterator. Requesting
/// the next chunk retires the current one: any element it has not yielded
/// yet is pulled from the source and dropped, and the retired chunk yields
/// nothing afterwards (see [`Chunk::is_stale`]). Finish each chunk before
/// asking for the next one if you need every element.
///
/// Skipped elements are dropped unseen, `Err` items included. If the source
/// fuses after an error (as `serde_json`-style streams do), skipping over
/// that error leaves the source exhausted and the outer sequence simply
/// ends: the error is never reported.
///
/// At most one source element is held at any time.
pub struct Chunks<I: Iterator> {
    source: SourceHandle<I>,
    chunk_size: ChunkSize,
    state: ChunkerState,
    emitted: usize,
}

impl<I: Iterator> Chunks<I> {
    /// Create a chunk sequence. Nothing is pulled until the first `next()`.
    pub fn new(source: impl IntoIterator<IntoIter = I>, chunk_size: ChunkSize) -> Self {
        log::debug!("chunking source lazily (chunk_size={chunk_size})");
        Self {
            source: SharedSource::handle(source.into_iter()),
            chunk_size,
            state: ChunkerState::Ready,
            emitted: 0,
        }
    }

    /// Create a chunk sequence from a validated configuration
    pub fn with_config(
        source: impl IntoIterator<IntoIter = I>,
        config: &ChunkerConfig,
    ) -> Result<Self> {
        let chunk_size = config.chunk_size()?;
        Ok(Self::new(source, chunk_size))
    }

    #[must_use]
    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    #[must_use]
    pub fn state(&self) -> ChunkerState {
        self.state
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.state == ChunkerState::Exhausted
    }

    /// Number of chunks produced so far
    #[must_use]
    pub fn chunks_emitted(&self) -> usize {
        self.emitted
    }

    /// Number of elements pulled from the source so far, including skipped ones
    #[must_use]
    pub fn elements_pulled(&self) -> u64 {
        self.source.borrow().pulled()
    }

    fn exhaust(&mut self) {
        self.state = ChunkerState::Exhausted;
        log::debug!(
            "source exhausted after {} chunk(s), {} element(s)",
            self.emitted,
            self.elements_pulled()
        );
    }
}

impl<I: Iterator> Iterator for Chunks<I> {
    type Item = Chunk<I>;

    fn next(&mut self) -> Option<Chunk<I>> {
        if self.is_exhausted() {
            return None;
        }

        let pulled = {
            let mut source = self.source.borrow_mut();
            let (generation, skipped) = source.retire_current();
            if skipped > 0 {
                log::trace!(
                    "skipped {skipped} unread element(s) of chunk {}",
                    self.emitted.saturating_sub(1)
                );
            }
            source.pull().map(|head| {
                source.start_chunk(head, self.chunk_size.get() - 1);
                generation
            })
        };

        let Some(generation) = pulled else {
            self.exhaust();
            return None;
        };

        let index = self.emitted;
        self.emitted += 1;
        log::trace!("starting chunk {index}");

        Some(Chunk {
            source: Rc::clone(&self.source),
            generation,
            index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_exhausted() {
            return (0, Some(0));
        }
        // Skipping unread elements of the current chunk can shrink the count,
        // so only the upper bound is meaningful.
        let (_, upper) = self.source.borrow().source_size_hint();
        (0, upper.map(|n| n.div_ceil(self.chunk_size.get())))
    }
}

impl<I: Iterator> FusedIterator for Chunks<I> {}

impl<I: Iterator> fmt::Debug for Chunks<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunks")
            .field("chunk_size", &self.chunk_size)
            .field("state", &self.state)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

/// One lazy chunk: yields up to `chunk_size` consecutive source elements.
///
/// Valid until it is fully consumed or the owning [`Chunks`] advances.
pub struct Chunk<I: Iterator> {
    source: SourceHandle<I>,
    generation: u64,
    index: usize,
}

impl<I: Iterator> Chunk<I> {
    /// Zero-based position of this chunk in the outer sequence
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// `true` once the outer sequence has moved on to a later chunk
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.source.borrow().generation() != self.generation
    }

    /// Upper bound on the elements this chunk can still yield
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.size_hint().1.unwrap_or(0)
    }
}

impl<I: Iterator> Iterator for Chunk<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.source.borrow_mut().next_for(self.generation)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.borrow().bounds_for(self.generation)
    }
}

impl<I: Iterator> FusedIterator for Chunk<I> {}

impl<I: Iterator> fmt::Debug for Chunk<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("index", &self.index)
            .field("stale", &self.is_stale())
            .finish_non_exhaustive()
    }
}
