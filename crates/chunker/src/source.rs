use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type SourceHandle<I> = Rc<RefCell<SharedSource<I>>>;

/// Single read cursor shared by [`Chunks`](crate::Chunks) and every
/// [`Chunk`](crate::Chunk) it hands out.
///
/// Holds at most one element (`head`): the one pulled by the outer sequence
/// to prove that a new chunk exists.
pub(crate) struct SharedSource<I: Iterator> {
    iter: I,
    head: Option<I::Item>,
    /// Elements the current chunk may still pull after `head`.
    owed: usize,
    /// Bumped every time the outer sequence starts a new chunk.
    generation: u64,
    pulled: u64,
    ended: bool,
}

impl<I: Iterator> SharedSource<I> {
    pub(crate) fn handle(iter: I) -> SourceHandle<I> {
        Rc::new(RefCell::new(Self {
            iter,
            head: None,
            owed: 0,
            generation: 0,
            pulled: 0,
            ended: false,
        }))
    }

    /// Pull one element; `None` once the source has reported exhaustion.
    pub(crate) fn pull(&mut self) -> Option<I::Item> {
        if self.ended {
            return None;
        }
        match self.iter.next() {
            Some(item) => {
                self.pulled += 1;
                Some(item)
            }
            None => {
                self.ended = true;
                self.owed = 0;
                None
            }
        }
    }

    /// Invalidate the current chunk, dropping its held element and pulling
    /// (and discarding) whatever it had not read yet. Returns the new
    /// generation and the number of discarded elements.
    pub(crate) fn retire_current(&mut self) -> (u64, usize) {
        self.generation += 1;
        let mut skipped = usize::from(self.head.take().is_some());
        while self.owed > 0 {
            self.owed -= 1;
            if self.pull().is_none() {
                break;
            }
            skipped += 1;
        }
        (self.generation, skipped)
    }

    pub(crate) fn start_chunk(&mut self, head: I::Item, owed: usize) {
        self.head = Some(head);
        self.owed = owed;
    }

    /// Next element for the chunk of `generation`, or `None` if that chunk
    /// is stale or complete.
    pub(crate) fn next_for(&mut self, generation: u64) -> Option<I::Item> {
        if generation != self.generation {
            return None;
        }
        if let Some(head) = self.head.take() {
            return Some(head);
        }
        if self.owed == 0 {
            return None;
        }
        self.owed -= 1;
        self.pull()
    }

    /// Bounds on what the chunk of `generation` can still yield.
    pub(crate) fn bounds_for(&self, generation: u64) -> (usize, Option<usize>) {
        if generation != self.generation {
            return (0, Some(0));
        }
        let held = usize::from(self.head.is_some());
        (held, Some(held + self.owed))
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn pulled(&self) -> u64 {
        self.pulled
    }

    #[cfg(test)]
    pub(crate) fn has_ended(&self) -> bool {
        self.ended
    }

    pub(crate) fn source_size_hint(&self) -> (usize, Option<usize>) {
        if self.ended {
            (0, Some(0))
        } else {
            self.iter.size_hint()
        }
    }
}
