//! # Chunkstream Chunker
//!
//! Lazy fixed-size chunking over single-pass, possibly unbounded iterators.
//!
//! ## Contract
//!
//! - Nothing is pulled from the source until the first chunk is requested.
//! - Each chunk request pulls exactly one element to decide whether another
//!   chunk exists; an exhausted source ends the outer sequence.
//! - A chunk pulls the rest of its elements on demand.
//! - At most one element is held back at any time.
//!
//! ## Architecture
//!
//! ```text
//! source (Iterator)
//!     │
//!     └──> SharedSource  (Rc<RefCell<..>>: cursor, held element, generation)
//!              │
//!              ├──> Chunks  (outer iterator, READY → EXHAUSTED)
//!              │
//!              └──> Chunk   (inner iterator, valid for one generation)
//! ```
//!
//! All handles share one cursor, so requesting the next chunk skips whatever
//! the current chunk has not yielded yet:
//!
//! ```rust
//! use chunkstream_chunker::chunk;
//!
//! let mut chunks = chunk(vec![1, 2, 3, 4, 5, 6], 3).unwrap();
//! let mut first = chunks.next().unwrap();
//! assert_eq!(first.next(), Some(1));
//!
//! // 2 and 3 are dropped here.
//! let second: Vec<_> = chunks.next().unwrap().collect();
//! assert_eq!(second, vec![4, 5, 6]);
//! assert_eq!(first.next(), None);
//! ```

mod chunker;
mod config;
mod error;
mod source;

pub use chunker::{chunk, Chunk, ChunkerState, Chunks, LazyChunkExt};
pub use config::{ChunkSize, ChunkerConfig, DEFAULT_CHUNK_SIZE};
pub use error::{ChunkerError, Result};
