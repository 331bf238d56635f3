//! # Chunkstream JSON
//!
//! Pull-based element sources over JSON input, meant to feed
//! `chunkstream-chunker` without loading the whole document.
//!
//! - [`JsonArrayStream`]: elements of one array inside a document, found by
//!   a key path (`"results"`, `"data.results"`, or the root).
//! - [`JsonLinesStream`]: newline-delimited (or concatenated) values.
//!
//! Both yield `Result<T, JsonStreamError>` and stop after the first error.
//!
//! ```rust
//! use chunkstream_json::JsonArrayStream;
//!
//! let doc = r#"{"count": 2, "results": [{"id": 1}, {"id": 2}]}"#;
//! let ids: Vec<u64> = JsonArrayStream::new(doc.as_bytes(), &["results"])
//!     .map(|item| item.unwrap()["id"].as_u64().unwrap())
//!     .collect();
//! assert_eq!(ids, vec![1, 2]);
//! ```

mod array;
mod error;
mod lines;
mod scanner;

pub use array::JsonArrayStream;
pub use error::{JsonStreamError, Result};
pub use lines::JsonLinesStream;
