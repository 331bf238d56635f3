use crate::error::Result;
use serde::de::DeserializeOwned;
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer, Value};
use std::io::Read;
use std::iter::FusedIterator;

/// Lazily yields whitespace-separated JSON values (JSON Lines / NDJSON).
///
/// Fuses after the first error.
pub struct JsonLinesStream<R: Read, T = Value> {
    inner: StreamDeserializer<'static, IoRead<R>, T>,
    failed: bool,
}

impl<R: Read> JsonLinesStream<R> {
    pub fn new(reader: R) -> Self {
        Self::typed(reader)
    }
}

impl<R: Read, T: DeserializeOwned> JsonLinesStream<R, T> {
    pub fn typed(reader: R) -> Self {
        Self {
            inner: Deserializer::from_reader(reader).into_iter::<T>(),
            failed: false,
        }
    }

    /// Bytes consumed by successfully read values
    #[must_use]
    pub fn byte_offset(&self) -> usize {
        self.inner.byte_offset()
    }
}

impl<R: Read, T: DeserializeOwned> Iterator for JsonLinesStream<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if self.failed {
            return None;
        }
        match self.inner.next()? {
            Ok(value) => Some(Ok(value)),
            Err(err) => {
                log::warn!(
                    "JSON lines stream failed at line {}, column {}: {err}",
                    err.line(),
                    err.column()
                );
                self.failed = true;
                Some(Err(err.into()))
            }
        }
    }
}

impl<R: Read, T: DeserializeOwned> FusedIterator for JsonLinesStream<R, T> {}
