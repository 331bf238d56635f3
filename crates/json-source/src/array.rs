use crate::error::{JsonStreamError, Result};
use crate::scanner::{Capture, Scanner};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::{BufReader, Read};
use std::iter::FusedIterator;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// Array not located yet
    Pending,
    /// Just after `[`
    First,
    /// After at least one element
    Rest,
    Done,
}

/// Lazily yields the elements of one JSON array inside a document.
///
/// The array is found by descending `path` through nested objects (an empty
/// path means the document itself is the array). Members that do not lie on
/// the path are skipped without being materialized, and only one element is
/// buffered at a time. Nothing is read until the first `next()`.
///
/// The stream fuses after the first error.
pub struct JsonArrayStream<R: Read, T = Value> {
    scanner: Scanner<BufReader<R>>,
    path: Vec<String>,
    state: StreamState,
    buf: Vec<u8>,
    yielded: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<R: Read> JsonArrayStream<R> {
    /// Stream `serde_json::Value` elements of the array at `path`
    pub fn new(reader: R, path: &[&str]) -> Self {
        Self::typed(reader, path)
    }

    /// Like [`new`](Self::new) with a dotted path such as `"data.results"`
    pub fn from_pointer(reader: R, pointer: &str) -> Self {
        Self::typed_from_pointer(reader, pointer)
    }
}

impl<R: Read, T: DeserializeOwned> JsonArrayStream<R, T> {
    /// Stream elements deserialized as `T`
    pub fn typed(reader: R, path: &[&str]) -> Self {
        Self {
            scanner: Scanner::new(BufReader::new(reader)),
            path: path.iter().map(|key| (*key).to_string()).collect(),
            state: StreamState::Pending,
            buf: Vec::new(),
            yielded: 0,
            _marker: PhantomData,
        }
    }

    pub fn typed_from_pointer(reader: R, pointer: &str) -> Self {
        let path = parse_pointer(pointer);
        Self::typed(reader, &path)
    }

    /// Path of the streamed array, dotted (`<root>` for the document itself)
    #[must_use]
    pub fn path(&self) -> String {
        display_path(&self.path)
    }

    /// Elements yielded so far
    #[must_use]
    pub fn elements_read(&self) -> usize {
        self.yielded
    }

    /// Bytes of the document consumed so far
    #[must_use]
    pub fn byte_offset(&self) -> u64 {
        self.scanner.offset()
    }

    fn locate(&mut self) -> Result<()> {
        for depth in 0..self.path.len() {
            if self.scanner.skip_whitespace()? != Some(b'{') {
                return Err(JsonStreamError::PathNotFound(self.path()));
            }
            self.scanner.bump()?;
            self.find_member(depth)?;
        }

        match self.scanner.skip_whitespace()? {
            Some(b'[') => {
                self.scanner.bump()?;
                log::debug!("streaming JSON array at {}", self.path());
                Ok(())
            }
            Some(_) => Err(JsonStreamError::NotAnArray(self.path())),
            None => Err(self.scanner.unexpected(None, "a value")),
        }
    }

    /// Advance to the value of member `path[depth]` of the object just entered
    fn find_member(&mut self, depth: usize) -> Result<()> {
        if self.scanner.skip_whitespace()? == Some(b'}') {
            return Err(JsonStreamError::PathNotFound(self.path()));
        }
        loop {
            let key = self.scanner.read_key()?;
            self.scanner.expect(b':')?;
            if key == self.path[depth] {
                return Ok(());
            }
            log::trace!("skipping member {key:?}");
            self.scanner.read_value(&mut Capture::Discard)?;

            match self.scanner.skip_whitespace()? {
                Some(b',') => {
                    self.scanner.bump()?;
                }
                Some(b'}') => return Err(JsonStreamError::PathNotFound(self.path())),
                other => return Err(self.scanner.unexpected(other, "',' or '}'")),
            }
        }
    }

    fn next_element(&mut self) -> Result<Option<T>> {
        match self.state {
            StreamState::Done => return Ok(None),
            StreamState::Pending => {
                self.locate()?;
                self.state = StreamState::First;
            }
            StreamState::First | StreamState::Rest => {}
        }

        let found = self.scanner.skip_whitespace()?;
        if found == Some(b']') {
            self.scanner.bump()?;
            self.state = StreamState::Done;
            log::debug!(
                "JSON array at {} ended after {} element(s)",
                self.path(),
                self.yielded
            );
            return Ok(None);
        }
        if self.state == StreamState::Rest {
            if found != Some(b',') {
                return Err(self.scanner.unexpected(found, "',' or ']'"));
            }
            self.scanner.bump()?;
            if self.scanner.skip_whitespace()? == Some(b']') {
                return Err(JsonStreamError::syntax(
                    self.scanner.offset(),
                    "trailing comma in array",
                ));
            }
        }

        self.buf.clear();
        self.scanner.read_value(&mut Capture::Into(&mut self.buf))?;
        self.state = StreamState::Rest;

        let element = serde_json::from_slice(&self.buf)?;
        self.yielded += 1;
        Ok(Some(element))
    }
}

impl<R: Read, T: DeserializeOwned> Iterator for JsonArrayStream<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        match self.next_element() {
            Ok(element) => element.map(Ok),
            Err(err) => {
                log::warn!(
                    "JSON array at {} failed after {} element(s): {err}",
                    self.path(),
                    self.yielded
                );
                self.state = StreamState::Done;
                Some(Err(err))
            }
        }
    }
}

impl<R: Read, T: DeserializeOwned> FusedIterator for JsonArrayStream<R, T> {}

fn parse_pointer(pointer: &str) -> Vec<&str> {
    pointer
        .split(['.', '/'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
