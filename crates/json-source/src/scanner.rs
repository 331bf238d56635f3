use crate::error::{JsonStreamError, Result};
use std::io::{BufRead, ErrorKind};

/// Destination for the raw bytes of a scanned value.
pub(crate) enum Capture<'a> {
    Into(&'a mut Vec<u8>),
    Discard,
}

impl Capture<'_> {
    fn push(&mut self, byte: u8) {
        if let Capture::Into(buf) = self {
            buf.push(byte);
        }
    }
}

/// Byte-level cursor over a JSON document with one byte of lookahead.
///
/// Only tracks structure (strings, brackets, scalar extents); element
/// contents are validated later by `serde_json`.
pub(crate) struct Scanner<R> {
    reader: R,
    peeked: Option<u8>,
    offset: u64,
}

impl<R: BufRead> Scanner<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
            offset: 0,
        }
    }

    /// Bytes consumed so far
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn peek(&mut self) -> Result<Option<u8>> {
        if self.peeked.is_none() {
            self.peeked = self.read_byte()?;
        }
        Ok(self.peeked)
    }

    pub(crate) fn bump(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.peeked = None;
            self.offset += 1;
        }
        Ok(byte)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        loop {
            let byte = match self.reader.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if byte.is_some() {
                self.reader.consume(1);
            }
            return Ok(byte);
        }
    }

    /// Skip JSON whitespace and return the next significant byte (not consumed)
    pub(crate) fn skip_whitespace(&mut self) -> Result<Option<u8>> {
        while let Some(byte) = self.peek()? {
            if !matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
                return Ok(Some(byte));
            }
            self.bump()?;
        }
        Ok(None)
    }

    pub(crate) fn expect(&mut self, expected: u8) -> Result<()> {
        match self.skip_whitespace()? {
            Some(byte) if byte == expected => {
                self.bump()?;
                Ok(())
            }
            other => Err(self.unexpected(other, &format!("'{}'", expected as char))),
        }
    }

    pub(crate) fn unexpected(&self, found: Option<u8>, expected: &str) -> JsonStreamError {
        let found = match found {
            Some(byte) if byte.is_ascii_graphic() => format!("'{}'", byte as char),
            Some(byte) => format!("byte 0x{byte:02x}"),
            None => "end of input".to_string(),
        };
        JsonStreamError::syntax(self.offset, format!("expected {expected}, found {found}"))
    }

    /// Read an object key and decode its escapes
    pub(crate) fn read_key(&mut self) -> Result<String> {
        match self.skip_whitespace()? {
            Some(b'"') => {}
            other => return Err(self.unexpected(other, "object key")),
        }
        let mut raw = Vec::new();
        self.read_string(&mut Capture::Into(&mut raw))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Scan one complete value, starting at the next significant byte
    pub(crate) fn read_value(&mut self, capture: &mut Capture<'_>) -> Result<()> {
        match self.skip_whitespace()? {
            Some(b'"') => self.read_string(capture),
            Some(b'{' | b'[') => self.read_container(capture),
            found @ (None | Some(b'}' | b']' | b',' | b':')) => {
                Err(self.unexpected(found, "a value"))
            }
            Some(_) => self.read_scalar(capture),
        }
    }

    fn read_string(&mut self, capture: &mut Capture<'_>) -> Result<()> {
        if let Some(quote) = self.bump()? {
            capture.push(quote);
        }
        loop {
            let Some(byte) = self.bump()? else {
                return Err(JsonStreamError::syntax(self.offset, "unterminated string"));
            };
            capture.push(byte);
            match byte {
                b'"' => return Ok(()),
                b'\\' => match self.bump()? {
                    Some(escaped) => capture.push(escaped),
                    None => {
                        return Err(JsonStreamError::syntax(self.offset, "unterminated string"))
                    }
                },
                _ => {}
            }
        }
    }

    fn read_container(&mut self, capture: &mut Capture<'_>) -> Result<()> {
        let mut closers = Vec::new();
        loop {
            let Some(byte) = self.peek()? else {
                return Err(self.unexpected(None, "closing bracket"));
            };
            match byte {
                b'"' => {
                    self.read_string(capture)?;
                    continue;
                }
                b'{' => closers.push(b'}'),
                b'[' => closers.push(b']'),
                b'}' | b']' => {
                    if closers.pop() != Some(byte) {
                        return Err(JsonStreamError::syntax(
                            self.offset,
                            format!("mismatched '{}'", byte as char),
                        ));
                    }
                }
                _ => {}
            }
            self.bump()?;
            capture.push(byte);
            if closers.is_empty() {
                return Ok(());
            }
        }
    }

    fn read_scalar(&mut self, capture: &mut Capture<'_>) -> Result<()> {
        while let Some(byte) = self.peek()? {
            if matches!(
                byte,
                b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}' | b':'
            ) {
                break;
            }
            self.bump()?;
            capture.push(byte);
        }
        Ok(())
    }
}
