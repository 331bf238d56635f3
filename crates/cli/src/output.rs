use anyhow::{Context, Result};
use chunkstream_chunker::{Chunk, Chunks};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::io::Write;

/// Writes each chunk as one JSON array
pub struct ChunkWriter<W: Write> {
    out: W,
    pretty: bool,
    written: usize,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self {
            out,
            pretty,
            written: 0,
        }
    }

    /// Drain up to `limit` chunks of a fallible source.
    ///
    /// Elements are serialized as they are pulled, so only one is in memory
    /// at a time. Chunks written before a source error stay written; the
    /// failing chunk is left unterminated (no closing `]`, no newline).
    pub fn write_chunks<I, T, E>(&mut self, chunks: Chunks<I>, limit: Option<usize>) -> Result<usize>
    where
        I: Iterator<Item = std::result::Result<T, E>>,
        T: Serialize,
        E: std::error::Error + Send + Sync + 'static,
    {
        for chunk in chunks.take(limit.unwrap_or(usize::MAX)) {
            self.write_chunk(chunk)?;
        }
        Ok(self.written)
    }

    fn write_chunk<I, T, E>(&mut self, chunk: Chunk<I>) -> Result<()>
    where
        I: Iterator<Item = std::result::Result<T, E>>,
        T: Serialize,
        E: std::error::Error + Send + Sync + 'static,
    {
        let index = chunk.index();
        let streamed = if self.pretty {
            stream_array(&mut serde_json::Serializer::pretty(&mut self.out), chunk)
        } else {
            stream_array(&mut serde_json::Serializer::new(&mut self.out), chunk)
        };
        streamed.with_context(|| format!("Failed to read chunk {index}"))?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Serialize `items` as one array, stopping at the first error before the
/// array is closed.
fn stream_array<S, I, T, E>(serializer: S, items: I) -> Result<()>
where
    S: Serializer,
    S::Error: Send + Sync + 'static,
    I: Iterator<Item = std::result::Result<T, E>>,
    T: Serialize,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut seq = serializer.serialize_seq(None)?;
    for item in items {
        seq.serialize_element(&item?)?;
    }
    seq.end()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkstream_chunker::chunk;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    fn render<T: Serialize>(
        items: Vec<std::result::Result<T, io::Error>>,
        size: usize,
        limit: Option<usize>,
        pretty: bool,
    ) -> (Result<usize>, String) {
        let mut writer = ChunkWriter::new(Vec::new(), pretty);
        let result = writer.write_chunks(chunk(items, size).unwrap(), limit);
        (result, String::from_utf8(writer.into_inner()).unwrap())
    }

    #[test]
    fn one_line_per_chunk() {
        let (result, out) = render((1..=5).map(Ok).collect(), 2, None, false);
        assert_eq!(result.unwrap(), 3);
        assert_eq!(out, "[1,2]\n[3,4]\n[5]\n");
    }

    #[test]
    fn limit_stops_early() {
        let (result, out) = render((1..=5).map(Ok).collect(), 2, Some(1), false);
        assert_eq!(result.unwrap(), 1);
        assert_eq!(out, "[1,2]\n");
    }

    #[test]
    fn pretty_output() {
        let (_, out) = render(vec![Ok("a")], 2, None, true);
        assert_eq!(out, "[\n  \"a\"\n]\n");
    }

    #[test]
    fn error_keeps_previous_chunks() {
        let items = vec![
            Ok(1),
            Ok(2),
            Err(io::Error::new(io::ErrorKind::InvalidData, "broken")),
        ];
        let (result, out) = render(items, 2, None, false);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("chunk 1"));
        assert_eq!(out, "[1,2]\n[");
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn elements_are_written_as_they_are_pulled() {
        let sink = SharedBuf::default();
        let seen = Rc::clone(&sink.0);
        let source = (1..=3).map(move |n| {
            // By the time `3` is pulled, `1` and `2` are already on the sink.
            if n == 3 {
                assert_eq!(String::from_utf8_lossy(&seen.borrow()), "[1,2");
            }
            Ok::<_, io::Error>(n)
        });

        let mut writer = ChunkWriter::new(sink.clone(), false);
        let written = writer.write_chunks(chunk(source, 3).unwrap(), None).unwrap();
        assert_eq!(written, 1);
        assert_eq!(String::from_utf8_lossy(&sink.0.borrow()), "[1,2,3]\n");
    }

    #[test]
    fn pretty_nested_values_keep_indentation() {
        let items = vec![Ok(serde_json::json!({"id": 1})), Ok(serde_json::json!([2]))];
        let (_, out) = render(items, 2, None, true);
        assert_eq!(out, "[\n  {\n    \"id\": 1\n  },\n  [\n    2\n  ]\n]\n");
    }
}
