//! Line-delimited corpus streaming.
//!
//! The transport is opaque: bytes arrive as chunks of any size from a
//! [`ChunkSource`]. [`LineSplitter`] carries the trailing partial line across
//! chunk boundaries (as raw bytes, so a multi-byte character split between
//! two chunks is reassembled before decoding) and flushes it at end of
//! stream. [`CorpusStream`] turns the lines into [`QuestionRecord`]s, skipping
//! malformed ones.

use std::collections::VecDeque;
use std::io::{self, Read};

use tracing::debug;

use crate::drill_engine::{error::Result, models::QuestionRecord};

/// Default read size for [`ReaderChunks`].
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Chunk sources
// ---------------------------------------------------------------------------

/// Pull-based byte chunk source. `Ok(None)` is end of stream.
pub trait ChunkSource {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Adapts any [`Read`] into fixed-size chunks.
pub struct ReaderChunks<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read> ReaderChunks<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl<R: Read> ChunkSource for ReaderChunks<R> {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(buf));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Pre-split chunks held in memory.
#[derive(Debug, Default)]
pub struct MemoryChunks {
    chunks: VecDeque<Vec<u8>>,
}

impl MemoryChunks {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

impl ChunkSource for MemoryChunks {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.chunks.pop_front())
    }
}

// ---------------------------------------------------------------------------
// Line splitting
// ---------------------------------------------------------------------------

/// Incremental `\n` / `\r\n` splitter.
#[derive(Debug, Default)]
pub struct LineSplitter {
    carry: Vec<u8>,
    ready: VecDeque<String>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk; every line it completes becomes available to [`pop`](Self::pop).
    pub fn feed(&mut self, chunk: &[u8]) {
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.carry.extend_from_slice(&rest[..pos]);
            let line = std::mem::take(&mut self.carry);
            self.ready.push_back(decode_line(line));
            rest = &rest[pos + 1..];
        }
        self.carry.extend_from_slice(rest);
    }

    pub fn pop(&mut self) -> Option<String> {
        self.ready.pop_front()
    }

    /// End of stream: the unterminated trailing line, if non-empty, becomes ready.
    pub fn finish(&mut self) {
        if !self.carry.is_empty() {
            let line = std::mem::take(&mut self.carry);
            self.ready.push_back(decode_line(line));
        }
    }

    /// Bytes held back waiting for a newline.
    pub fn pending_bytes(&self) -> usize {
        self.carry.len()
    }
}

fn decode_line(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

// ---------------------------------------------------------------------------
// Record sources
// ---------------------------------------------------------------------------

/// A finite or endless lazy sequence of question records.
///
/// `Ok(None)` is the explicit end signal; once returned, the source stays
/// exhausted.
pub trait RecordSource {
    fn next_record(&mut self) -> Result<Option<QuestionRecord>>;

    /// Discard up to `n` upcoming entries. Returns how many were discarded.
    fn skip(&mut self, n: u64) -> Result<u64> {
        let mut skipped = 0;
        while skipped < n {
            if self.next_record()?.is_none() {
                break;
            }
            skipped += 1;
        }
        Ok(skipped)
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn next_record(&mut self) -> Result<Option<QuestionRecord>> {
        (**self).next_record()
    }

    fn skip(&mut self, n: u64) -> Result<u64> {
        (**self).skip(n)
    }
}

/// Records already in memory, served in order.
#[derive(Debug, Default)]
pub struct VecSource {
    records: VecDeque<QuestionRecord>,
}

impl VecSource {
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl RecordSource for VecSource {
    fn next_record(&mut self) -> Result<Option<QuestionRecord>> {
        Ok(self.records.pop_front())
    }
}

/// Streams JSONL question records out of a chunked byte source.
pub struct CorpusStream<C> {
    source: C,
    splitter: LineSplitter,
    finished: bool,
    lines_read: u64,
    malformed: u64,
}

impl<C: ChunkSource> CorpusStream<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            splitter: LineSplitter::new(),
            finished: false,
            lines_read: 0,
            malformed: 0,
        }
    }

    /// Next raw line, or `None` at end of stream.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.splitter.pop() {
                self.lines_read += 1;
                return Ok(Some(line));
            }
            if self.finished {
                return Ok(None);
            }
            match self.source.next_chunk()? {
                Some(chunk) => self.splitter.feed(&chunk),
                None => {
                    self.splitter.finish();
                    self.finished = true;
                }
            }
        }
    }

    /// Discard up to `n` raw lines without parsing them.
    pub fn skip_lines(&mut self, n: u64) -> Result<u64> {
        let mut skipped = 0;
        while skipped < n && self.next_line()?.is_some() {
            skipped += 1;
        }
        Ok(skipped)
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Lines dropped because they did not parse.
    pub fn malformed_count(&self) -> u64 {
        self.malformed
    }
}

impl<R: Read> CorpusStream<ReaderChunks<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(ReaderChunks::new(reader))
    }
}

impl<C: ChunkSource> RecordSource for CorpusStream<C> {
    fn next_record(&mut self) -> Result<Option<QuestionRecord>> {
        while let Some(line) = self.next_line()? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match QuestionRecord::from_json_line(trimmed) {
                Ok(rec) => return Ok(Some(rec)),
                Err(err) if err.is_recoverable() => {
                    self.malformed += 1;
                    debug!(line = self.lines_read, %err, "skipping malformed corpus line");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    fn skip(&mut self, n: u64) -> Result<u64> {
        self.skip_lines(n)
    }
}
