//! Incremental record boundary detection.
//!
//! `RecordReader` pulls bytes from any `Read` in fixed chunks and hands out
//! one raw record at a time without ever holding more than the pending record
//! (plus one chunk) in memory.

use std::io::{self, Read};
use std::time::SystemTime;
use tracing::debug;

use super::Format;

/// Bytes requested from the underlying reader per fill.
const READ_CHUNK: usize = 64 * 1024;

/// One raw record as found in the stream.
#[derive(Debug, Clone)]
pub struct Record {
    pub bytes: Vec<u8>,
    /// When the first byte of this record was buffered.
    pub first_byte_at: SystemTime,
}

pub struct RecordReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// Start of the pending record in `buf`.
    pos: usize,
    /// Offset up to which complete lines were already checked for markers.
    scanned: usize,
    eof: bool,
    format: Option<Format>,
    pending_since: Option<SystemTime>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
            scanned: 0,
            eof: false,
            format: None,
            pending_since: None,
        }
    }

    /// Encoding detected for this stream, once enough bytes were seen.
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Returns the next complete record, or `None` once the stream is done.
    pub fn next_record(&mut self) -> io::Result<Option<Record>> {
        loop {
            let format = match self.format {
                Some(format) => format,
                None => match Format::sniff(&self.buf[self.pos..]) {
                    Some(format) => {
                        debug!("Detected {:?} encoding", format);
                        self.format = Some(format);
                        format
                    }
                    None if self.eof => {
                        self.discard_consumed(self.buf.len());
                        return Ok(None);
                    }
                    None => {
                        self.fill()?;
                        continue;
                    }
                },
            };

            if let Some(end) = self.find_boundary(format) {
                return Ok(Some(self.take_record(end)));
            }

            if self.eof {
                if self.pos < self.buf.len() {
                    let end = self.buf.len();
                    return Ok(Some(self.take_record(end)));
                }
                return Ok(None);
            }

            self.fill()?;
        }
    }

    /// Finds the first marker line after the pending record's opening line.
    fn find_boundary(&mut self, format: Format) -> Option<usize> {
        let buf = &self.buf;

        let mut line_start = if self.scanned > self.pos {
            self.scanned
        } else {
            let first_newline = buf[self.pos..].iter().position(|&b| b == b'\n')?;
            self.pos + first_newline + 1
        };

        while let Some(len) = buf[line_start..].iter().position(|&b| b == b'\n') {
            if format.is_boundary(&buf[line_start..line_start + len]) {
                return Some(line_start);
            }
            line_start += len + 1;
        }

        self.scanned = line_start;
        None
    }

    fn take_record(&mut self, end: usize) -> Record {
        let bytes = self.buf[self.pos..end].to_vec();
        let first_byte_at = self.pending_since.unwrap_or_else(SystemTime::now);

        self.discard_consumed(end);
        self.pending_since = if self.buf.is_empty() {
            None
        } else {
            Some(SystemTime::now())
        };

        Record {
            bytes,
            first_byte_at,
        }
    }

    fn discard_consumed(&mut self, end: usize) {
        self.buf.drain(..end);
        self.pos = 0;
        self.scanned = 0;
    }

    fn fill(&mut self) -> io::Result<()> {
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK, 0);

        loop {
            match self.inner.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buf.truncate(start + n);
                    if start == self.pos {
                        self.pending_since = Some(SystemTime::now());
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        }
    }
}
