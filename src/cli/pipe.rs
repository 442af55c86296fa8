//! CLI Pipe Support
//!
//! Reads NMEA input from a file or stdin in fixed-size chunks, the way it
//! would arrive from a serial line.

use std::io::{self, Read};

/// Default read size for `parse`
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Pipe mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeMode {
    /// No piping, interactive mode
    Interactive,
    /// Read from stdin
    StdinOnly,
    /// Write to stdout
    StdoutOnly,
    /// Full pipe mode (stdin -> process -> stdout)
    Full,
}

impl PipeMode {
    /// Detect pipe mode from environment
    pub fn detect() -> Self {
        let stdin_is_tty = atty::is(atty::Stream::Stdin);
        let stdout_is_tty = atty::is(atty::Stream::Stdout);

        match (stdin_is_tty, stdout_is_tty) {
            (true, true) => Self::Interactive,
            (false, true) => Self::StdinOnly,
            (true, false) => Self::StdoutOnly,
            (false, false) => Self::Full,
        }
    }

    /// Is receiving from stdin?
    pub fn has_stdin(&self) -> bool {
        matches!(self, Self::StdinOnly | Self::Full)
    }

    /// Is interactive?
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

/// Chunked text reader
///
/// Yields text chunks of at most `chunk_size` bytes. A multi-byte character
/// split by a read is held back until the rest of it arrives; invalid bytes
/// are replaced with U+FFFD.
pub struct ChunkReader<R> {
    reader: R,
    buffer: Vec<u8>,
    pending: Vec<u8>,
}

impl<R: Read> ChunkReader<R> {
    /// Create new chunk reader
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buffer: vec![0u8; chunk_size.max(1)],
            pending: Vec::new(),
        }
    }

    /// Next chunk, or `None` at end of input
    pub fn next_chunk(&mut self) -> io::Result<Option<String>> {
        loop {
            let n = match self.reader.read(&mut self.buffer) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if n == 0 {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let rest = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                return Ok(Some(rest));
            }
            self.pending.extend_from_slice(&self.buffer[..n]);
            let text = self.take_text();
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }

    /// Decoded text up to the last complete character; a truncated
    /// trailing character stays in `pending`
    fn take_text(&mut self) -> String {
        let mut text = String::new();
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
        text
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
