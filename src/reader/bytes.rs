use crate::error::{Result, SeqError};
use crate::io::{read_trimmed_line, GenericBufReader};
use std::path::{Path, PathBuf};

/// Line reader shared by the FASTQ and FASTA parsers. Tracks the current line number so
/// that format errors can point at the offending line.
pub struct LineReader {
    reader: GenericBufReader,
    path: PathBuf,
    line: u64,
}

impl LineReader {
    pub fn new(reader: GenericBufReader, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line: 0,
        }
    }

    /// Reads the next line into `buf` with its terminator removed.
    /// Returns `Ok(false)` once the input is exhausted.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool> {
        let more = read_trimmed_line(&mut self.reader, buf).map_err(|source| SeqError::Read {
            path: self.path.clone(),
            source,
        })?;
        if more {
            self.line += 1;
        }
        Ok(more)
    }

    /// Like `read_line`, but end of input is a format error describing what was `expected`.
    pub fn expect_line(&mut self, expected: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if !self.read_line(&mut buf)? {
            return Err(self.format_error(format!("unexpected end of file, expected {expected}")));
        }
        Ok(buf)
    }

    pub fn format_error(&self, reason: String) -> SeqError {
        SeqError::Format {
            path: self.path.clone(),
            line: self.line,
            reason,
        }
    }

    /// Number of lines consumed so far (1-based number of the last line read).
    pub fn line_number(&self) -> u64 {
        self.line
    }
}
