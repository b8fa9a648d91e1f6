pub mod bytes;
pub mod fasta;
pub mod fastq;

use crate::error::{Result, SeqError};
use crate::record::{Record, SequenceFormat};
use std::path::Path;

use self::bytes::LineReader;
use self::fasta::FastaReader;
use self::fastq::FastqReader;

const FASTQ_SUFFIXES: [&str; 4] = [".fq", ".fastq", ".fq.gz", ".fastq.gz"];
const FASTA_SUFFIXES: [&str; 4] = [".fa", ".fasta", ".fa.gz", ".fasta.gz"];

impl SequenceFormat {
    /// Picks the record layout from a file name suffix (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `SeqError::Config` for any suffix that is neither FASTQ nor FASTA.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy().to_lowercase();

        if FASTQ_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Ok(SequenceFormat::Fastq)
        } else if FASTA_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Ok(SequenceFormat::Fasta)
        } else {
            Err(SeqError::Config(format!(
                "unknown file format for `{}`: use .fq, .fastq, .fa or .fasta (optionally .gz)",
                path.display()
            )))
        }
    }
}

/// A forward-only stream of records from one file, in either layout.
pub enum RecordSource {
    Fastq(FastqReader),
    Fasta(FastaReader),
}

impl RecordSource {
    /// Opens `path` (decompressing `.gz` files through `gzip`) and reads it as `format`.
    pub fn open(path: &Path, format: SequenceFormat) -> Result<Self> {
        let lines = LineReader::new(crate::io::open_input(path)?, path);
        Ok(match format {
            SequenceFormat::Fastq => RecordSource::Fastq(FastqReader::new(lines)),
            SequenceFormat::Fasta => RecordSource::Fasta(FastaReader::new(lines)),
        })
    }

    pub fn format(&self) -> SequenceFormat {
        match self {
            RecordSource::Fastq(_) => SequenceFormat::Fastq,
            RecordSource::Fasta(_) => SequenceFormat::Fasta,
        }
    }

    /// Header lines seen so far. For FASTQ every header starts a record.
    pub fn headers_seen(&self) -> usize {
        match self {
            RecordSource::Fastq(r) => r.records_read(),
            RecordSource::Fasta(r) => r.headers_seen(),
        }
    }

    /// Headers dropped for having an empty sequence (FASTA only).
    pub fn headers_dropped(&self) -> usize {
        match self {
            RecordSource::Fastq(_) => 0,
            RecordSource::Fasta(r) => r.headers_dropped(),
        }
    }

    pub fn line_number(&self) -> u64 {
        match self {
            RecordSource::Fastq(r) => r.line_number(),
            RecordSource::Fasta(r) => r.line_number(),
        }
    }
}

impl Iterator for RecordSource {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RecordSource::Fastq(r) => r.next(),
            RecordSource::Fasta(r) => r.next(),
        }
    }
}
