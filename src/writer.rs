use crate::error::{Result, SeqError};
use crate::io::OutputFile;
use crate::record::{Record, RecordKind};
use std::io::Write;
use std::path::Path;

/// Serializes `record` in the layout it was read in, with `id` in place of its own identifier.
///
/// FASTQ is written as four lines (`@id`, sequence, separator, quality); FASTA as two lines
/// (`>id` and the whole sequence on one line).
///
/// # Arguments
///
/// * `writer` - Any `std::io::Write`. Use a `Vec<u8>` or `Cursor` to serialize in memory.
/// * `id` - The identifier to write, without its marker character.
/// * `record` - The record supplying the sequence (and, for FASTQ, separator and quality).
pub fn write_record(writer: &mut impl Write, id: &[u8], record: &Record) -> std::io::Result<()> {
    writer.write_all(&[record.format().marker()])?;
    writer.write_all(id)?;
    writer.write_all(b"\n")?;

    match &record.kind {
        RecordKind::Fastq { separator, qual } => {
            writer.write_all(&record.seq)?;
            writer.write_all(b"\n")?;
            writer.write_all(separator)?;
            writer.write_all(b"\n")?;
            writer.write_all(qual)?;
            writer.write_all(b"\n")
        }
        RecordKind::Fasta => {
            writer.write_all(&record.seq)?;
            writer.write_all(b"\n")
        }
    }
}

/// Writes records to an output file, compressing through `gzip` when the path ends in `.gz`.
pub struct RecordSink {
    out: OutputFile,
}

impl RecordSink {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            out: OutputFile::create(path)?,
        })
    }

    /// Writes the record unchanged.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        self.write_with_id(&record.id, record)
    }

    /// Writes the record under a different identifier.
    pub fn write_with_id(&mut self, id: &[u8], record: &Record) -> Result<()> {
        write_record(&mut self.out, id, record).map_err(|source| SeqError::Write {
            path: self.out.path().to_path_buf(),
            source,
        })
    }

    /// Flushes the output and waits for the compressor, if there is one.
    pub fn finish(self) -> Result<()> {
        self.out.finish()
    }
}
