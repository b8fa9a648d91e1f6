use crate::error::{Result, SeqError};
use crate::id::IdGenerator;
use crate::io::ensure_distinct;
use crate::reader::RecordSource;
use crate::record::SequenceFormat;
use crate::writer::RecordSink;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeStats {
    pub files_processed: usize,
    pub total_records: usize,
}

const PROGRESS_INTERVAL: usize = 10_000;

/// Concatenates FASTQ files into one, giving every read a fresh synthetic identifier.
/// Sequence, separator and quality lines are copied unchanged.
pub struct Merger {
    config: MergeConfig,
    ids: IdGenerator,
    stats: MergeStats,
}

impl Merger {
    /// # Errors
    ///
    /// Returns `SeqError::Config` if there are no inputs or one of them is also the output, and
    /// `SeqError::Open` if an input does not exist.
    pub fn new(config: MergeConfig, ids: IdGenerator) -> Result<Self> {
        if config.inputs.is_empty() {
            return Err(SeqError::Config("at least one input file is required".into()));
        }

        for input in &config.inputs {
            std::fs::metadata(input).map_err(|source| SeqError::Open {
                path: input.clone(),
                source,
            })?;
            ensure_distinct(input, &config.output)?;
        }

        Ok(Self {
            config,
            ids,
            stats: MergeStats::default(),
        })
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Reads every input in order and writes all of their records to the output.
    ///
    /// Stops at the first unreadable file or invalid record; whatever was written up to that
    /// point stays in the output.
    pub fn run(&mut self) -> Result<&MergeStats> {
        let mut sink = RecordSink::create(&self.config.output)?;

        for (i, input) in self.config.inputs.iter().enumerate() {
            info!(
                "Processing file {}/{}: {}",
                i + 1,
                self.config.inputs.len(),
                input.display()
            );

            let mut source = RecordSource::open(input, SequenceFormat::Fastq)?;
            let mut file_records = 0;

            while let Some(record) = source.next() {
                let record = record?;
                record.validate().map_err(|source_err| SeqError::Invalid {
                    path: input.clone(),
                    line: source.line_number(),
                    source: source_err,
                })?;

                let id = self.ids.next_id();
                sink.write_with_id(id.as_bytes(), &record)?;

                file_records += 1;
                self.stats.total_records += 1;
                if file_records % PROGRESS_INTERVAL == 0 {
                    debug!("  Processed {file_records} sequences...");
                }
            }

            self.stats.files_processed += 1;
            info!("  {file_records} sequences from {}", input.display());
        }

        sink.finish()?;
        Ok(&self.stats)
    }
}
