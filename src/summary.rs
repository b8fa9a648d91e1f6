use crate::error::{Result, SeqError};
use crate::io::OutputFile;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Metadata about one completed run, written as JSON by `--summary`.
#[derive(Serialize)]
pub struct RunSummary<S: Serialize> {
    pub seqsplice_version: String,
    pub command: &'static str,
    pub run_date: String,
    pub elapsed: f64,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    #[serde(flatten)]
    pub stats: S,
}

impl<S: Serialize> RunSummary<S> {
    pub fn new(
        command: &'static str,
        inputs: Vec<PathBuf>,
        output: PathBuf,
        started: Instant,
        stats: S,
    ) -> Self {
        RunSummary {
            seqsplice_version: crate::cli::VERSION.to_string(),
            command,
            run_date: format!("{:?}", chrono::offset::Local::now()),
            elapsed: started.elapsed().as_secs_f64(),
            inputs,
            output,
            stats,
        }
    }

    /// Writes the summary as pretty-printed JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut out = OutputFile::create(path)?;
        serde_json::to_writer_pretty(&mut out, self)
            .map_err(std::io::Error::from)
            .map_err(|source| SeqError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        out.finish()?;

        info!("Wrote run summary to {}", path.display());
        Ok(())
    }
}
