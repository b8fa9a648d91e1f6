use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while reading, rewriting or writing sequence files.
///
/// Every I/O variant carries the path it failed on, so that a message logged at the top level
/// is enough to locate the problem.
#[derive(Error, Debug)]
pub enum SeqError {
    #[error("cannot open `{}`", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read from `{}`", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write to `{}`", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed record in `{}` at line {line}: {reason}", path.display())]
    Format {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("invalid FASTQ record in `{}` ending at line {line}", path.display())]
    Invalid {
        path: PathBuf,
        line: u64,
        source: ValidationError,
    },

    #[error("no records found in `{}`, cannot pick random reads", path.display())]
    NoRecords { path: PathBuf },

    #[error("{0}")]
    Config(String),
}

impl SeqError {
    /// Process exit status used when this error aborts a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            SeqError::Open { .. } => 1,
            SeqError::Read { .. } => 2,
            SeqError::Write { .. } => 3,
            SeqError::Format { .. } | SeqError::Invalid { .. } | SeqError::NoRecords { .. } => 4,
            SeqError::Config(_) => 6,
        }
    }
}

/// The structural FASTQ invariant a record failed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record has no separator or quality line")]
    MissingFields,

    #[error("separator line must start with '+'")]
    SeparatorMarker,

    #[error("sequence length ({seq}) does not match quality length ({qual})")]
    LengthMismatch { seq: usize, qual: usize },
}

pub type Result<T, E = SeqError> = std::result::Result<T, E>;
