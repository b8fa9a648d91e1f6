use crate::error::ValidationError;
use std::borrow::Cow;

pub const FASTQ_MARKER: u8 = b'@';
pub const FASTA_MARKER: u8 = b'>';
pub const SEPARATOR_MARKER: u8 = b'+';

/// The two textual layouts a record can be read from and written back to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SequenceFormat {
    Fastq,
    Fasta,
}

impl SequenceFormat {
    pub fn marker(&self) -> u8 {
        match self {
            SequenceFormat::Fastq => FASTQ_MARKER,
            SequenceFormat::Fasta => FASTA_MARKER,
        }
    }
}

impl std::fmt::Display for SequenceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceFormat::Fastq => f.write_str("FASTQ"),
            SequenceFormat::Fasta => f.write_str("FASTA"),
        }
    }
}

/// The format-specific part of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Fastq { separator: Vec<u8>, qual: Vec<u8> },
    Fasta,
}

/// One sequencing read (FASTQ) or one named sequence (FASTA).
///
/// `id` never includes the leading marker character. For FASTA, `seq` is the concatenation of
/// every body line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: Vec<u8>,
    pub seq: Vec<u8>,
    pub kind: RecordKind,
}

impl Record {
    pub fn fastq(id: Vec<u8>, seq: Vec<u8>, separator: Vec<u8>, qual: Vec<u8>) -> Self {
        Record {
            id,
            seq,
            kind: RecordKind::Fastq { separator, qual },
        }
    }

    pub fn fasta(id: Vec<u8>, seq: Vec<u8>) -> Self {
        Record {
            id,
            seq,
            kind: RecordKind::Fasta,
        }
    }

    pub fn format(&self) -> SequenceFormat {
        match self.kind {
            RecordKind::Fastq { .. } => SequenceFormat::Fastq,
            RecordKind::Fasta => SequenceFormat::Fasta,
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// The identifier as text, for messages and the replacement log.
    pub fn id_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.id)
    }

    /// Checks the structural FASTQ invariants: a separator line starting with `+`, and a quality
    /// string exactly as long as the sequence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let RecordKind::Fastq { separator, qual } = &self.kind else {
            return Err(ValidationError::MissingFields);
        };

        if separator.first() != Some(&SEPARATOR_MARKER) {
            return Err(ValidationError::SeparatorMarker);
        }

        if self.seq.len() != qual.len() {
            return Err(ValidationError::LengthMismatch {
                seq: self.seq.len(),
                qual: qual.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fq(seq: &str, sep: &str, qual: &str) -> Record {
        Record::fastq(b"r1".to_vec(), seq.into(), sep.into(), qual.into())
    }

    #[test]
    fn valid_fastq() {
        assert_eq!(fq("ACGT", "+", "IIII").validate(), Ok(()));
        assert_eq!(fq("ACGT", "+r1", "IIII").validate(), Ok(()));
        assert_eq!(fq("", "+", "").validate(), Ok(()));
    }

    #[test]
    fn separator_must_have_marker() {
        assert_eq!(
            fq("ACGT", "-", "IIII").validate(),
            Err(ValidationError::SeparatorMarker)
        );
        assert_eq!(
            fq("ACGT", "", "IIII").validate(),
            Err(ValidationError::SeparatorMarker)
        );
    }

    #[test]
    fn quality_length_must_match() {
        assert_eq!(
            fq("ACGTA", "+", "III").validate(),
            Err(ValidationError::LengthMismatch { seq: 5, qual: 3 })
        );
    }

    #[test]
    fn fasta_is_not_a_fastq_record() {
        let rec = Record::fasta(b"chr1".to_vec(), b"ACGT".to_vec());
        assert_eq!(rec.format(), SequenceFormat::Fasta);
        assert_eq!(rec.validate(), Err(ValidationError::MissingFields));
    }
}
