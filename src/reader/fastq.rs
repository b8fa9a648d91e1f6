use super::bytes::LineReader;
use crate::error::Result;
use crate::record::{Record, FASTQ_MARKER};

/// Reads four-line FASTQ records.
///
/// Line 1 is the id (a single leading `@` is stripped when present), line 2 the sequence,
/// line 3 the separator and line 4 the quality string. Running out of input between records
/// ends the stream; running out part-way through a record, or a blank line where a record should
/// start, is a format error.
pub struct FastqReader {
    lines: LineReader,
    records: usize,
    done: bool,
}

impl FastqReader {
    pub fn new(lines: LineReader) -> Self {
        Self {
            lines,
            records: 0,
            done: false,
        }
    }

    pub fn records_read(&self) -> usize {
        self.records
    }

    pub fn line_number(&self) -> u64 {
        self.lines.line_number()
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let mut id = Vec::new();
        if !self.lines.read_line(&mut id)? {
            return Ok(None);
        }
        if id.is_empty() {
            return Err(self
                .lines
                .format_error("empty line where a record header was expected".into()));
        }

        if id.first() == Some(&FASTQ_MARKER) {
            id.remove(0);
        }

        let seq = self.lines.expect_line("a sequence line")?;
        let separator = self.lines.expect_line("a separator line")?;
        let qual = self.lines.expect_line("a quality line")?;

        self.records += 1;
        Ok(Some(Record::fastq(id, seq, separator, qual)))
    }
}

impl Iterator for FastqReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.read_record().transpose();
        if !matches!(result, Some(Ok(_))) {
            // stop at end of input and after the first error
            self.done = true;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeqError;
    use std::io::{BufReader, Cursor, Read};
    use std::path::Path;

    fn reader(text: &str) -> FastqReader {
        let inner: Box<dyn Read> = Box::new(Cursor::new(text.as_bytes().to_vec()));
        FastqReader::new(LineReader::new(BufReader::new(inner), Path::new("test.fq")))
    }

    #[test]
    fn reads_records() {
        let records: Vec<Record> = reader("@r1\nACGT\n+\nIIII\n@r2 extra\nGG\n+r2\n##\n")
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            records,
            vec![
                Record::fastq(b"r1".to_vec(), b"ACGT".to_vec(), b"+".to_vec(), b"IIII".to_vec()),
                Record::fastq(
                    b"r2 extra".to_vec(),
                    b"GG".to_vec(),
                    b"+r2".to_vec(),
                    b"##".to_vec()
                ),
            ]
        );
    }

    #[test]
    fn id_without_marker_is_kept() {
        let rec = reader("r1\nA\n+\nI").next().unwrap().unwrap();
        assert_eq!(rec.id, b"r1");
        assert_eq!(
            rec.kind,
            crate::record::RecordKind::Fastq {
                separator: b"+".to_vec(),
                qual: b"I".to_vec()
            }
        );
    }

    #[test]
    fn empty_input_is_empty_stream() {
        assert!(reader("").next().is_none());
    }

    #[test]
    fn blank_line_between_records_is_format_error() {
        let mut r = reader("@r1\nACGT\n+\nIIII\n\n@r2\nGG\n+\nII\n");
        assert!(r.next().unwrap().is_ok());

        match r.next() {
            Some(Err(SeqError::Format { line, .. })) => assert_eq!(line, 5),
            other => panic!("expected a format error, got {other:?}"),
        }
        assert!(r.next().is_none());
    }

    #[test]
    fn trailing_blank_line_is_format_error() {
        let results: Vec<Result<Record>> = reader("@r1\nACGT\n+\nIIII\n\n").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SeqError::Format { line: 5, .. })));
    }

    #[test]
    fn crlf_line_endings() {
        let rec = reader("@r1\r\nACGT\r\n+\r\nIIII\r\n").next().unwrap().unwrap();
        assert_eq!(rec.seq, b"ACGT");
    }

    #[test]
    fn truncated_record_is_format_error() {
        let mut r = reader("@r1\nACGT\n+\nIIII\n@r2\nACGT\n");
        assert!(r.next().unwrap().is_ok());

        match r.next() {
            Some(Err(SeqError::Format { line, .. })) => assert_eq!(line, 6),
            other => panic!("expected a format error, got {other:?}"),
        }
        assert!(r.next().is_none());
        assert_eq!(r.records_read(), 1);
    }
}
