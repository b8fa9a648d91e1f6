use super::bytes::LineReader;
use crate::error::Result;
use crate::record::{Record, FASTA_MARKER};

/// Reads multi-line FASTA records.
///
/// A record starts at a `>` header and takes every following line, concatenated without line
/// terminators, up to the next header or end of input. Lines before the first header are
/// ignored. A header with an empty body is dropped, not emitted as a zero-length record.
pub struct FastaReader {
    lines: LineReader,
    // header line read while scanning the previous record's body
    pending_header: Option<Vec<u8>>,
    headers: usize,
    dropped: usize,
    done: bool,
}

impl FastaReader {
    pub fn new(lines: LineReader) -> Self {
        Self {
            lines,
            pending_header: None,
            headers: 0,
            dropped: 0,
            done: false,
        }
    }

    /// Header lines seen so far, including dropped ones.
    pub fn headers_seen(&self) -> usize {
        self.headers
    }

    /// Headers dropped so far because their body was empty.
    pub fn headers_dropped(&self) -> usize {
        self.dropped
    }

    pub fn line_number(&self) -> u64 {
        self.lines.line_number()
    }

    fn next_header(&mut self) -> Result<Option<Vec<u8>>> {
        if let Some(header) = self.pending_header.take() {
            return Ok(Some(header));
        }

        let mut line = Vec::new();
        while self.lines.read_line(&mut line)? {
            if line.first() == Some(&FASTA_MARKER) {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let mut line = Vec::new();

        while let Some(header) = self.next_header()? {
            self.headers += 1;

            let mut seq = Vec::new();
            while self.lines.read_line(&mut line)? {
                if line.first() == Some(&FASTA_MARKER) {
                    self.pending_header = Some(std::mem::take(&mut line));
                    break;
                }
                seq.extend_from_slice(&line);
            }

            if seq.is_empty() {
                self.dropped += 1;
                debug!(
                    "Dropping FASTA header with empty sequence: {}",
                    String::from_utf8_lossy(&header[1..])
                );
                continue;
            }

            return Ok(Some(Record::fasta(header[1..].to_vec(), seq)));
        }

        Ok(None)
    }
}

impl Iterator for FastaReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.read_record().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.done = true;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};
    use std::path::Path;

    fn reader(text: &str) -> FastaReader {
        let inner: Box<dyn Read> = Box::new(Cursor::new(text.as_bytes().to_vec()));
        FastaReader::new(LineReader::new(BufReader::new(inner), Path::new("test.fa")))
    }

    fn ids_and_seqs(r: FastaReader) -> Vec<(String, String)> {
        r.map(|rec| {
            let rec = rec.unwrap();
            (
                String::from_utf8(rec.id).unwrap(),
                String::from_utf8(rec.seq).unwrap(),
            )
        })
        .collect()
    }

    #[test]
    fn multi_line_bodies_are_joined() {
        let records = ids_and_seqs(reader(">chr1 desc\nACGT\nTTGA\n>chr2\nGG\n"));
        assert_eq!(
            records,
            vec![
                ("chr1 desc".to_string(), "ACGTTTGA".to_string()),
                ("chr2".to_string(), "GG".to_string()),
            ]
        );
    }

    #[test]
    fn empty_bodies_are_dropped() {
        let mut r = reader(">empty\n>full\nAC\n>blank\n\n\n>last");
        assert_eq!(r.next().unwrap().unwrap().id, b"full");
        assert!(r.next().is_none());
        assert_eq!(r.headers_seen(), 4);
        assert_eq!(r.headers_dropped(), 3);
    }

    #[test]
    fn leading_lines_are_ignored() {
        let records = ids_and_seqs(reader("junk\n\n>s\nA\r\nC"));
        assert_eq!(records, vec![("s".to_string(), "AC".to_string())]);
    }

    #[test]
    fn no_headers_is_empty_stream() {
        assert!(reader("ACGT\nACGT\n").next().is_none());
        assert!(reader("").next().is_none());
    }
}
