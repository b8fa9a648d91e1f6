use std::io::Write;

/// One applied replacement, as written to the replacement log.
#[derive(Debug, PartialEq, Eq)]
pub struct ReplacementRecord<'a> {
    pub sequence_id: &'a [u8],
    pub offset: usize,
    pub original: &'a [u8],
    pub replacement: &'a [u8],
}

/// Appends a replacement to the log:
///
/// ```text
/// Sequence ID: <id>
/// Position: <offset>
/// Original: <original segment>
/// Replaced: <replacement>
/// ---
/// ```
pub fn write_entry(writer: &mut impl Write, entry: &ReplacementRecord) -> std::io::Result<()> {
    writer.write_all(b"Sequence ID: ")?;
    writer.write_all(entry.sequence_id)?;
    write!(writer, "\nPosition: {}\nOriginal: ", entry.offset)?;
    writer.write_all(entry.original)?;
    writer.write_all(b"\nReplaced: ")?;
    writer.write_all(entry.replacement)?;
    writer.write_all(b"\n---\n")
}

/// Overwrites `seq[offset..offset + replacement.len()]` with `replacement` and returns the
/// segment that was there before. Returns `None`, leaving `seq` untouched, if the replacement
/// would run past the end of the sequence.
pub fn splice(seq: &mut [u8], offset: usize, replacement: &[u8]) -> Option<Vec<u8>> {
    let end = offset.checked_add(replacement.len())?;
    let segment = seq.get_mut(offset..end)?;
    let original = segment.to_vec();
    segment.copy_from_slice(replacement);
    Some(original)
}
