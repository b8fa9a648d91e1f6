use crate::error::{Result, SeqError};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

pub type GenericBufReader = BufReader<Box<dyn Read>>;

const GZIP: &str = "gzip";

/// Whether a path names a gzip archive, which routes reads and writes through a `gzip`
/// subprocess rather than direct file access.
pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Opens `path` for line-oriented reading. Plain files are read directly; `.gz` files are
/// streamed through `gzip -dc`.
///
/// # Errors
///
/// Returns `SeqError::Open` if the file cannot be opened or the decompressor cannot be started.
pub fn open_input(path: &Path) -> Result<GenericBufReader> {
    let open_err = |source| SeqError::Open {
        path: path.to_path_buf(),
        source,
    };

    let inner: Box<dyn Read> = if is_gzipped(path) {
        // make sure a missing file is reported as such, not as a gzip failure
        std::fs::metadata(path).map_err(open_err)?;

        let mut child = Command::new(GZIP)
            .arg("-dc")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(open_err)?;

        let stdout = child.stdout.take().ok_or_else(|| {
            open_err(io::Error::new(io::ErrorKind::Other, "no stdout from gzip"))
        })?;

        debug!("Decompressing {} through {GZIP}", path.display());
        Box::new(ChildReader {
            child,
            stdout,
            finished: false,
        })
    } else {
        Box::new(File::open(path).map_err(open_err)?)
    };

    Ok(BufReader::new(inner))
}

/// Reads the stdout of a decompression process. When the stream ends, the process is reaped and
/// a non-zero exit is reported as a read error, so a truncated archive never looks like a clean
/// end of input.
struct ChildReader {
    child: Child,
    stdout: ChildStdout,
    finished: bool,
}

impl Read for ChildReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stdout.read(buf)?;
        if n == 0 && !buf.is_empty() && !self.finished {
            self.finished = true;
            let status = self.child.wait()?;
            if !status.success() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{GZIP} exited with {status}"),
                ));
            }
        }
        Ok(n)
    }
}

impl Drop for ChildReader {
    fn drop(&mut self) {
        if !self.finished {
            // the stream was abandoned early, don't leave the process behind
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// A created output file. Plain paths are written directly, `.gz` paths are piped through
/// `gzip -c` into the file. Call `finish` to flush and reap the compressor; dropping an
/// unfinished `OutputFile` closes it on a best-effort basis.
pub struct OutputFile {
    path: PathBuf,
    writer: Option<BufWriter<Box<dyn Write>>>,
    child: Option<Child>,
}

impl OutputFile {
    /// Creates (truncating) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SeqError::Open` if the file cannot be created or the compressor cannot be started.
    pub fn create(path: &Path) -> Result<Self> {
        let open_err = |source| SeqError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(open_err)?;

        if is_gzipped(path) {
            let mut child = Command::new(GZIP)
                .arg("-c")
                .stdin(Stdio::piped())
                .stdout(Stdio::from(file))
                .spawn()
                .map_err(open_err)?;

            let stdin = child.stdin.take().ok_or_else(|| {
                open_err(io::Error::new(io::ErrorKind::Other, "no stdin for gzip"))
            })?;

            debug!("Compressing {} through {GZIP}", path.display());
            Ok(OutputFile {
                path: path.to_path_buf(),
                writer: Some(BufWriter::new(Box::new(stdin))),
                child: Some(child),
            })
        } else {
            Ok(OutputFile {
                path: path.to_path_buf(),
                writer: Some(BufWriter::new(Box::new(file))),
                child: None,
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes all buffered output and waits for the compressor, if any.
    ///
    /// # Errors
    ///
    /// Returns `SeqError::Write` if flushing fails or the compressor exits unsuccessfully.
    pub fn finish(mut self) -> Result<()> {
        self.close().map_err(|source| SeqError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            // dropping the writer closes the compressor's stdin
        }

        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            if !status.success() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{GZIP} exited with {status}"),
                ));
            }
        }
        Ok(())
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(w) => w.write(buf),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "output already closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Could not close {}: {e}", self.path.display());
        }
    }
}

/// Refuses to let an output overwrite one of the inputs.
///
/// # Errors
///
/// Returns `SeqError::Config` if both paths are the same, literally or after resolving links
/// (when both exist).
pub fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    let same = input == output
        || match (input.canonicalize(), output.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };

    if same {
        return Err(SeqError::Config(format!(
            "input and output files must be different (`{}`)",
            output.display()
        )));
    }
    Ok(())
}

/// Reads a single line into `buf`, stripping any trailing `\n` and `\r` characters.
/// Returns `Ok(false)` at end of input. A final line without a terminator still counts.
pub fn read_trimmed_line<R: BufRead + ?Sized>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
        buf.pop();
    }
    Ok(true)
}
