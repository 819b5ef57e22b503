//! Byte-stream sources: devices and files.
//!
//! [`ReaderSource`] serves entropy straight from a readable stream. A read
//! that fails or runs short is retried according to the configured
//! [`RetryPolicy`]; without one the first failure is returned. With a save
//! file, every byte handed out is also appended there, so a run fed from a
//! device can later be replayed with `FileRNG`.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;

use rng_factory::{EntropySource, RetryPolicy, RngKind};
use tracing::{debug, warn};

/// Entropy read from a byte stream.
pub struct ReaderSource<R> {
    kind: RngKind,
    path: PathBuf,
    reader: R,
    retry: Option<RetryPolicy>,
    save: Option<BufWriter<File>>,
}

impl ReaderSource<File> {
    /// Opens `path` for reading and, if given, creates the save file.
    ///
    /// `discard` leading bytes are read and dropped before the source is
    /// returned; they are not saved.
    pub fn open(
        kind: RngKind,
        path: &Path,
        save: Option<&Path>,
        discard: Option<u32>,
        retry: Option<RetryPolicy>,
    ) -> io::Result<Self> {
        let reader = File::open(path)?;
        let mut source = Self::from_reader(kind, path, reader, retry);
        if let Some(n) = discard {
            source.discard(n)?;
        }
        if let Some(save) = save {
            source.save = Some(BufWriter::new(File::create(save)?));
        }
        debug!(kind = kind.name(), path = %path.display(), "reader opened");
        Ok(source)
    }
}

impl<R: Read> ReaderSource<R> {
    /// Wraps an already-open reader.
    pub fn from_reader(kind: RngKind, path: &Path, reader: R, retry: Option<RetryPolicy>) -> Self {
        Self {
            kind,
            path: path.to_path_buf(),
            reader,
            retry,
            save: None,
        }
    }

    /// Path the source reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn discard(&mut self, count: u32) -> io::Result<()> {
        let mut scratch = [0u8; 256];
        let mut remaining = count as usize;
        while remaining > 0 {
            let n = remaining.min(scratch.len());
            self.read_with_retry(&mut scratch[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    /// Fills `dest` completely, retrying short or failed reads.
    fn read_with_retry(&mut self, dest: &mut [u8]) -> io::Result<()> {
        let mut filled = 0;
        let mut retries_left = self.retry.map_or(0, |r| r.attempts);

        while filled < dest.len() {
            let failure = match self.reader.read(&mut dest[filled..]) {
                Ok(0) => io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("{} exhausted", self.path.display()),
                ),
                Ok(n) => {
                    filled += n;
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => e,
            };

            match self.retry {
                Some(policy) if retries_left > 0 => {
                    retries_left -= 1;
                    warn!(
                        kind = self.kind.name(),
                        path = %self.path.display(),
                        error = %failure,
                        retries_left,
                        "read failed, retrying"
                    );
                    thread::sleep(policy.wait());
                }
                _ => return Err(failure),
            }
        }
        Ok(())
    }
}

impl<R: Read + Send> EntropySource for ReaderSource<R> {
    fn kind_name(&self) -> &str {
        self.kind.name()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) -> io::Result<()> {
        self.read_with_retry(dest)?;
        if let Some(save) = self.save.as_mut() {
            save.write_all(dest)?;
            save.flush()?;
        }
        Ok(())
    }
}
