//! Entropy fetched from random.org.
//!
//! Bytes are requested in chunks over HTTPS and served from a local
//! buffer. Nothing is fetched until the first byte is needed, so building
//! the source only touches the filesystem (for the save file).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use rng_factory::{EntropySource, RngKind};
use tracing::debug;

/// Default endpoint returning raw bytes.
pub const DEFAULT_ENDPOINT: &str = "https://www.random.org/cgi-bin/randbyte";
/// Bytes per request when `chunk` is not given.
pub const DEFAULT_CHUNK: u32 = 1024;
/// Largest request random.org serves.
pub use rng_factory::builders::MAX_CHUNK;

/// Entropy source backed by random.org.
pub struct RandomOrgSource {
    client: Client,
    endpoint: String,
    chunk: u32,
    buffer: Vec<u8>,
    pos: usize,
    save: Option<BufWriter<File>>,
}

impl RandomOrgSource {
    /// Prepares a source requesting `chunk` bytes at a time from
    /// `endpoint`.
    pub fn new(endpoint: &str, save: Option<&Path>, chunk: Option<u32>) -> io::Result<Self> {
        let chunk = chunk.unwrap_or(DEFAULT_CHUNK);
        if chunk == 0 || chunk > MAX_CHUNK {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("chunk must be between 1 and {MAX_CHUNK} bytes, got {chunk}"),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("rng_sources/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(io::Error::other)?;
        let save = save.map(File::create).transpose()?.map(BufWriter::new);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            chunk,
            buffer: Vec::new(),
            pos: 0,
            save,
        })
    }

    /// Bytes per request.
    pub fn chunk(&self) -> u32 {
        self.chunk
    }

    fn refill(&mut self) -> io::Result<()> {
        debug!(endpoint = %self.endpoint, chunk = self.chunk, "fetching bytes from random.org");
        let url = format!("{}?nbytes={}&format=f", self.endpoint, self.chunk);
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(io::Error::other)?;
        let body = response.bytes().map_err(io::Error::other)?;
        if body.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "random.org returned no data",
            ));
        }
        self.buffer = body.to_vec();
        self.pos = 0;
        Ok(())
    }
}

impl EntropySource for RandomOrgSource {
    fn kind_name(&self) -> &str {
        RngKind::RandomOrg.name()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) -> io::Result<()> {
        let mut filled = 0;
        while filled < dest.len() {
            if self.pos == self.buffer.len() {
                self.refill()?;
            }
            let n = (dest.len() - filled).min(self.buffer.len() - self.pos);
            dest[filled..filled + n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
            self.pos += n;
            filled += n;
        }
        if let Some(save) = self.save.as_mut() {
            save.write_all(dest)?;
            save.flush()?;
        }
        Ok(())
    }
}
