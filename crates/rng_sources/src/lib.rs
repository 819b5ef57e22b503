//! # rng_sources: Default Random Sources
//!
//! Concrete implementations behind the `rng_factory` capability contract:
//!
//! - [`seeded`]: seeded generators for `MTRNG`, `DRandRNG`, `JavaRNG` and
//!   `JavaSecureRNG`
//! - [`reader`]: device and file readers with discard, retry and save
//! - [`random_org`]: bytes fetched from random.org
//! - [`table`]: the default seed table
//!
//! ## Usage Example
//!
//! ```rust
//! use rng_factory::{EntropySource, ParameterMap};
//! use rng_sources::standard_factory;
//!
//! let factory = standard_factory();
//! let params = ParameterMap::parse("seed=42,discard=16").unwrap();
//! let mut rng = factory.resolve(Some("MTRNG"), Some(&params)).unwrap();
//! let _value = rng.next_u32().unwrap();
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use rng_factory::{
    EntropySource, RngFactory, RngKind, SourceFactory, SourceSpec, DEV_RANDOM, DEV_URANDOM,
};

pub mod random_org;
pub mod reader;
pub mod seeded;
pub mod table;

pub use random_org::RandomOrgSource;
pub use reader::ReaderSource;
pub use seeded::{DRandSource, JavaSecureSource, JavaSource, MtSource, SeededSource};
pub use table::PcgSeedTable;

/// Opens every standard kind.
#[derive(Debug, Clone)]
pub struct DefaultSourceFactory {
    random_org_endpoint: String,
}

impl Default for DefaultSourceFactory {
    fn default() -> Self {
        Self {
            random_org_endpoint: random_org::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl DefaultSourceFactory {
    /// Factory using the public random.org endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory fetching `RandomOrgRNG` bytes from `endpoint` instead.
    pub fn with_random_org_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            random_org_endpoint: endpoint.into(),
        }
    }
}

impl SourceFactory for DefaultSourceFactory {
    fn open(&self, spec: &SourceSpec) -> io::Result<Box<dyn EntropySource>> {
        let source: Box<dyn EntropySource> = match spec {
            SourceSpec::DeviceReader { device, save, discard, retry } => Box::new(
                ReaderSource::open(RngKind::DeviceReader, device, save.as_deref(), *discard, *retry)?,
            ),
            SourceSpec::DevRandom { save, retry } => Box::new(ReaderSource::open(
                RngKind::DevRandom,
                Path::new(DEV_RANDOM),
                save.as_deref(),
                None,
                *retry,
            )?),
            SourceSpec::DevURandom { save, retry } => Box::new(ReaderSource::open(
                RngKind::DevURandom,
                Path::new(DEV_URANDOM),
                save.as_deref(),
                None,
                *retry,
            )?),
            SourceSpec::File { file, discard, retry } => Box::new(ReaderSource::open(
                RngKind::File,
                file,
                None,
                *discard,
                *retry,
            )?),
            SourceSpec::DRand { seed, discard } => {
                Box::new(DRandSource::new(RngKind::DRand, u64::from(*seed), *discard))
            }
            SourceSpec::Mt { seed, discard } => {
                Box::new(MtSource::new(RngKind::Mt, u64::from(*seed), *discard))
            }
            SourceSpec::Java { seed, discard } => {
                Box::new(JavaSource::new(RngKind::Java, *seed, *discard))
            }
            SourceSpec::JavaSecure { seed, discard } => {
                Box::new(JavaSecureSource::new(RngKind::JavaSecure, *seed, *discard))
            }
            SourceSpec::RandomOrg { save, chunk } => Box::new(RandomOrgSource::new(
                &self.random_org_endpoint,
                save.as_deref(),
                *chunk,
            )?),
            SourceSpec::Custom { kind, .. } => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("no default source for {kind}"),
                ))
            }
        };
        Ok(source)
    }
}

/// Dispatcher wired to the default table and sources.
pub fn standard_factory() -> RngFactory {
    RngFactory::new(Arc::new(PcgSeedTable), Arc::new(DefaultSourceFactory::new()))
}
