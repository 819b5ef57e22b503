//! # rng_factory: Configuration-Driven RNG Resolution
//!
//! Turns a kind name and a compact parameter string (for example
//! `DeviceReaderRNG` with `device=/dev/zero,discard=4`) into a constructed
//! random source, and decides the seed when the user gives none.
//!
//! ## Pipeline
//!
//! 1. [`ParameterMap::parse`] splits the parameter string.
//! 2. [`RngFactory`] looks the kind up in its [`Registry`].
//! 3. The kind's builder validates the parameters against its
//!    [`KindSchema`] and resolves a seed through [`SeedResolver`].
//! 4. The resulting [`SourceSpec`] is opened by the caller's
//!    [`SourceFactory`].
//! 5. [`GlobalRng`] keeps the one shared generator for the run.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::io;
//! use std::sync::Arc;
//! use rng_factory::{
//!     EntropySource, ParameterMap, RetryPolicy, RngFactory, SeedTable, SourceFactory,
//!     SourceSpec,
//! };
//!
//! struct Table;
//! impl SeedTable for Table {
//!     fn seed_at(&self, row: u32, col: u32) -> u32 { row ^ col }
//! }
//!
//! struct Unavailable;
//! impl SourceFactory for Unavailable {
//!     fn open(&self, _: &SourceSpec) -> io::Result<Box<dyn EntropySource>> {
//!         Err(io::ErrorKind::NotFound.into())
//!     }
//! }
//!
//! let factory = RngFactory::new(Arc::new(Table), Arc::new(Unavailable));
//! let params = ParameterMap::parse("device=/dev/x,discard=2,retry=3,wait=10").unwrap();
//! let spec = factory.plan(Some("DeviceReaderRNG"), Some(&params)).unwrap();
//! assert_eq!(spec.discard(), Some(2));
//! assert!(matches!(
//!     spec,
//!     SourceSpec::DeviceReader { retry: Some(RetryPolicy { attempts: 3, wait_ms: 10 }), .. }
//! ));
//!
//! // Construction failures carry the parameters that caused them
//! let err = factory.resolve(Some("DeviceReaderRNG"), Some(&params)).unwrap_err();
//! assert!(err.to_string().contains("/dev/x"));
//! ```
//!
//! ## Errors
//!
//! Everything attributable to user input is a [`ConfigError`]. Registry
//! defects (a name registered twice, a builder producing another kind's
//! spec) panic.

pub mod builders;
pub mod error;
pub mod global;
pub mod kinds;
pub mod params;
pub mod registry;
pub mod seed;
pub mod settings;
pub mod source;

pub use builders::BuilderFn;
pub use error::{ConfigError, Result};
pub use global::{install, shared, GlobalRng, SharedRng};
pub use kinds::{KindSchema, Param, ParamSet, RngKind, SeedWidth, DEFAULT_KIND};
pub use params::ParameterMap;
pub use registry::{Registry, RngFactory};
pub use seed::{time_int_seed, time_long_seed, SeedResolver, SeedSpec, SeedTable};
pub use settings::{CliOverrides, ConfigSource, LogLevel, RngSettings, SettingsError};
pub use source::{
    EntropySource, RetryPolicy, SourceFactory, SourceSpec, DEV_RANDOM, DEV_URANDOM,
};
