//! Builder registry and dispatcher.
//!
//! Kind names map to plain builder functions, registered up front. Looking
//! up a name that was never registered is a user error
//! ([`ConfigError::UnknownKind`]); a registry that contradicts itself is a
//! program defect and panics.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::builders::{standard_builder, BuilderFn};
use crate::error::{ConfigError, Result};
use crate::kinds::{RngKind, DEFAULT_KIND};
use crate::params::ParameterMap;
use crate::seed::{SeedResolver, SeedTable};
use crate::settings::ConfigSource;
use crate::source::{EntropySource, SourceFactory, SourceSpec};

/// Mapping from case-sensitive kind name to builder.
#[derive(Clone, Default)]
pub struct Registry {
    builders: HashMap<String, BuilderFn>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the nine standard kinds.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in RngKind::ALL {
            registry.register(kind.name(), standard_builder(kind));
        }
        registry
    }

    /// Registers `builder` under `name`.
    ///
    /// # Panics
    ///
    /// If `name` is already registered.
    pub fn register(&mut self, name: &str, builder: BuilderFn) -> &mut Self {
        if self.builders.insert(name.to_string(), builder).is_some() {
            panic!("RNG kind {name} registered twice");
        }
        self
    }

    /// Builder registered under `name`.
    pub fn get(&self, name: &str) -> Option<BuilderFn> {
        self.builders.get(name).copied()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.names())
            .finish()
    }
}

/// Resolves kind names and parameters into constructed sources.
///
/// # Examples
/// ```
/// use std::io;
/// use std::sync::Arc;
/// use rng_factory::{EntropySource, RngFactory, SeedTable, SourceFactory, SourceSpec};
///
/// struct NoTable;
/// impl SeedTable for NoTable {
///     fn seed_at(&self, _: u32, _: u32) -> u32 { 0 }
/// }
///
/// struct NoSources;
/// impl SourceFactory for NoSources {
///     fn open(&self, _: &SourceSpec) -> io::Result<Box<dyn EntropySource>> {
///         Err(io::Error::new(io::ErrorKind::Unsupported, "no sources"))
///     }
/// }
///
/// let factory = RngFactory::new(Arc::new(NoTable), Arc::new(NoSources));
/// let spec = factory.plan(Some("MTRNG"), Some(&"42".parse().unwrap())).unwrap();
/// assert_eq!(spec, SourceSpec::Mt { seed: 42, discard: None });
///
/// let err = factory.plan(Some("NoSuchKind"), None).unwrap_err();
/// assert!(err.is_unknown_kind());
/// ```
#[derive(Clone)]
pub struct RngFactory {
    registry: Registry,
    seeds: SeedResolver,
    sources: Arc<dyn SourceFactory>,
    default_kind: String,
}

impl RngFactory {
    /// Dispatcher over the standard registry.
    pub fn new(table: Arc<dyn SeedTable>, sources: Arc<dyn SourceFactory>) -> Self {
        Self::with_registry(Registry::standard(), table, sources)
    }

    /// Dispatcher over a caller-supplied registry.
    pub fn with_registry(
        registry: Registry,
        table: Arc<dyn SeedTable>,
        sources: Arc<dyn SourceFactory>,
    ) -> Self {
        Self {
            registry,
            seeds: SeedResolver::new(table),
            sources,
            default_kind: DEFAULT_KIND.to_string(),
        }
    }

    /// Replaces the kind used when none is requested.
    pub fn with_default_kind(mut self, kind: impl Into<String>) -> Self {
        self.default_kind = kind.into();
        self
    }

    /// Kind used when none is requested.
    pub fn default_kind(&self) -> &str {
        &self.default_kind
    }

    /// The registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The seed resolver builders use.
    pub fn seeds(&self) -> &SeedResolver {
        &self.seeds
    }

    /// Validates the request and returns the selected constructor variant
    /// without acquiring any resource.
    pub fn plan(&self, kind: Option<&str>, params: Option<&ParameterMap>) -> Result<SourceSpec> {
        let kind = kind.unwrap_or(&self.default_kind);
        let empty = ParameterMap::new();
        let params = params.unwrap_or(&empty);

        let builder = self
            .registry
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownKind(kind.to_string()))?;

        info!(kind, parameters = %params, "dispatching");
        let spec = builder(params, &self.seeds)?;

        if spec.kind_name() != kind {
            panic!(
                "builder registered as {} produced a {} source",
                kind,
                spec.kind_name()
            );
        }
        Ok(spec)
    }

    /// Builds the source for `kind` (default kind when `None`) and
    /// `params` (empty when `None`).
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; resource failures are reported as
    /// [`ConfigError::Resource`] naming the parameters used.
    pub fn resolve(
        &self,
        kind: Option<&str>,
        params: Option<&ParameterMap>,
    ) -> Result<Box<dyn EntropySource>> {
        let spec = self.plan(kind, params)?;
        self.open(&spec)
    }

    /// Parses `params` and builds the source for `kind`.
    pub fn resolve_str(
        &self,
        kind: Option<&str>,
        params: Option<&str>,
    ) -> Result<Box<dyn EntropySource>> {
        let params = params.map(ParameterMap::parse).transpose()?;
        self.resolve(kind, params.as_ref())
    }

    /// Builds the source named by the ambient configuration.
    pub fn resolve_configured(&self, config: &dyn ConfigSource) -> Result<Box<dyn EntropySource>> {
        let kind = config.kind_name();
        let params = config.parameters()?;
        self.resolve(kind.as_deref(), Some(&params))
    }

    /// Opens a planned source.
    pub fn open(&self, spec: &SourceSpec) -> Result<Box<dyn EntropySource>> {
        let source = self.sources.open(spec).map_err(|source| ConfigError::Resource {
            context: format!("building {}", spec),
            source,
        })?;
        debug!(kind = spec.kind_name(), "source opened");
        Ok(source)
    }
}

impl fmt::Debug for RngFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RngFactory")
            .field("registry", &self.registry)
            .field("default_kind", &self.default_kind)
            .finish_non_exhaustive()
    }
}
