//! The shared, per-process generator.
//!
//! A run uses exactly one generator, built lazily the first time it is
//! asked for and never rebuilt. [`GlobalRng`] holds that generator behind a
//! mutex so concurrent first callers construct it once; tests create their
//! own `GlobalRng` with an injected configuration. The process-wide
//! instance is set with [`install`] and read with [`shared`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::info;

use crate::error::Result;
use crate::registry::RngFactory;
use crate::settings::ConfigSource;
use crate::source::EntropySource;

/// Handle to the shared generator.
pub type SharedRng = Arc<Mutex<Box<dyn EntropySource>>>;

/// Construct-once holder for the shared generator.
pub struct GlobalRng {
    factory: RngFactory,
    config: Arc<dyn ConfigSource>,
    instance: Mutex<Option<SharedRng>>,
}

impl GlobalRng {
    /// Creates an empty holder that will build from `config` through
    /// `factory`.
    pub fn new(factory: RngFactory, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            factory,
            config,
            instance: Mutex::new(None),
        }
    }

    /// Returns the shared generator, building it on first call.
    ///
    /// Later calls return the same instance even if the configuration has
    /// changed since. A failed build stores nothing, so the next call tries
    /// again.
    pub fn get_shared(&self) -> Result<SharedRng> {
        let mut slot = lock(&self.instance);
        if let Some(rng) = slot.as_ref() {
            return Ok(Arc::clone(rng));
        }

        let source = self.factory.resolve_configured(self.config.as_ref())?;
        info!(kind = source.kind_name(), "shared generator initialised");
        let rng: SharedRng = Arc::new(Mutex::new(source));
        *slot = Some(Arc::clone(&rng));
        Ok(rng)
    }

    /// Whether the generator has been built.
    pub fn is_initialised(&self) -> bool {
        lock(&self.instance).is_some()
    }

    /// The dispatcher used to build the generator.
    pub fn factory(&self) -> &RngFactory {
        &self.factory
    }
}

impl fmt::Debug for GlobalRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalRng")
            .field("factory", &self.factory)
            .field("initialised", &self.is_initialised())
            .finish_non_exhaustive()
    }
}

// A panic while building leaves the slot empty, so a poisoned lock is
// still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

static PROCESS_RNG: OnceLock<GlobalRng> = OnceLock::new();

/// Installs the process-wide holder. Returns it back if one is already
/// installed.
pub fn install(holder: GlobalRng) -> std::result::Result<(), GlobalRng> {
    PROCESS_RNG.set(holder)
}

/// The process-wide shared generator.
///
/// # Panics
///
/// If [`install`] has not been called.
pub fn shared() -> Result<SharedRng> {
    match PROCESS_RNG.get() {
        Some(holder) => holder.get_shared(),
        None => panic!("global RNG requested before rng_factory::install"),
    }
}
