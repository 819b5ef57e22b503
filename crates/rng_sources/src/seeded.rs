//! Seeded pseudo-random sources.
//!
//! The seeded kinds keep their configuration names, but the algorithms
//! come from the `rand` family:
//!
//! | Kind | Generator |
//! |---|---|
//! | `MTRNG` | `rand_pcg::Pcg32` |
//! | `DRandRNG` | `rand_pcg::Pcg64Mcg` |
//! | `JavaRNG` | `rand::rngs::StdRng` |
//! | `JavaSecureRNG` | `rand_chacha::ChaCha20Rng` |
//!
//! The same seed always reproduces the same byte stream.

use std::io;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_pcg::{Pcg32, Pcg64Mcg};
use rng_factory::{EntropySource, RngKind};

/// `MTRNG` source.
pub type MtSource = SeededSource<Pcg32>;
/// `DRandRNG` source.
pub type DRandSource = SeededSource<Pcg64Mcg>;
/// `JavaRNG` source.
pub type JavaSource = SeededSource<StdRng>;
/// `JavaSecureRNG` source.
pub type JavaSecureSource = SeededSource<ChaCha20Rng>;

/// A seeded generator exposed through the entropy contract.
///
/// # Examples
///
/// ```rust
/// use rng_factory::{EntropySource, RngKind};
/// use rng_sources::MtSource;
///
/// let mut a = MtSource::new(RngKind::Mt, 12345, None);
/// let mut b = MtSource::new(RngKind::Mt, 12345, None);
/// assert_eq!(a.next_u64().unwrap(), b.next_u64().unwrap());
/// assert_eq!(a.seed(), 12345);
/// ```
pub struct SeededSource<R> {
    kind: RngKind,
    inner: R,
    seed: u64,
}

impl<R: RngCore + SeedableRng> SeededSource<R> {
    /// Creates a source initialised with `seed`, dropping `discard` leading
    /// bytes.
    pub fn new(kind: RngKind, seed: u64, discard: Option<u32>) -> Self {
        let mut inner = R::seed_from_u64(seed);
        if let Some(n) = discard {
            skip_bytes(&mut inner, n);
        }
        Self { kind, inner, seed }
    }

    /// Seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

fn skip_bytes<R: RngCore>(rng: &mut R, count: u32) {
    let mut scratch = [0u8; 256];
    let mut remaining = count as usize;
    while remaining > 0 {
        let n = remaining.min(scratch.len());
        rng.fill_bytes(&mut scratch[..n]);
        remaining -= n;
    }
}

impl<R: RngCore + Send> EntropySource for SeededSource<R> {
    fn kind_name(&self) -> &str {
        self.kind.name()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) -> io::Result<()> {
        self.inner.fill_bytes(dest);
        Ok(())
    }
}
