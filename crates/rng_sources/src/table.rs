//! Default seed table.

use rand::RngCore;
use rand_pcg::Pcg32;
use rng_factory::SeedTable;

/// Deterministic table of 32-bit seeds.
///
/// Entry `(row, col)` is the first output of a PCG generator whose state is
/// the row and whose stream is the column, so every coordinate gives a
/// fixed, well-mixed value without storing the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcgSeedTable;

impl SeedTable for PcgSeedTable {
    fn seed_at(&self, row: u32, col: u32) -> u32 {
        Pcg32::new(u64::from(row), u64::from(col)).next_u32()
    }
}
