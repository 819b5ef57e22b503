//! Sample command implementation
//!
//! Draws values from the process-wide shared generator.

use std::io::Write;

use clap::ValueEnum;
use rng_factory::SharedRng;
use tracing::{debug, info};

use crate::{CliError, Result};

/// Output format of drawn values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Unsigned 32-bit decimal
    U32,
    /// Unsigned 64-bit decimal
    U64,
    /// Bytes as lowercase hex, one line per value
    Hex,
}

/// Run the sample command against the installed shared generator
pub fn run(count: usize, format: Format, out: &mut impl Write) -> Result<()> {
    let rng = rng_factory::shared()?;
    write_values(&rng, count, format, out)
}

/// Draws `count` values from `rng` and writes one per line.
pub fn write_values(
    rng: &SharedRng,
    count: usize,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let mut source = rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    info!(kind = source.kind_name(), count, ?format, "sampling");

    for _ in 0..count {
        let line = match format {
            Format::U32 => source.next_u32().map_err(CliError::Draw)?.to_string(),
            Format::U64 => source.next_u64().map_err(CliError::Draw)?.to_string(),
            Format::Hex => {
                let mut buf = [0u8; 8];
                source.fill_bytes(&mut buf).map_err(CliError::Draw)?;
                buf.iter().map(|b| format!("{b:02x}")).collect()
            }
        };
        writeln!(out, "{line}").map_err(CliError::Output)?;
    }
    debug!(count, "sample complete");
    Ok(())
}
