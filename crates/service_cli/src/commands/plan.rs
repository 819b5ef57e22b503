//! Plan command implementation
//!
//! Validates the configured kind and parameters and prints the source that
//! would be built, without opening it.

use std::io::Write;

use rng_factory::{ConfigSource, RngFactory};
use tracing::info;

use crate::{CliError, Result};

/// Run the plan command
pub fn run(factory: &RngFactory, config: &dyn ConfigSource, out: &mut impl Write) -> Result<()> {
    let params = config.parameters()?;
    let kind = config.kind_name();
    let spec = factory.plan(kind.as_deref(), Some(&params))?;
    info!(kind = spec.kind_name(), "configuration is valid");
    writeln!(out, "{spec}").map_err(CliError::Output)
}
