//! CLI command implementations
//!
//! Each submodule implements one subcommand and writes its output to the
//! writer it is given.

pub mod kinds;
pub mod plan;
pub mod sample;
