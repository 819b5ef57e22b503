//! Kinds command implementation
//!
//! Lists the registered kinds together with their parameter grammar.

use std::io::Write;

use rng_factory::{Param, ParamSet, RngFactory, RngKind, SeedWidth};

use crate::{CliError, Result};

/// Run the kinds command
pub fn run(factory: &RngFactory, out: &mut impl Write) -> Result<()> {
    for name in factory.registry().names() {
        let line = match name.parse::<RngKind>() {
            Ok(kind) => describe(kind, name == factory.default_kind()),
            Err(_) => name.to_string(),
        };
        writeln!(out, "{line}").map_err(CliError::Output)?;
    }
    Ok(())
}

fn describe(kind: RngKind, is_default: bool) -> String {
    let schema = kind.schema();
    let mut line = kind.name().to_string();
    if is_default {
        line.push_str(" (default)");
    }
    if !schema.required.is_empty() {
        line.push_str(&format!("\n    required: {}", ParamSet::of(schema.required)));
    }
    if !schema.optional.is_empty() {
        line.push_str(&format!("\n    optional: {}", ParamSet::of(schema.optional)));
    }
    if let Some(width) = schema.seed_width {
        let bits = match width {
            SeedWidth::Int => 32,
            SeedWidth::Long => 64,
        };
        line.push_str(&format!(
            "\n    seed: {} or {} ({bits}-bit)",
            Param::Seed,
            Param::Table
        ));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_all_standard_kinds() {
        let mut out = Vec::new();
        run(&rng_sources::standard_factory(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        for kind in RngKind::ALL {
            assert!(text.contains(kind.name()), "{kind}");
        }
        assert!(text.contains("MTRNG (default)"));
        assert!(text.contains("required: device"));
    }
}
