//! Per-kind builders.
//!
//! A builder checks a [`ParameterMap`] against its kind's [`KindSchema`],
//! parses integer-valued parameters strictly, resolves a seed where the
//! kind takes one, and returns the selected [`SourceSpec`]. Builders never
//! touch the filesystem; resource acquisition happens afterwards, in the
//! [`SourceFactory`](crate::SourceFactory).

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::kinds::{KindSchema, Param, RngKind, SeedWidth};
use crate::params::ParameterMap;
use crate::seed::SeedResolver;
use crate::source::{RetryPolicy, SourceSpec};

/// Signature shared by every registered builder.
pub type BuilderFn = fn(&ParameterMap, &SeedResolver) -> Result<SourceSpec>;

/// Builder for a standard kind.
pub fn standard_builder(kind: RngKind) -> BuilderFn {
    match kind {
        RngKind::DeviceReader => device_reader,
        RngKind::DevRandom => dev_random,
        RngKind::DevURandom => dev_urandom,
        RngKind::DRand => drand,
        RngKind::File => file,
        RngKind::Java => java,
        RngKind::JavaSecure => java_secure,
        RngKind::Mt => mt,
        RngKind::RandomOrg => random_org,
    }
}

/// `DeviceReaderRNG`: `device` required; `save`, `discard`, `retry`+`wait`.
pub fn device_reader(params: &ParameterMap, _: &SeedResolver) -> Result<SourceSpec> {
    let schema = RngKind::DeviceReader.schema();
    schema.validate(params)?;
    Ok(SourceSpec::DeviceReader {
        device: required_path(schema, params, Param::Device)?,
        save: path(params, Param::Save),
        discard: parse_u32(schema, params, Param::Discard)?,
        retry: retry(schema, params)?,
    })
}

/// `DevRandomRNG`: `save`, `retry`+`wait`.
pub fn dev_random(params: &ParameterMap, _: &SeedResolver) -> Result<SourceSpec> {
    let schema = RngKind::DevRandom.schema();
    schema.validate(params)?;
    Ok(SourceSpec::DevRandom {
        save: path(params, Param::Save),
        retry: retry(schema, params)?,
    })
}

/// `DevURandomRNG`: `save`, `retry`+`wait`.
pub fn dev_urandom(params: &ParameterMap, _: &SeedResolver) -> Result<SourceSpec> {
    let schema = RngKind::DevURandom.schema();
    schema.validate(params)?;
    Ok(SourceSpec::DevURandom {
        save: path(params, Param::Save),
        retry: retry(schema, params)?,
    })
}

/// `FileRNG`: `file` required; `discard`, `retry`+`wait`.
pub fn file(params: &ParameterMap, _: &SeedResolver) -> Result<SourceSpec> {
    let schema = RngKind::File.schema();
    schema.validate(params)?;
    Ok(SourceSpec::File {
        file: required_path(schema, params, Param::File)?,
        discard: parse_u32(schema, params, Param::Discard)?,
        retry: retry(schema, params)?,
    })
}

/// `DRandRNG`: `discard`; 32-bit seed.
pub fn drand(params: &ParameterMap, seeds: &SeedResolver) -> Result<SourceSpec> {
    let (seed, discard) = seeded(RngKind::DRand.schema(), params, seeds)?;
    Ok(SourceSpec::DRand {
        seed: seed as u32,
        discard,
    })
}

/// `MTRNG`: `discard`; 32-bit seed.
pub fn mt(params: &ParameterMap, seeds: &SeedResolver) -> Result<SourceSpec> {
    let (seed, discard) = seeded(RngKind::Mt.schema(), params, seeds)?;
    Ok(SourceSpec::Mt {
        seed: seed as u32,
        discard,
    })
}

/// `JavaRNG`: `discard`; 64-bit seed.
pub fn java(params: &ParameterMap, seeds: &SeedResolver) -> Result<SourceSpec> {
    let (seed, discard) = seeded(RngKind::Java.schema(), params, seeds)?;
    Ok(SourceSpec::Java { seed, discard })
}

/// `JavaSecureRNG`: `discard`; 64-bit seed.
pub fn java_secure(params: &ParameterMap, seeds: &SeedResolver) -> Result<SourceSpec> {
    let (seed, discard) = seeded(RngKind::JavaSecure.schema(), params, seeds)?;
    Ok(SourceSpec::JavaSecure { seed, discard })
}

/// Largest `chunk` random.org serves in one request.
pub const MAX_CHUNK: u32 = 16_384;

/// `RandomOrgRNG`: `save`, `chunk` (1 to [`MAX_CHUNK`] bytes).
pub fn random_org(params: &ParameterMap, _: &SeedResolver) -> Result<SourceSpec> {
    let schema = RngKind::RandomOrg.schema();
    schema.validate(params)?;
    let chunk = parse_u32(schema, params, Param::Chunk)?;
    if let Some(n) = chunk.filter(|n| !(1..=MAX_CHUNK).contains(n)) {
        return Err(invalid(
            schema,
            Param::Chunk,
            &n.to_string(),
            "integer between 1 and 16384",
        ));
    }
    Ok(SourceSpec::RandomOrg {
        save: path(params, Param::Save),
        chunk,
    })
}

fn seeded(
    schema: &KindSchema,
    params: &ParameterMap,
    seeds: &SeedResolver,
) -> Result<(u64, Option<u32>)> {
    schema.validate(params)?;
    let discard = parse_u32(schema, params, Param::Discard)?;
    let width = schema.seed_width.unwrap_or(SeedWidth::Long);
    let seed = seeds.resolve(params, width)?;
    Ok((seed, discard))
}

fn path(params: &ParameterMap, param: Param) -> Option<PathBuf> {
    params.get(param.name()).map(PathBuf::from)
}

fn required_path(schema: &KindSchema, params: &ParameterMap, param: Param) -> Result<PathBuf> {
    path(params, param).ok_or_else(|| ConfigError::MissingParameter {
        kind: schema.name.to_string(),
        param,
    })
}

fn invalid(schema: &KindSchema, param: Param, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidInteger {
        operation: format!("initialising {}", schema.name),
        param,
        value: value.to_string(),
        expected,
    }
}

fn parse_u32(schema: &KindSchema, params: &ParameterMap, param: Param) -> Result<Option<u32>> {
    params
        .get(param.name())
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| invalid(schema, param, raw, "unsigned 32-bit integer"))
        })
        .transpose()
}

fn parse_u64(schema: &KindSchema, params: &ParameterMap, param: Param) -> Result<Option<u64>> {
    params
        .get(param.name())
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|_| invalid(schema, param, raw, "unsigned 64-bit integer"))
        })
        .transpose()
}

fn retry(schema: &KindSchema, params: &ParameterMap) -> Result<Option<RetryPolicy>> {
    let attempts = parse_u32(schema, params, Param::Retry)?;
    let wait_ms = parse_u64(schema, params, Param::Wait)?;
    Ok(attempts
        .zip(wait_ms)
        .map(|(attempts, wait_ms)| RetryPolicy { attempts, wait_ms }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedTable;
    use std::sync::Arc;

    struct FixedTable;

    impl SeedTable for FixedTable {
        fn seed_at(&self, row: u32, _col: u32) -> u32 {
            row + 100
        }
    }

    fn seeds() -> SeedResolver {
        SeedResolver::new(Arc::new(FixedTable))
    }

    fn build(kind: RngKind, s: &str) -> Result<SourceSpec> {
        standard_builder(kind)(&ParameterMap::parse(s).unwrap(), &seeds())
    }

    #[test]
    fn test_device_reader_four_argument_variant() {
        let spec = build(
            RngKind::DeviceReader,
            "device=/dev/x,discard=2,retry=3,wait=10",
        )
        .unwrap();
        assert_eq!(
            spec,
            SourceSpec::DeviceReader {
                device: PathBuf::from("/dev/x"),
                save: None,
                discard: Some(2),
                retry: Some(RetryPolicy { attempts: 3, wait_ms: 10 }),
            }
        );
    }

    #[test]
    fn test_device_reader_missing_wait() {
        let err = build(RngKind::DeviceReader, "device=/dev/x,retry=3").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCounterpart { missing: Param::Wait, .. }
        ));
    }

    #[test]
    fn test_device_reader_requires_device() {
        let err = build(RngKind::DeviceReader, "save=/tmp/s,discard=1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingParameter { param: Param::Device, .. }
        ));
    }

    #[test]
    fn test_device_reader_with_save() {
        let spec = build(RngKind::DeviceReader, "device=/dev/x,save=/tmp/s").unwrap();
        assert_eq!(
            spec,
            SourceSpec::DeviceReader {
                device: PathBuf::from("/dev/x"),
                save: Some(PathBuf::from("/tmp/s")),
                discard: None,
                retry: None,
            }
        );
    }

    #[test]
    fn test_bad_discard_names_value() {
        let err = build(RngKind::DeviceReader, "device=/dev/x,discard=lots").unwrap_err();
        match err {
            ConfigError::InvalidInteger { operation, param, value, .. } => {
                assert_eq!(operation, "initialising DeviceReaderRNG");
                assert_eq!(param, Param::Discard);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_wait_rejected() {
        let err = build(RngKind::File, "file=/tmp/f,retry=3,wait=-10").unwrap_err();
        assert_eq!(err.parameter(), Some(Param::Wait));
    }

    #[test]
    fn test_dev_random_variants() {
        assert_eq!(
            build(RngKind::DevRandom, "").unwrap(),
            SourceSpec::DevRandom { save: None, retry: None }
        );
        assert_eq!(
            build(RngKind::DevURandom, "save=/tmp/s,retry=1,wait=5").unwrap(),
            SourceSpec::DevURandom {
                save: Some(PathBuf::from("/tmp/s")),
                retry: Some(RetryPolicy { attempts: 1, wait_ms: 5 }),
            }
        );
        assert!(build(RngKind::DevURandom, "wait=5").is_err());
    }

    #[test]
    fn test_file_requires_file() {
        let err = build(RngKind::File, "discard=3").unwrap_err();
        assert!(err.to_string().contains("FileRNG requires the file parameter"));
    }

    #[test]
    fn test_seeded_kinds() {
        assert_eq!(
            build(RngKind::Mt, "seed=42,discard=8").unwrap(),
            SourceSpec::Mt { seed: 42, discard: Some(8) }
        );
        assert_eq!(
            build(RngKind::DRand, "table=1:0").unwrap(),
            SourceSpec::DRand { seed: 101, discard: None }
        );
        assert_eq!(
            build(RngKind::Java, "table=1:0").unwrap(),
            SourceSpec::Java { seed: (101 << 32) | 102, discard: None }
        );
        assert_eq!(
            build(RngKind::JavaSecure, "7").unwrap(),
            SourceSpec::JavaSecure { seed: 7, discard: None }
        );
    }

    #[test]
    fn test_seeded_bad_discard_before_seed() {
        let err = build(RngKind::Mt, "seed=nope,discard=x").unwrap_err();
        assert_eq!(err.parameter(), Some(Param::Discard));
    }

    #[test]
    fn test_random_org_variants() {
        assert_eq!(
            build(RngKind::RandomOrg, "chunk=256,save=/tmp/r").unwrap(),
            SourceSpec::RandomOrg {
                save: Some(PathBuf::from("/tmp/r")),
                chunk: Some(256),
            }
        );
        let err = build(RngKind::RandomOrg, "chunk=big").unwrap_err();
        assert_eq!(err.parameter(), Some(Param::Chunk));
    }

    #[test]
    fn test_random_org_chunk_range() {
        for bad in ["chunk=0", "chunk=16385"] {
            let err = build(RngKind::RandomOrg, bad).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidInteger { param: Param::Chunk, .. }),
                "{bad} gave {err}"
            );
        }
        assert_eq!(
            build(RngKind::RandomOrg, "chunk=16384").unwrap(),
            SourceSpec::RandomOrg {
                save: None,
                chunk: Some(MAX_CHUNK),
            }
        );
    }
}
