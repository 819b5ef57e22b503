//! Capability contract for concrete random sources.
//!
//! This crate decides *which* source to build and with what arguments; it
//! never produces entropy itself. Builders emit a [`SourceSpec`], the
//! validated constructor variant for one kind, and a [`SourceFactory`]
//! supplied by the caller turns it into a live [`EntropySource`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::kinds::RngKind;
use crate::params::ParameterMap;

/// A constructed random source.
///
/// Only [`fill_bytes`](EntropySource::fill_bytes) is required; the integer
/// helpers assemble big-endian words from it.
pub trait EntropySource: Send {
    /// Registry name of the kind this source was built as.
    fn kind_name(&self) -> &str;

    /// Fills `dest` with raw entropy.
    fn fill_bytes(&mut self, dest: &mut [u8]) -> io::Result<()>;

    /// Next 32-bit value.
    fn next_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Next 64-bit value.
    fn next_u64(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }
}

impl fmt::Debug for dyn EntropySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropySource")
            .field("kind", &self.kind_name())
            .finish_non_exhaustive()
    }
}

/// Constructs concrete sources from validated specs.
///
/// Construction may acquire resources (open a device, create a save file)
/// and fail with an I/O error; the dispatcher wraps such failures with the
/// parameters that caused them.
pub trait SourceFactory: Send + Sync {
    /// Opens the source described by `spec`.
    fn open(&self, spec: &SourceSpec) -> io::Result<Box<dyn EntropySource>>;
}

/// Device read by `DevRandomRNG`.
pub const DEV_RANDOM: &str = "/dev/random";
/// Device read by `DevURandomRNG`.
pub const DEV_URANDOM: &str = "/dev/urandom";

/// How a reading source retries a failed or short read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Further attempts after the first failure
    pub attempts: u32,
    /// Pause between attempts, in milliseconds
    pub wait_ms: u64,
}

impl RetryPolicy {
    /// Pause between attempts.
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

/// Validated constructor arguments for one kind.
///
/// `None` fields were absent from the parameter map; the variant plus the
/// set of `Some` fields identifies the constructor overload selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Bytes from a named device
    DeviceReader {
        /// Device path
        device: PathBuf,
        /// Copy of every byte drawn
        save: Option<PathBuf>,
        /// Leading bytes to drop
        discard: Option<u32>,
        /// Read retry policy
        retry: Option<RetryPolicy>,
    },
    /// Bytes from [`DEV_RANDOM`]
    DevRandom {
        /// Copy of every byte drawn
        save: Option<PathBuf>,
        /// Read retry policy
        retry: Option<RetryPolicy>,
    },
    /// Bytes from [`DEV_URANDOM`]
    DevURandom {
        /// Copy of every byte drawn
        save: Option<PathBuf>,
        /// Read retry policy
        retry: Option<RetryPolicy>,
    },
    /// 48-bit LCG
    DRand {
        /// 32-bit seed
        seed: u32,
        /// Leading bytes to drop
        discard: Option<u32>,
    },
    /// Bytes from a named file
    File {
        /// File path
        file: PathBuf,
        /// Leading bytes to drop
        discard: Option<u32>,
        /// Read retry policy
        retry: Option<RetryPolicy>,
    },
    /// General purpose seeded generator
    Java {
        /// 64-bit seed
        seed: u64,
        /// Leading bytes to drop
        discard: Option<u32>,
    },
    /// Cryptographically strong seeded generator
    JavaSecure {
        /// 64-bit seed
        seed: u64,
        /// Leading bytes to drop
        discard: Option<u32>,
    },
    /// Mersenne Twister
    Mt {
        /// 32-bit seed
        seed: u32,
        /// Leading bytes to drop
        discard: Option<u32>,
    },
    /// Bytes fetched from random.org
    RandomOrg {
        /// Copy of every byte fetched
        save: Option<PathBuf>,
        /// Bytes per request
        chunk: Option<u32>,
    },
    /// A kind registered outside the standard nine; the factory interprets
    /// the parameters itself.
    Custom {
        /// Registered kind name
        kind: String,
        /// Parameters as supplied
        params: ParameterMap,
    },
}

impl SourceSpec {
    /// Standard kind of this spec, `None` for [`SourceSpec::Custom`].
    pub fn kind(&self) -> Option<RngKind> {
        Some(match self {
            SourceSpec::DeviceReader { .. } => RngKind::DeviceReader,
            SourceSpec::DevRandom { .. } => RngKind::DevRandom,
            SourceSpec::DevURandom { .. } => RngKind::DevURandom,
            SourceSpec::DRand { .. } => RngKind::DRand,
            SourceSpec::File { .. } => RngKind::File,
            SourceSpec::Java { .. } => RngKind::Java,
            SourceSpec::JavaSecure { .. } => RngKind::JavaSecure,
            SourceSpec::Mt { .. } => RngKind::Mt,
            SourceSpec::RandomOrg { .. } => RngKind::RandomOrg,
            SourceSpec::Custom { .. } => return None,
        })
    }

    /// Registry name of the kind.
    pub fn kind_name(&self) -> &str {
        match self {
            SourceSpec::Custom { kind, .. } => kind,
            other => other.kind().map_or("", RngKind::name),
        }
    }

    /// Device the source reads, for the device-reading kinds.
    pub fn device(&self) -> Option<&Path> {
        match self {
            SourceSpec::DeviceReader { device, .. } => Some(device.as_path()),
            SourceSpec::DevRandom { .. } => Some(Path::new(DEV_RANDOM)),
            SourceSpec::DevURandom { .. } => Some(Path::new(DEV_URANDOM)),
            _ => None,
        }
    }

    /// Leading bytes to drop, for kinds that accept `discard`.
    pub fn discard(&self) -> Option<u32> {
        match self {
            SourceSpec::DeviceReader { discard, .. }
            | SourceSpec::DRand { discard, .. }
            | SourceSpec::File { discard, .. }
            | SourceSpec::Java { discard, .. }
            | SourceSpec::JavaSecure { discard, .. }
            | SourceSpec::Mt { discard, .. } => *discard,
            _ => None,
        }
    }
}

struct Field(&'static str, String);

fn push_retry(fields: &mut Vec<Field>, retry: &Option<RetryPolicy>) {
    if let Some(r) = retry {
        fields.push(Field("retry", r.attempts.to_string()));
        fields.push(Field("wait", r.wait_ms.to_string()));
    }
}

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Describes the spec with the parameter values that produced it, e.g.
/// `DeviceReaderRNG with device = "/dev/x", discard = 2`.
impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();

        match self {
            SourceSpec::DeviceReader { device, save, discard, retry } => {
                fields.push(Field("device", quoted(device)));
                if let Some(s) = save {
                    fields.push(Field("save", quoted(s)));
                }
                if let Some(d) = discard {
                    fields.push(Field("discard", d.to_string()));
                }
                push_retry(&mut fields, retry);
            }
            SourceSpec::DevRandom { save, retry } | SourceSpec::DevURandom { save, retry } => {
                if let Some(device) = self.device() {
                    fields.push(Field("device", quoted(device)));
                }
                if let Some(s) = save {
                    fields.push(Field("save", quoted(s)));
                }
                push_retry(&mut fields, retry);
            }
            SourceSpec::File { file, discard, retry } => {
                fields.push(Field("file", quoted(file)));
                if let Some(d) = discard {
                    fields.push(Field("discard", d.to_string()));
                }
                push_retry(&mut fields, retry);
            }
            SourceSpec::DRand { seed, discard } | SourceSpec::Mt { seed, discard } => {
                fields.push(Field("seed", seed.to_string()));
                if let Some(d) = discard {
                    fields.push(Field("discard", d.to_string()));
                }
            }
            SourceSpec::Java { seed, discard } | SourceSpec::JavaSecure { seed, discard } => {
                fields.push(Field("seed", seed.to_string()));
                if let Some(d) = discard {
                    fields.push(Field("discard", d.to_string()));
                }
            }
            SourceSpec::RandomOrg { save, chunk } => {
                if let Some(s) = save {
                    fields.push(Field("save", quoted(s)));
                }
                if let Some(c) = chunk {
                    fields.push(Field("chunk", c.to_string()));
                }
            }
            SourceSpec::Custom { kind, params } => {
                return if params.is_empty() {
                    f.write_str(kind)
                } else {
                    write!(f, "{} with {}", kind, params)
                };
            }
        }

        f.write_str(self.kind_name())?;
        for (i, Field(name, value)) in fields.iter().enumerate() {
            f.write_str(if i == 0 { " with " } else { ", " })?;
            write!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_supplied_values() {
        let spec = SourceSpec::DeviceReader {
            device: PathBuf::from("/dev/x"),
            save: None,
            discard: Some(2),
            retry: Some(RetryPolicy { attempts: 3, wait_ms: 10 }),
        };
        assert_eq!(
            spec.to_string(),
            "DeviceReaderRNG with device = \"/dev/x\", discard = 2, retry = 3, wait = 10"
        );
        assert_eq!(spec.discard(), Some(2));
    }

    #[test]
    fn test_display_without_fields() {
        let spec = SourceSpec::RandomOrg { save: None, chunk: None };
        assert_eq!(spec.to_string(), "RandomOrgRNG");
        assert_eq!(spec.device(), None);
    }

    #[test]
    fn test_display_names_fixed_devices() {
        let spec = SourceSpec::DevURandom { save: None, retry: None };
        assert_eq!(spec.to_string(), "DevURandomRNG with device = \"/dev/urandom\"");
        assert_eq!(spec.kind(), Some(RngKind::DevURandom));

        let spec = SourceSpec::DevRandom {
            save: Some(PathBuf::from("/tmp/s")),
            retry: Some(RetryPolicy { attempts: 1, wait_ms: 5 }),
        };
        assert_eq!(
            spec.to_string(),
            "DevRandomRNG with device = \"/dev/random\", save = \"/tmp/s\", retry = 1, wait = 5"
        );
        assert_eq!(spec.device(), Some(Path::new(DEV_RANDOM)));
    }

    #[test]
    fn test_custom_kind_name() {
        let spec = SourceSpec::Custom {
            kind: "ZeroRNG".to_string(),
            params: ParameterMap::parse("width=8").unwrap(),
        };
        assert_eq!(spec.kind(), None);
        assert_eq!(spec.kind_name(), "ZeroRNG");
        assert_eq!(spec.to_string(), "ZeroRNG with width=8");
    }

    struct Counter(u8);

    impl EntropySource for Counter {
        fn kind_name(&self) -> &str {
            "Counter"
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) -> io::Result<()> {
            for b in dest {
                *b = self.0;
                self.0 = self.0.wrapping_add(1);
            }
            Ok(())
        }
    }

    #[test]
    fn test_integer_helpers_are_big_endian() {
        let mut src = Counter(1);
        assert_eq!(src.next_u32().unwrap(), 0x0102_0304);
        assert_eq!(src.next_u64().unwrap(), 0x0506_0708_090A_0B0C);
    }
}
