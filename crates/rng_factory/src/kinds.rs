//! RNG kinds and their parameter grammar.
//!
//! Each kind accepts a different, overlapping subset of optional
//! parameters. Rather than encoding the legal combinations as nested
//! conditionals, every kind carries a [`KindSchema`] listing its required
//! parameters and the exact sets of optional parameters it accepts. A set
//! outside the table is rejected as a single lookup miss.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::params::ParameterMap;

/// Name of the kind used when none is configured.
pub const DEFAULT_KIND: &str = "MTRNG";

/// Parameter names understood by the standard kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    /// Device to read bytes from
    Device,
    /// File to read bytes from
    File,
    /// File to copy every byte drawn into
    Save,
    /// Leading bytes to drop
    Discard,
    /// Read retries before giving up
    Retry,
    /// Milliseconds between retries
    Wait,
    /// Explicit seed
    Seed,
    /// Seed table coordinates
    Table,
    /// Bytes per network request
    Chunk,
}

impl Param {
    /// All parameters, in bit order.
    pub const ALL: [Param; 9] = [
        Param::Device,
        Param::File,
        Param::Save,
        Param::Discard,
        Param::Retry,
        Param::Wait,
        Param::Seed,
        Param::Table,
        Param::Chunk,
    ];

    /// Name as it appears in a parameter string.
    pub fn name(self) -> &'static str {
        match self {
            Param::Device => "device",
            Param::File => "file",
            Param::Save => "save",
            Param::Discard => "discard",
            Param::Retry => "retry",
            Param::Wait => "wait",
            Param::Seed => "seed",
            Param::Table => "table",
            Param::Chunk => "chunk",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of parameters, used to compare presence against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParamSet(u16);

impl ParamSet {
    /// The empty set.
    pub const EMPTY: ParamSet = ParamSet(0);

    /// Builds a set from a slice of parameters.
    pub fn of(params: &[Param]) -> Self {
        params.iter().fold(Self::EMPTY, |set, p| set.with(*p))
    }

    /// This set plus `param`.
    pub fn with(self, param: Param) -> Self {
        ParamSet(self.0 | param.bit())
    }

    /// Whether `param` is in the set.
    pub fn contains(self, param: Param) -> bool {
        self.0 & param.bit() != 0
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members, in [`Param::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Param> {
        Param::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.name())?;
        }
        Ok(())
    }
}

/// Width of the seed a kind consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedWidth {
    /// 32-bit seed, masked to the low 32 bits
    Int,
    /// Full 64-bit seed
    Long,
}

/// The nine standard RNG kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RngKind {
    /// Reads bytes from a named device
    DeviceReader,
    /// Reads bytes from `/dev/random`
    DevRandom,
    /// Reads bytes from `/dev/urandom`
    DevURandom,
    /// 48-bit linear congruential generator, 32-bit seed
    DRand,
    /// Reads bytes from a named file
    File,
    /// General purpose generator, 64-bit seed
    Java,
    /// Cryptographically strong generator, 64-bit seed
    JavaSecure,
    /// Mersenne Twister, 32-bit seed
    Mt,
    /// Bytes fetched from random.org
    RandomOrg,
}

impl RngKind {
    /// All standard kinds.
    pub const ALL: [RngKind; 9] = [
        RngKind::DeviceReader,
        RngKind::DevRandom,
        RngKind::DevURandom,
        RngKind::DRand,
        RngKind::File,
        RngKind::Java,
        RngKind::JavaSecure,
        RngKind::Mt,
        RngKind::RandomOrg,
    ];

    /// Registry name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            RngKind::DeviceReader => "DeviceReaderRNG",
            RngKind::DevRandom => "DevRandomRNG",
            RngKind::DevURandom => "DevURandomRNG",
            RngKind::DRand => "DRandRNG",
            RngKind::File => "FileRNG",
            RngKind::Java => "JavaRNG",
            RngKind::JavaSecure => "JavaSecureRNG",
            RngKind::Mt => "MTRNG",
            RngKind::RandomOrg => "RandomOrgRNG",
        }
    }

    /// Parameter grammar of the kind.
    pub fn schema(self) -> &'static KindSchema {
        match self {
            RngKind::DeviceReader => &DEVICE_READER,
            RngKind::DevRandom => &DEV_RANDOM,
            RngKind::DevURandom => &DEV_URANDOM,
            RngKind::DRand => &DRAND,
            RngKind::File => &FILE,
            RngKind::Java => &JAVA,
            RngKind::JavaSecure => &JAVA_SECURE,
            RngKind::Mt => &MT,
            RngKind::RandomOrg => &RANDOM_ORG,
        }
    }
}

impl fmt::Display for RngKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RngKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        RngKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownKind(s.to_string()))
    }
}

/// Declarative parameter grammar for one kind.
///
/// `optional` lists the parameters whose joint presence is governed by
/// `combinations`; every other parameter in a map is ignored, apart from
/// `seed` and `table` for kinds with a `seed_width`.
#[derive(Debug)]
pub struct KindSchema {
    /// Kind name used in diagnostics
    pub name: &'static str,
    /// Parameters that must be present
    pub required: &'static [Param],
    /// Optional parameters governed by the combination table
    pub optional: &'static [Param],
    /// Accepted sets of present optional parameters
    pub combinations: &'static [&'static [Param]],
    /// Seed width, for kinds seeded through the seed resolver
    pub seed_width: Option<SeedWidth>,
}

const RETRY_PAIR: (Param, Param) = (Param::Retry, Param::Wait);

impl KindSchema {
    /// Checks presence of parameters in `params` against the grammar.
    ///
    /// Required parameters are checked first, then the `retry`/`wait`
    /// pairing, then the combination table. Returns the set of optional
    /// parameters present.
    pub fn validate(&self, params: &ParameterMap) -> Result<ParamSet> {
        for param in self.required {
            if !params.contains(param.name()) {
                return Err(ConfigError::MissingParameter {
                    kind: self.name.to_string(),
                    param: *param,
                });
            }
        }

        let present = self
            .optional
            .iter()
            .filter(|p| params.contains(p.name()))
            .fold(ParamSet::EMPTY, |set, p| set.with(*p));

        let (retry, wait) = RETRY_PAIR;
        if self.optional.contains(&retry) && present.contains(retry) != present.contains(wait) {
            let (given, missing, expected) = if present.contains(retry) {
                (retry, wait, "unsigned integer (milliseconds)")
            } else {
                (wait, retry, "unsigned integer (attempts)")
            };
            return Err(ConfigError::MissingCounterpart {
                kind: self.name.to_string(),
                present: given,
                missing,
                expected,
            });
        }

        if !self
            .combinations
            .iter()
            .any(|combo| ParamSet::of(combo) == present)
        {
            return Err(ConfigError::IllegalCombination {
                kind: self.name.to_string(),
                given: present.to_string(),
            });
        }

        for (name, _) in params.iter() {
            if !self.recognises(name) {
                debug!(kind = self.name, parameter = name, "ignoring unrecognised parameter");
            }
        }

        Ok(present)
    }

    fn recognises(&self, name: &str) -> bool {
        let seeded = self.seed_width.is_some()
            && (name == Param::Seed.name() || name == Param::Table.name());
        seeded
            || self
                .required
                .iter()
                .chain(self.optional)
                .any(|p| p.name() == name)
    }
}

use Param::{Chunk, Device, Discard, Retry, Save, Wait};

static DEVICE_READER: KindSchema = KindSchema {
    name: "DeviceReaderRNG",
    required: &[Device],
    optional: &[Save, Discard, Retry, Wait],
    combinations: &[
        &[],
        &[Discard],
        &[Retry, Wait],
        &[Discard, Retry, Wait],
        &[Save],
        &[Save, Discard],
        &[Save, Retry, Wait],
        &[Save, Discard, Retry, Wait],
    ],
    seed_width: None,
};

static DEV_RANDOM: KindSchema = KindSchema {
    name: "DevRandomRNG",
    required: &[],
    optional: &[Save, Retry, Wait],
    combinations: &[&[], &[Save], &[Retry, Wait], &[Save, Retry, Wait]],
    seed_width: None,
};

static DEV_URANDOM: KindSchema = KindSchema {
    name: "DevURandomRNG",
    required: &[],
    optional: &[Save, Retry, Wait],
    combinations: &[&[], &[Save], &[Retry, Wait], &[Save, Retry, Wait]],
    seed_width: None,
};

static FILE: KindSchema = KindSchema {
    name: "FileRNG",
    required: &[Param::File],
    optional: &[Discard, Retry, Wait],
    combinations: &[&[], &[Discard], &[Retry, Wait], &[Discard, Retry, Wait]],
    seed_width: None,
};

static DRAND: KindSchema = KindSchema {
    name: "DRandRNG",
    required: &[],
    optional: &[Discard],
    combinations: &[&[], &[Discard]],
    seed_width: Some(SeedWidth::Int),
};

static MT: KindSchema = KindSchema {
    name: "MTRNG",
    required: &[],
    optional: &[Discard],
    combinations: &[&[], &[Discard]],
    seed_width: Some(SeedWidth::Int),
};

static JAVA: KindSchema = KindSchema {
    name: "JavaRNG",
    required: &[],
    optional: &[Discard],
    combinations: &[&[], &[Discard]],
    seed_width: Some(SeedWidth::Long),
};

static JAVA_SECURE: KindSchema = KindSchema {
    name: "JavaSecureRNG",
    required: &[],
    optional: &[Discard],
    combinations: &[&[], &[Discard]],
    seed_width: Some(SeedWidth::Long),
};

static RANDOM_ORG: KindSchema = KindSchema {
    name: "RandomOrgRNG",
    required: &[],
    optional: &[Save, Chunk],
    combinations: &[&[], &[Save], &[Chunk], &[Save, Chunk]],
    seed_width: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn params(s: &str) -> ParameterMap {
        ParameterMap::parse(s).unwrap()
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in RngKind::ALL {
            assert_eq!(kind.name().parse::<RngKind>().unwrap(), kind);
            assert_eq!(kind.schema().name, kind.name());
        }
        assert!("mtrng".parse::<RngKind>().unwrap_err().is_unknown_kind());
    }

    #[test]
    fn test_required_checked_before_pairing() {
        let err = DEVICE_READER.validate(&params("retry=3")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingParameter { param: Param::Device, .. }
        ));
    }

    #[test]
    fn test_retry_without_wait() {
        let err = DEVICE_READER
            .validate(&params("device=/dev/x,retry=3"))
            .unwrap_err();
        match err {
            ConfigError::MissingCounterpart { present, missing, .. } => {
                assert_eq!(present, Param::Retry);
                assert_eq!(missing, Param::Wait);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wait_without_retry() {
        let err = DEV_RANDOM.validate(&params("save=/tmp/x,wait=10")).unwrap_err();
        assert_eq!(err.parameter(), Some(Param::Retry));
    }

    #[test]
    fn test_every_device_reader_combination_accepted() {
        for combo in DEVICE_READER.combinations {
            let map: ParameterMap = std::iter::once(("device", "/dev/x"))
                .chain(combo.iter().map(|p| (p.name(), "1")))
                .collect();
            let present = DEVICE_READER.validate(&map).unwrap();
            assert_eq!(present, ParamSet::of(combo));
        }
    }

    #[test]
    fn test_unlisted_combination_rejected() {
        static STRICT: KindSchema = KindSchema {
            name: "StrictRNG",
            required: &[],
            optional: &[Save, Chunk],
            combinations: &[&[], &[Chunk]],
            seed_width: None,
        };
        let err = STRICT.validate(&params("save=/tmp/s")).unwrap_err();
        match err {
            ConfigError::IllegalCombination { kind, given } => {
                assert_eq!(kind, "StrictRNG");
                assert_eq!(given, "save");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unrecognised_parameters_ignored() {
        let present = MT.validate(&params("seed=1,colour=blue,device=/dev/x")).unwrap();
        assert!(present.is_empty());
    }

    #[test]
    fn test_param_set_display() {
        let set = ParamSet::of(&[Wait, Save, Retry]);
        assert_eq!(set.to_string(), "save, retry, wait");
    }
}
