//! Error types for RNG resolution.
//!
//! Every variant of [`ConfigError`] is attributable to user input: a bad
//! parameter string, a contradictory parameter combination, an unknown kind
//! name, or a device/file that could not be opened. Defects in the registry
//! itself are not represented here; they panic.

use std::io;
use thiserror::Error;

use crate::kinds::Param;

/// Result alias for resolution operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors raised while resolving an RNG.
///
/// # Examples
/// ```
/// use rng_factory::ConfigError;
///
/// let err = ConfigError::UnknownKind("NoSuchKind".to_string());
/// assert_eq!(err.to_string(), "unknown RNG kind \"NoSuchKind\"");
/// assert!(err.is_unknown_kind());
/// ```
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A token in the parameter string was neither a bare seed nor a
    /// single `name=value` pair.
    #[error("expecting <RNG parameter>=<value> pair, got \"{token}\" (processing RNG parameter string: {input})")]
    MalformedToken {
        /// The offending token
        token: String,
        /// The whole parameter string
        input: String,
    },

    /// A parameter the kind cannot be built without is absent.
    #[error("{kind} requires the {param} parameter to be specified")]
    MissingParameter {
        /// Kind being built
        kind: String,
        /// Missing parameter
        param: Param,
    },

    /// One half of a paired parameter (`retry`/`wait`) was given without
    /// the other.
    #[error(
        "building {kind}: {present} was given without {missing}; {missing} must also be supplied as {expected}"
    )]
    MissingCounterpart {
        /// Kind being built
        kind: String,
        /// The parameter that was supplied
        present: Param,
        /// The counterpart that was not
        missing: Param,
        /// Human-readable expected type of the missing parameter
        expected: &'static str,
    },

    /// The set of optional parameters present is not one the kind accepts.
    #[error("building {kind}: the parameter combination {{{given}}} is not accepted")]
    IllegalCombination {
        /// Kind being built
        kind: String,
        /// Comma-separated names of the optional parameters present
        given: String,
    },

    /// An integer-valued parameter could not be parsed.
    #[error("{operation}: invalid value \"{value}\" for {param}; this parameter needs to be a parseable {expected}")]
    InvalidInteger {
        /// Operation being attempted
        operation: String,
        /// Parameter being parsed
        param: Param,
        /// Raw value supplied
        value: String,
        /// Expected integer type
        expected: &'static str,
    },

    /// The `table` parameter was not `<row>:<col>`.
    #[error("generating seed: invalid argument to table RNG parameter \"{value}\": {reason}")]
    InvalidTable {
        /// Raw value supplied
        value: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// No builder is registered under the requested name.
    #[error("unknown RNG kind \"{0}\"")]
    UnknownKind(String),

    /// The concrete source could not acquire its device, file or save file.
    #[error("{context}")]
    Resource {
        /// The operation and the parameter values that produced the failure
        context: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    /// Whether this error reports an unregistered kind name.
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, ConfigError::UnknownKind(_))
    }

    /// Name of the parameter this error is about, if any.
    pub fn parameter(&self) -> Option<Param> {
        match self {
            ConfigError::MissingParameter { param, .. } => Some(*param),
            ConfigError::MissingCounterpart { missing, .. } => Some(*missing),
            ConfigError::InvalidInteger { param, .. } => Some(*param),
            ConfigError::InvalidTable { .. } => Some(Param::Table),
            _ => None,
        }
    }
}
