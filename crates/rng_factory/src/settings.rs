//! Ambient RNG configuration.
//!
//! The dispatcher and the global holder read the kind name and parameters
//! through [`ConfigSource`], so tests can inject their own. [`RngSettings`]
//! is the standard implementation, loaded from a TOML file and `RNG_*`
//! environment variables.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ConfigError;
use crate::kinds::Param;
use crate::params::ParameterMap;

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown log level \"{0}\" (expected trace, debug, info, warn or error)")]
    InvalidLogLevel(String),

    #[error("could not load settings: {0}")]
    FileError(String),

    #[error("invalid RNG parameters: {0}")]
    Params(#[from] ConfigError),
}

/// Read access to the configured kind and parameters.
pub trait ConfigSource: Send + Sync {
    /// Configured kind name, if any.
    fn kind_name(&self) -> Option<String>;

    /// Configured parameter string, if any.
    fn param_string(&self) -> Option<String>;

    /// Seed supplied outside the parameter string.
    fn seed_override(&self) -> Option<i64> {
        None
    }

    /// Pre-parsed parameters; when present the parameter string is not
    /// parsed at all.
    fn param_override(&self) -> Option<ParameterMap> {
        None
    }

    /// Effective parameter map.
    ///
    /// The override map wins over the parameter string; no parameters at
    /// all gives an empty map. A seed override fills in `seed` only when
    /// the parameters do not already name one.
    fn parameters(&self) -> Result<ParameterMap, ConfigError> {
        let params = match (self.param_override(), self.param_string()) {
            (Some(map), _) => map,
            (None, Some(s)) => ParameterMap::parse(&s)?,
            (None, None) => ParameterMap::new(),
        };
        Ok(match self.seed_override() {
            Some(seed) => params.or_insert(Param::Seed.name(), seed.to_string()),
            None => params,
        })
    }
}

/// Verbosity of the `tracing` subscriber installed by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    // Indexed by discriminant.
    const NAMES: [(LogLevel, &'static str); 5] = [
        (LogLevel::Trace, "trace"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Info, "info"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Error, "error"),
    ];

    /// Directive understood by `EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        Self::NAMES[*self as usize].1
    }
}

impl FromStr for LogLevel {
    type Err = SettingsError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(level, _)| *level)
            .ok_or_else(|| SettingsError::InvalidLogLevel(s.to_string()))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, SettingsError> {
        s.parse()
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// RNG settings as loaded from file, environment and command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RngSettings {
    /// Kind name (`MTRNG` when unset)
    pub kind: Option<String>,
    /// Parameter string
    pub params: Option<String>,
    /// Seed override
    pub seed: Option<i64>,
    /// Log level
    pub log_level: LogLevel,
    /// Pre-parsed parameters, bypassing `params`
    #[serde(skip)]
    pub param_map: Option<ParameterMap>,
}

/// Prefix of environment variables read by [`RngSettings::load`].
pub const ENV_PREFIX: &str = "RNG";

impl RngSettings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings, layering `RNG_*` environment variables over an
    /// optional TOML file.
    ///
    /// Recognised variables: `RNG_KIND`, `RNG_PARAMS`, `RNG_SEED`,
    /// `RNG_LOG_LEVEL`.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(false),
        );

        let settings: RngSettings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SettingsError::FileError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the parameter string parses.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.param_map.is_none() {
            if let Some(params) = &self.params {
                ParameterMap::parse(params)?;
            }
        }
        Ok(())
    }

    /// Overrides with command-line values (command line takes precedence).
    pub fn merge_with_cli(&mut self, cli: &CliOverrides) -> Result<(), SettingsError> {
        if let Some(kind) = &cli.kind {
            self.kind = Some(kind.clone());
        }
        if let Some(params) = &cli.params {
            self.params = Some(params.clone());
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        self.validate()
    }
}

/// Command-line overrides for [`RngSettings`].
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Kind name
    pub kind: Option<String>,
    /// Parameter string
    pub params: Option<String>,
    /// Seed
    pub seed: Option<i64>,
    /// Log level
    pub log_level: Option<String>,
}

impl ConfigSource for RngSettings {
    fn kind_name(&self) -> Option<String> {
        self.kind.clone()
    }

    fn param_string(&self) -> Option<String> {
        self.params.clone()
    }

    fn seed_override(&self) -> Option<i64> {
        self.seed
    }

    fn param_override(&self) -> Option<ParameterMap> {
        self.param_map.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = RngSettings::new();
        assert_eq!(settings.kind, None);
        assert_eq!(settings.log_level, LogLevel::Info);
        assert!(settings.parameters().unwrap().is_empty());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            kind = "FileRNG"
            params = "file=/tmp/bytes,discard=16"
            seed = 99
            log_level = "debug"
        "#;

        let settings: RngSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.kind.as_deref(), Some("FileRNG"));
        assert_eq!(settings.log_level, LogLevel::Debug);

        let params = settings.parameters().unwrap();
        assert_eq!(params.get("file"), Some("/tmp/bytes"));
        assert_eq!(params.get("seed"), Some("99"));
    }

    #[test]
    fn test_bad_log_level_in_toml() {
        let result: Result<RngSettings, _> = toml::from_str(r#"log_level = "loud""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_param_seed_beats_override() {
        let settings = RngSettings {
            params: Some("seed=5".to_string()),
            seed: Some(9),
            ..Default::default()
        };
        assert_eq!(settings.parameters().unwrap().get("seed"), Some("5"));
    }

    #[test]
    fn test_param_map_bypasses_string() {
        let settings = RngSettings {
            params: Some("a=1=2".to_string()),
            param_map: Some(ParameterMap::parse("discard=3").unwrap()),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.parameters().unwrap().get("discard"), Some("3"));
    }

    #[test]
    fn test_malformed_params_rejected() {
        let settings = RngSettings {
            params: Some("a=1=2".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Params(ConfigError::MalformedToken { .. }))
        ));
    }

    #[test]
    fn test_merge_with_cli() {
        let mut settings = RngSettings {
            kind: Some("JavaRNG".to_string()),
            ..Default::default()
        };
        let cli = CliOverrides {
            kind: Some("MTRNG".to_string()),
            seed: Some(3),
            log_level: Some("WARN".to_string()),
            ..Default::default()
        };
        settings.merge_with_cli(&cli).unwrap();
        assert_eq!(settings.kind.as_deref(), Some("MTRNG"));
        assert_eq!(settings.seed, Some(3));
        assert_eq!(settings.log_level, LogLevel::Warn);

        let bad = CliOverrides {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            settings.merge_with_cli(&bad),
            Err(SettingsError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        for var in ["RNG_KIND", "RNG_PARAMS", "RNG_SEED", "RNG_LOG_LEVEL"] {
            std::env::remove_var(var);
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rng.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "kind = \"JavaRNG\"\nparams = \"table=4:2\"").unwrap();

        let settings = RngSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.kind_name().as_deref(), Some("JavaRNG"));
        assert_eq!(settings.param_string().as_deref(), Some("table=4:2"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RngSettings::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(SettingsError::FileError(_))));
    }

    #[test]
    fn test_log_level_names_round_trip() {
        assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
        assert_eq!(LogLevel::Error.to_string(), "error");
        for (level, name) in LogLevel::NAMES {
            assert_eq!(level.as_filter_str(), name);
            assert_eq!(name.to_uppercase().parse::<LogLevel>().unwrap(), level);
        }
    }
}
