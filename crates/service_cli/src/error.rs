//! CLI error types

use std::error::Error as _;
use std::io;

use rng_factory::{ConfigError, SettingsError};
use thiserror::Error;

/// CLI result type
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors reported by the `rngfactory` binary
#[derive(Debug, Error)]
pub enum CliError {
    #[error("settings could not be loaded")]
    Settings(#[from] SettingsError),

    #[error("RNG configuration error")]
    Config(#[from] ConfigError),

    #[error("failed to draw from the generator")]
    Draw(#[source] io::Error),

    #[error("failed to write output")]
    Output(#[source] io::Error),

    #[error("a shared generator is already installed")]
    AlreadyInstalled,
}

impl CliError {
    /// Process exit code: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Settings(_) | CliError::Config(_) => 2,
            CliError::Draw(_) | CliError::Output(_) | CliError::AlreadyInstalled => 1,
        }
    }

    /// Message followed by every underlying cause, one per line.
    pub fn report(&self) -> String {
        let mut out = format!("error: {self}");
        let mut cause = self.source();
        while let Some(err) = cause {
            out.push_str(&format!("\n  caused by: {err}"));
            cause = err.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rng_factory::ParameterMap;

    #[test]
    fn test_exit_codes() {
        let config = CliError::from(ConfigError::UnknownKind("X".to_string()));
        assert_eq!(config.exit_code(), 2);
        let settings = CliError::from(SettingsError::InvalidLogLevel("loud".to_string()));
        assert_eq!(settings.exit_code(), 2);
        let draw = CliError::Draw(io::Error::new(io::ErrorKind::UnexpectedEof, "empty"));
        assert_eq!(draw.exit_code(), 1);
    }

    #[test]
    fn test_report_includes_cause_chain() {
        let err = CliError::from(ParameterMap::parse("a=1=2").unwrap_err());
        let report = err.report();
        assert!(report.starts_with("error: RNG configuration error"));
        assert!(report.contains("caused by: expecting <RNG parameter>=<value> pair, got \"a=1=2\""));
    }

    #[test]
    fn test_report_reaches_io_cause() {
        let err = CliError::from(ConfigError::Resource {
            context: "building FileRNG with file = \"/x\"".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
        let report = err.report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("building FileRNG"));
        assert!(lines[2].contains("no such file"));
    }
}
