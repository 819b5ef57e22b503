//! Parameter string parsing.
//!
//! RNG parameters arrive as a compact comma-separated string such as
//! `device=/dev/zero,discard=4`. A bare non-negative integer is shorthand
//! for `seed=<n>`, so `42` and `seed=42` are equivalent.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Mapping from parameter name to raw string value.
///
/// Keys are unique and insertion order is irrelevant: two maps holding the
/// same pairs compare equal however they were built. Builders only ever
/// read a map.
///
/// # Examples
/// ```
/// use rng_factory::ParameterMap;
///
/// let params = ParameterMap::parse("device=/dev/zero,discard=4").unwrap();
/// assert_eq!(params.get("device"), Some("/dev/zero"));
/// assert_eq!(params.get("discard"), Some("4"));
///
/// let seed_only = ParameterMap::parse("42").unwrap();
/// assert_eq!(seed_only.get("seed"), Some("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: HashMap<String, String>,
}

impl ParameterMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated parameter string.
    ///
    /// Empty input yields an empty map. Later duplicates overwrite earlier
    /// ones.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MalformedToken`] for any token that is neither all
    /// digits nor exactly one `=` between a non-empty name and value.
    pub fn parse(input: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        if input.is_empty() {
            return Ok(Self { entries });
        }

        for token in input.split(',') {
            if is_bare_seed(token) {
                entries.insert("seed".to_string(), token.to_string());
                continue;
            }

            let mut parts = token.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(value), None) if !name.is_empty() && !value.is_empty() => {
                    entries.insert(name.to_string(), value.to_string());
                }
                _ => {
                    return Err(ConfigError::MalformedToken {
                        token: token.to_string(),
                        input: input.to_string(),
                    })
                }
            }
        }

        Ok(Self { entries })
    }

    /// Raw value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns this map with `key` set to `value` unless it is already
    /// present.
    pub fn or_insert(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| value.into());
        self
    }
}

fn is_bare_seed(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for ParameterMap {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Renders `name=value` pairs sorted by name, so output is stable.
impl fmt::Display for ParameterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        for (i, (name, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
