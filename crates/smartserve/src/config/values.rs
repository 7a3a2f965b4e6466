use std::path::PathBuf;
use std::str::FromStr;

use super::ConfigError;

const TRUE_VALUES: &[&str] = &["true", "on", "ok", "y", "yes", "1"];

/// Interprets an environment flag. Anything outside the accepted spellings of
/// "true" reads as false.
pub fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    TRUE_VALUES.contains(&lowered.as_str())
}

/// Splits a comma separated value, dropping blank entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Typed accessors over a variable lookup function.
pub(super) struct Lookup<'a> {
    source: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> Lookup<'a> {
    pub(super) fn new(source: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { source }
    }

    pub(super) fn get(&self, name: &str) -> Option<String> {
        (self.source)(name).map(|value| value.trim().to_string())
    }

    pub(super) fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name)
            .map(|value| parse_bool(&value))
            .unwrap_or(default)
    }

    pub(super) fn list_or(&self, name: &str, default: &[&str]) -> Vec<String> {
        match self.get(name) {
            Some(value) => parse_list(&value),
            None => default.iter().map(|entry| entry.to_string()).collect(),
        }
    }

    pub(super) fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
    {
        match self.get(name) {
            Some(value) if !value.is_empty() => {
                value.parse::<T>().map_err(|_| ConfigError::Invalid {
                    name,
                    value,
                    expected: "a valid number",
                })
            }
            _ => Ok(default),
        }
    }

    pub(super) fn path(&self, name: &str) -> Option<PathBuf> {
        self.get(name)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}
