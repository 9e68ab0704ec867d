//! Parsing of `key:value` action arguments.

use std::collections::HashMap;
use std::time::Duration;

use humantime_serde::re::humantime;

/// Action arguments parsed from an action's `exec_extra_args`.
///
/// Each argument is `key:value`, split on the first colon with both sides
/// trimmed. An argument without a colon is a key with an empty value. Later
/// duplicates win. Typed getters fall back to the supplied default, logging a
/// warning when a value is present but malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionArgs {
    values: HashMap<String, String>,
}

impl ActionArgs {
    /// Parse a list of raw arguments.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        for arg in raw {
            let arg = arg.as_ref().trim();
            if arg.is_empty() {
                continue;
            }
            let (key, value) = arg.split_once(':').unwrap_or((arg, ""));
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
        Self { values }
    }

    /// Whether `key` was supplied.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of parsed arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of `key` as a string. Empty values fall back to `default`.
    #[must_use]
    pub fn as_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => default.to_string(),
        }
    }

    /// Comma-separated value of `key`, with empty items dropped.
    #[must_use]
    pub fn as_string_slice(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value of `key` as a boolean. A bare key counts as `true`.
    #[must_use]
    pub fn as_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some("") => true,
            Some(v) => v.to_ascii_lowercase().parse().unwrap_or_else(|_| {
                tracing::warn!(key, value = v, "argument is not a boolean, using default");
                default
            }),
        }
    }

    /// Value of `key` as an integer.
    #[must_use]
    pub fn as_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            None | Some("") => default,
            Some(v) => v.parse().unwrap_or_else(|_| {
                tracing::warn!(key, value = v, "argument is not an integer, using default");
                default
            }),
        }
    }

    /// Value of `key` as a duration: a humantime string such as `90s` or
    /// `2m 30s`, or a bare integer number of seconds.
    #[must_use]
    pub fn as_duration(&self, key: &str, default: Duration) -> Duration {
        match self.get(key) {
            None | Some("") => default,
            Some(v) => {
                if let Ok(secs) = v.parse::<u64>() {
                    return Duration::from_secs(secs);
                }
                humantime::parse_duration(v).unwrap_or_else(|_| {
                    tracing::warn!(key, value = v, "argument is not a duration, using default");
                    default
                })
            }
        }
    }
}
