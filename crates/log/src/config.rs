//! Logger configuration and presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LogError;

/// Environment variable holding the filter directives.
pub const ENV_LEVEL: &str = "RECOVERY_LOG";
/// Environment variable selecting the output format.
pub const ENV_FORMAT: &str = "RECOVERY_LOG_FORMAT";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter directives, e.g. `"info"` or `"info,recovery_engine=debug"`.
    pub level: String,

    /// Output format.
    pub format: Format,

    /// Where formatted events go.
    pub writer: WriterConfig,

    /// What each line shows.
    pub display: DisplayConfig,

    /// When set, every event is emitted inside a root span carrying
    /// this resource name.
    pub resource: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            writer: WriterConfig::Stderr,
            display: DisplayConfig::default(),
            resource: None,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Multi-line, human-readable.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl Format {
    /// Lowercase name as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(LogError::UnknownFormat(s.to_string())),
        }
    }
}

/// Output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterConfig {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
    /// The libtest capture buffer, so output only shows for failing tests.
    Test,
}

/// Display toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show timestamps
    pub time: bool,
    /// Show `file:line`
    pub source: bool,
    /// Show the event target
    pub target: bool,
    /// Show thread ids
    pub thread_ids: bool,
    /// Use ANSI colors
    pub colors: bool,
    /// Include the full span list in JSON output
    pub span_list: bool,
    /// Put event fields at the top level of JSON output
    pub flatten: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time: true,
            source: false,
            target: true,
            thread_ids: false,
            colors: true,
            span_list: true,
            flatten: false,
        }
    }
}

impl Config {
    /// Configuration from `RECOVERY_LOG` (or `RUST_LOG`) and
    /// `RECOVERY_LOG_FORMAT`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    ///
    /// An unrecognised format keeps the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup(ENV_LEVEL).or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }
        if let Some(format) = lookup(ENV_FORMAT)
            && let Ok(format) = format.parse()
        {
            config.format = format;
        }
        config
    }

    /// Debug level, pretty output with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            display: DisplayConfig {
                source: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Info level, flattened JSON without colors.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                flatten: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Debug level into the libtest capture buffer.
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Compact,
            writer: WriterConfig::Test,
            display: DisplayConfig {
                time: false,
                colors: false,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Replace the filter directives.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Replace the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Replace the output destination.
    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Wrap every event in a root span naming `resource`.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[rstest]
    #[case("pretty", Format::Pretty)]
    #[case("Compact", Format::Compact)]
    #[case(" json ", Format::Json)]
    fn format_parses(#[case] input: &str, #[case] expected: Format) {
        assert_eq!(input.parse::<Format>().unwrap(), expected);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert_eq!(
            "logfmt".parse::<Format>().unwrap_err(),
            LogError::UnknownFormat("logfmt".into())
        );
    }

    #[test]
    fn env_defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn recovery_log_wins_over_rust_log() {
        let config = Config::from_lookup(lookup(&[
            ("RECOVERY_LOG", "debug"),
            ("RUST_LOG", "warn"),
            ("RECOVERY_LOG_FORMAT", "json"),
        ]));
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, Format::Json);
    }

    #[test]
    fn rust_log_fallback_and_bad_format() {
        let config = Config::from_lookup(lookup(&[
            ("RUST_LOG", "warn"),
            ("RECOVERY_LOG_FORMAT", "xml"),
        ]));
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, Format::Compact);
    }

    #[test]
    fn presets() {
        let dev = Config::development();
        assert_eq!(dev.format, Format::Pretty);
        assert!(dev.display.source);

        let prod = Config::production();
        assert_eq!(prod.format, Format::Json);
        assert!(!prod.display.colors);
        assert!(prod.display.flatten);

        assert_eq!(Config::test().writer, WriterConfig::Test);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"format": "json", "writer": "stdout"}"#).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.writer, WriterConfig::Stdout);
        assert_eq!(config.display, DisplayConfig::default());
    }
}
