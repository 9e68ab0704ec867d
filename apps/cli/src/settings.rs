//! Layered runner settings: defaults, then a TOML file, then `RECOVERY_*`
//! environment variables. Command-line flags are applied by the caller.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use recovery_engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "RECOVERY_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the resource under repair.
    pub resource: String,
    /// Whether failing actions may try their recovery actions.
    pub enable_recovery: bool,
    /// When set, metric records are collected in memory and written here
    /// as JSON after the run.
    pub metrics_file: Option<PathBuf>,
    pub engine: EngineConfig,
    pub log: recovery_log::Config,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resource: "localhost".to_string(),
            enable_recovery: true,
            metrics_file: None,
            engine: EngineConfig::default(),
            log: recovery_log::Config::default(),
        }
    }
}

impl Settings {
    /// Merge the layers. A missing `file` is an error.
    ///
    /// `RECOVERY_LOG` and `RECOVERY_LOG_FORMAT` keep their logging meaning
    /// and seed the `log` defaults; nested keys use `__`, as in
    /// `RECOVERY_ENGINE__DEFAULT_EXEC_TIMEOUT=90s`.
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        let defaults = Self {
            log: recovery_log::Config::from_env(),
            ..Self::default()
        };

        let mut figment = Figment::from(Serialized::defaults(defaults));
        if let Some(file) = file {
            if !file.is_file() {
                return Err(figment::Error::from(format!(
                    "settings file {} does not exist",
                    file.display()
                )));
            }
            figment = figment.merge(Toml::file(file));
        }
        figment
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["log", "log_format"])
                    .split("__"),
            )
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_without_layers() {
        Jail::expect_with(|_| {
            let settings = Settings::load(None)?;
            assert_eq!(settings.resource, "localhost");
            assert!(settings.enable_recovery);
            assert_eq!(settings.metrics_file, None);
            assert_eq!(settings.engine, EngineConfig::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.toml",
                r#"
                    resource = "dut-file"
                    enable_recovery = false

                    [engine]
                    default_exec_timeout = "5m"

                    [log]
                    format = "json"
                "#,
            )?;
            jail.set_env("RECOVERY_RESOURCE", "dut-env");
            jail.set_env("RECOVERY_ENGINE__METRICS_CREATE_TIMEOUT", "3s");

            let settings = Settings::load(Some(Path::new("settings.toml")))?;
            assert_eq!(settings.resource, "dut-env");
            assert!(!settings.enable_recovery);
            assert_eq!(settings.engine.default_exec_timeout, Duration::from_secs(300));
            assert_eq!(settings.engine.metrics_create_timeout, Duration::from_secs(3));
            assert_eq!(settings.log.format, recovery_log::Format::Json);
            Ok(())
        });
    }

    #[test]
    fn log_variables_are_not_settings_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("RECOVERY_LOG", "warn");
            jail.set_env("RECOVERY_LOG_FORMAT", "json");

            let settings = Settings::load(None)?;
            assert_eq!(settings.log.level, "warn");
            assert_eq!(settings.log.format, recovery_log::Format::Json);
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|_| {
            assert!(Settings::load(Some(Path::new("absent.toml"))).is_err());
            Ok(())
        });
    }
}
