//! Layered tool configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, a TOML
//! file, `FIELD_PERMITS_*` environment variables, and command-line flags
//! (applied by the caller after [`Config::load`]).

use std::path::{Path, PathBuf};

use field_permits_permit::{ClockConversion, ExtractOptions, OrphanSlotPolicy, RowOptions};
use field_permits_workbook::{HeaderStyle, WorkbookFormat};
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "field_permits.toml";

pub const ENV_MAX_LENGTH: &str = "FIELD_PERMITS_MAX_LENGTH";
pub const ENV_ORPHAN_SLOTS: &str = "FIELD_PERMITS_ORPHAN_SLOTS";
pub const ENV_CLOCK: &str = "FIELD_PERMITS_CLOCK";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`Config`].
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An environment override has an unusable value.
    #[error("Invalid value '{value}' for {var}")]
    Env { var: &'static str, value: String },
}

/// Workbook output settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: WorkbookFormat,
    pub header_style: HeaderStyle,
}

/// Tool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Cap applied to slot lines and to field names.
    pub max_length: usize,
    pub orphan_slots: OrphanSlotPolicy,
    pub clock: ClockConversion,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        let extract = ExtractOptions::default();
        Self {
            max_length: extract.max_length,
            orphan_slots: extract.orphan_slots,
            clock: ClockConversion::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`toml::de::Error`] for malformed TOML, unknown keys, or
    /// unrecognized enum values.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] from the
    /// working directory when it exists, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit file is missing, any file
    /// fails to parse, or an environment value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::read_file(fallback)?
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found; using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading config from {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `FIELD_PERMITS_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] for a value that does not parse.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_MAX_LENGTH) {
            self.max_length = parse_env(ENV_MAX_LENGTH, value)?;
        }
        if let Some(value) = lookup(ENV_ORPHAN_SLOTS) {
            self.orphan_slots = parse_env(ENV_ORPHAN_SLOTS, value)?;
        }
        if let Some(value) = lookup(ENV_CLOCK) {
            self.clock = parse_env(ENV_CLOCK, value)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::with_max_length(self.max_length).orphan_slots(self.orphan_slots)
    }

    #[must_use]
    pub const fn row_options(&self) -> RowOptions {
        RowOptions { clock: self.clock }
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
        assert_eq!(Config::default().max_length, 500);
    }

    #[test]
    fn parses_every_key() {
        let config = Config::from_toml(
            r#"
max_length = 20
orphan_slots = "error"
clock = "legacy"

[output]
format = "csv"
header_style = "plain"
"#,
        )
        .unwrap();

        assert_eq!(config.max_length, 20);
        assert_eq!(config.orphan_slots, OrphanSlotPolicy::Error);
        assert_eq!(config.clock, ClockConversion::Legacy);
        assert_eq!(config.output.format, WorkbookFormat::Csv);
        assert_eq!(config.output.header_style, HeaderStyle::Plain);
        assert_eq!(config.extract_options().max_length, 20);
        assert_eq!(config.row_options().clock, ClockConversion::Legacy);
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        assert!(Config::from_toml("max_lenght = 3").is_err());
        assert!(Config::from_toml("clock = \"metric\"").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let env: BTreeMap<&str, &str> = [
            (ENV_MAX_LENGTH, " 7 "),
            (ENV_ORPHAN_SLOTS, "ERROR"),
            (ENV_CLOCK, "Legacy"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::from_toml("max_length = 20").unwrap();
        config
            .apply_env(|var| env.get(var).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.max_length, 7);
        assert_eq!(config.orphan_slots, OrphanSlotPolicy::Error);
        assert_eq!(config.clock, ClockConversion::Legacy);
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let mut config = Config::default();
        let err = config
            .apply_env(|var| (var == ENV_MAX_LENGTH).then(|| "many".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_MAX_LENGTH, .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("field_permits_missing_config.toml");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn loads_explicit_file() {
        let path = std::env::temp_dir().join("field_permits_config_test.toml");
        std::fs::write(&path, "[output]\nformat = \"csv\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output.format, WorkbookFormat::Csv);

        let _ = std::fs::remove_file(&path);
    }
}
