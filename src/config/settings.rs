use super::ConfigError;
use crate::pipeline::{Step, StepName};
use crate::process::is_supported_encoding;
use crate::shared::validate_identifier_value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTimings {
    pub initial_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub clear_after_ms: u64,
}

impl Default for StatusTimings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            tick_interval_ms: 200,
            clear_after_ms: 3000,
        }
    }
}

impl StatusTimings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn clear_after(&self) -> Duration {
        Duration::from_millis(self.clear_after_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub panel_name: String,
    pub status_key: String,
    pub default_encoding: String,
    pub status: StatusTimings,
    pub log_file: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub commands: BTreeMap<String, Vec<Step>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            panel_name: "commando".to_string(),
            status_key: "commando".to_string(),
            default_encoding: "utf-8".to_string(),
            status: StatusTimings::default(),
            log_file: None,
            env: BTreeMap::new(),
            commands: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel_name.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`panel_name` must be non-empty".to_string(),
            ));
        }
        if self.status_key.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`status_key` must be non-empty".to_string(),
            ));
        }
        if !is_supported_encoding(&self.default_encoding) {
            return Err(ConfigError::Settings(format!(
                "`default_encoding` `{}` is not supported",
                self.default_encoding
            )));
        }
        if self.status.tick_interval_ms == 0 {
            return Err(ConfigError::Settings(
                "`status.tick_interval_ms` must be greater than zero".to_string(),
            ));
        }

        for (name, steps) in &self.commands {
            validate_identifier_value("command name", name).map_err(ConfigError::Settings)?;
            if steps.is_empty() {
                return Err(ConfigError::Settings(format!(
                    "command `{name}` must declare at least one step"
                )));
            }
            for step in steps {
                if StepName::from_str(&step.name).is_err() {
                    return Err(ConfigError::Settings(format!(
                        "command `{name}` references unknown step `{}`",
                        step.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn command(&self, name: &str) -> Option<&[Step]> {
        self.commands.get(name).map(Vec::as_slice)
    }
}
