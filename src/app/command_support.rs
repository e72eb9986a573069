use crate::config::{default_config_path, load_settings, ConfigError, Settings};
use std::path::{Path, PathBuf};

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, String> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path().map_err(map_config_err),
    }
}

pub fn load_cli_settings(explicit: Option<&Path>) -> Result<(PathBuf, Settings), String> {
    let path = resolve_config_path(explicit)?;
    let settings = load_settings(&path).map_err(map_config_err)?;
    Ok((path, settings))
}

/// Pulls `--config PATH` out of `args`, rejecting anything else.
pub fn parse_config_only(args: &[String]) -> Result<Option<PathBuf>, String> {
    let mut config = None;
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--config" => {
                config = Some(PathBuf::from(option_value(args, index, "--config")?));
                index += 2;
            }
            other => return Err(format!("unexpected argument `{other}`")),
        }
    }
    Ok(config)
}

pub fn option_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("`{flag}` requires a value"))
}
