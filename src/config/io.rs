use std::path::Path;

use super::schema::{Config, RuntimeConfig};
use super::validate::ConfigError;

/// Outcome of re-reading the config file while the dashboard runs.
#[derive(Debug, Clone)]
pub struct RuntimeReload {
    pub runtime: RuntimeConfig,
    /// Sections that changed on disk but are only read at startup.
    pub restart_required: Vec<&'static str>,
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&raw, path)
}

/// `path` only labels errors.
pub fn parse_config(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads the file again and keeps its thresholds and alert caps. The whole
/// file must still validate; edits to startup-only sections are reported
/// instead of applied.
pub fn load_runtime_config(
    path: impl AsRef<Path>,
    running: &Config,
) -> Result<RuntimeReload, ConfigError> {
    let next = load_config(path)?;

    let mut restart_required = Vec::new();
    if next.api != running.api {
        restart_required.push("api");
    }
    if next.panels != running.panels {
        restart_required.push("panels");
    }
    if next.telegram != running.telegram {
        restart_required.push("telegram");
    }

    Ok(RuntimeReload {
        runtime: RuntimeConfig::from_config(&next),
        restart_required,
    })
}
