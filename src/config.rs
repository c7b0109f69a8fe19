use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::service::Backend;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "SVCMAN_CONFIG";

/// Settings read by the command-line front-end.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Filesystem root for descriptors and platform markers.
    pub root: Option<PathBuf>,

    /// Force a backend instead of detecting one.
    pub backend: Option<Backend>,

    /// Template files keyed by backend name (`systemd`, `sysv`, ...).
    pub templates: HashMap<String, PathBuf>,
}

/// Get the settings file path ($SVCMAN_CONFIG, else <config dir>/svcman/config.json)
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("svcman").join("config.json"))
}

impl Settings {
    /// Load the default settings file, or empty settings if there is none.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// The configured template file for `backend`, if any.
    pub fn template_path(&self, backend: Backend) -> Option<&Path> {
        self.templates
            .iter()
            .find(|(key, _)| key.parse::<Backend>().ok() == Some(backend))
            .map(|(_, path)| path.as_path())
    }
}

/// Read a template override from disk.
pub fn read_template(path: &Path) -> std::result::Result<String, ServiceError> {
    std::fs::read_to_string(path).map_err(|source| ServiceError::TemplateOverride {
        path: path.to_path_buf(),
        source,
    })
}
