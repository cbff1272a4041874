mod store;

pub use store::{ConfigStore, Ini};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "RADIAL_CONFIG";

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    // default location: ~/.radial/settings.json
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".radial")
        .join("settings.json"))
}

/// explicit path (from --config) wins over env var and default location
pub fn get_config_path_with_override(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => get_config_path(),
    }
}

/// settings file holding every rule set, one section per category
#[derive(Debug)]
pub struct ConfigurationFile {
    path: PathBuf,
    ini: Ini,
}

impl ConfigurationFile {
    /// empty settings that will be written to `path` on save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ini: Ini::new(),
        }
    }

    /// read settings from disk; a missing file yields empty settings
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            log::debug!("settings file {} not found, starting empty", path.display());
            return Ok(Self::new(path));
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let ini: Ini = if content.trim().is_empty() {
            Ini::new()
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse settings file: {}", path.display()))?
        };

        log::debug!(
            "loaded {} section(s) from {}",
            ini.sections().len(),
            path.display()
        );

        Ok(Self { path, ini })
    }

    /// write settings using atomic write (write to temp, then rename)
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory: {}", parent.display())
                })?;
            }
        }

        let content =
            serde_json::to_string_pretty(&self.ini).context("Failed to serialize settings")?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write settings file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;

        log::debug!("saved settings to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ini(&self) -> &Ini {
        &self.ini
    }

    pub fn ini_mut(&mut self) -> &mut Ini {
        &mut self.ini
    }
}

/// open the settings file at the overridden or default location
pub fn open_with_override(path: Option<&Path>) -> Result<ConfigurationFile> {
    let path = get_config_path_with_override(path)?;
    ConfigurationFile::load(path)
}
