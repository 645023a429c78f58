//! Configuration management

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tgdash_core::DashboardConfig;

pub struct SettingsManager;

impl SettingsManager {
    /// Get the tgdash home directory (~/.tgdash)
    pub fn tgdash_home() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("TGDASH_HOME") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".tgdash"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::tgdash_home()?.join("settings.json"))
    }

    /// Defaults, then the settings file, then `TGDASH_*` variables
    pub fn load() -> Result<DashboardConfig> {
        Self::load_from(&Self::settings_path()?, true)
    }

    /// Settings file only, as `config set-server` rewrites it
    pub fn load_file() -> Result<DashboardConfig> {
        Self::load_from(&Self::settings_path()?, false)
    }

    pub fn load_from(path: &Path, include_env: bool) -> Result<DashboardConfig> {
        let mut builder =
            Config::builder().add_source(File::from(path).format(FileFormat::Json).required(false));
        if include_env {
            builder = builder.add_source(Environment::with_prefix("TGDASH").try_parsing(true));
        }

        let settings = builder
            .build()
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        // Missing keys fall back to DashboardConfig defaults
        settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings from {:?}", path))
    }

    /// Save settings to disk
    pub fn save(settings: &DashboardConfig) -> Result<()> {
        Self::save_to(&Self::settings_path()?, settings)
    }

    pub fn save_to(path: &Path, settings: &DashboardConfig) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        // Set permissions on Unix (restrict to owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = SettingsManager::load_from(&dir.path().join("settings.json"), false)?;
        assert_eq!(settings, DashboardConfig::default());
        Ok(())
    }

    #[test]
    fn saved_settings_load_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = DashboardConfig::default().with_server_url("https://dash.example.com");
        settings.request_timeout_secs = 10;
        SettingsManager::save_to(&path, &settings)?;

        assert_eq!(SettingsManager::load_from(&path, false)?, settings);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path)?.permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "reconnect_delay_ms": 500 }"#)?;

        let settings = SettingsManager::load_from(&path, false)?;
        assert_eq!(settings.reconnect_delay_ms, 500);
        assert_eq!(settings.server_url, DashboardConfig::default().server_url);
        Ok(())
    }

    #[test]
    fn invalid_json_is_reported() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json")?;

        assert!(SettingsManager::load_from(&path, false).is_err());
        Ok(())
    }
}
