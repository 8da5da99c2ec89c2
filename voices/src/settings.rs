use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::AppError;

pub const DEFAULT_CATALOG_URL: &str = "https://Hear2Read.org/nvda-addon/getFlitevoxNames.php";
pub const DEFAULT_ASSET_BASE_URL: &str = "https://Hear2Read.org/Hear2Read/NVDA-Addon";
pub const DEFAULT_TELEMETRY_URL: &str = "https://Hear2Read.org/nvda-addon/logDownload.php";
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ifconfig.me/ip";

const STORE_DIR: &str = "Hear2Read";
const STORE_FILE: &str = "voice-manager.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub install_dir: Option<String>,
    pub catalog_url: String,
    pub asset_base_url: String,
    pub telemetry_url: String,
    pub ip_lookup_url: String,
    pub telemetry_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            install_dir: None,
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            telemetry_url: DEFAULT_TELEMETRY_URL.to_string(),
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
            telemetry_enabled: true,
        }
    }
}

pub fn settings_path() -> PathBuf {
    let base = dirs_next::config_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(STORE_DIR).join(STORE_FILE)
}

pub fn get_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &Settings) -> Result<(), AppError> {
    save_settings_to(&settings_path(), settings)
}

/// Missing or unreadable files fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Settings::default();
        }
        Err(e) => {
            log::warn!("Failed to load settings from {}: {e}", path.display());
            return Settings::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Ignoring malformed settings at {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Settings(format!("create {}: {e}", parent.display())))?;
    }

    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("encode settings: {e}")))?;

    fs::write(path, json).map_err(|e| AppError::Settings(format!("write {}: {e}", path.display())))
}

pub fn get_custom_install_dir(settings: &Settings) -> Option<PathBuf> {
    settings
        .install_dir
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}
