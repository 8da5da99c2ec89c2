use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::{get_custom_install_dir, Settings};

use super::{LANGUAGES_DIR, VENDOR_DIR};

pub fn default_install_dir(settings: &Settings) -> PathBuf {
    if let Some(path) = get_custom_install_dir(settings) {
        return path;
    }

    fallback_install_dir()
}

pub fn fallback_install_dir() -> PathBuf {
    let base = dirs_next::data_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(VENDOR_DIR).join(LANGUAGES_DIR)
}

/// Creates the directory tree if missing; existing trees are left alone.
pub fn ensure_install_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    log::info!("Creating voice directory {}", path.display());
    fs::create_dir_all(path)
}
