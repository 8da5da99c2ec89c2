use crate::catalog::BASELINE_FILENAME;
use crate::settings::{settings_path, Settings};
use crate::store::Inventory;

pub fn run_startup_checks(settings: &Settings, inventory: &Inventory) {
    log::info!("=== Startup Diagnostics ===");
    log::info!("Settings file: {}", settings_path().display());
    log::info!("Catalog: {}", settings.catalog_url);
    log::info!("Voice downloads: {}", settings.asset_base_url);
    log::info!(
        "Usage reporting: {}",
        if settings.telemetry_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    check_install_dir(inventory);
    log::info!("===========================");
}

fn check_install_dir(inventory: &Inventory) {
    let root = inventory.root();
    if !root.is_dir() {
        log::warn!("Voice directory {} does not exist yet", root.display());
        return;
    }
    log::info!("Voice directory: {}", root.display());

    match inventory.installed_files() {
        Ok(files) => {
            log::info!("Installed voices ({}):", files.len());
            for (i, file) in files.iter().enumerate() {
                log::info!("  {}. {}", i + 1, file);
            }
            if !files.contains(BASELINE_FILENAME) {
                log::warn!("Baseline voice {BASELINE_FILENAME} is missing");
            }
        }
        Err(e) => log::error!("Failed to list voice directory: {e}"),
    }
}
