use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::transfer::{asset_url, TransferClient};

use super::{CatalogError, BASELINE_FILENAME};

/// Fetches the published voice listing and the baseline voice. No retries.
pub struct CatalogClient {
    client: Arc<dyn TransferClient>,
    catalog_url: String,
    asset_base_url: String,
}

impl CatalogClient {
    pub fn new(
        client: Arc<dyn TransferClient>,
        catalog_url: impl Into<String>,
        asset_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            catalog_url: catalog_url.into(),
            asset_base_url: asset_base_url.into(),
        }
    }

    pub fn fetch_catalog(&self) -> Result<String, CatalogError> {
        log::info!("Fetching voice catalog from {}", self.catalog_url);
        self.client
            .fetch_string(&self.catalog_url)
            .map_err(CatalogError::Listing)
    }

    /// Blocking download of the baseline voice to `destination`.
    pub fn fetch_baseline_asset(&self, destination: &Path) -> Result<(), CatalogError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(CatalogError::InstallDir)?;
        }

        let url = asset_url(&self.asset_base_url, BASELINE_FILENAME);
        log::info!("Downloading baseline voice from {url}");

        self.client
            .fetch_to_file(&url, destination, &mut |_: u8| {})
            .map_err(|err| {
                log::error!("Baseline voice download failed: {err}");
                CatalogError::Baseline(err)
            })
    }
}
