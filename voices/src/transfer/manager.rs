//! Executes installs on a background worker and removals in place, one
//! transfer at a time.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;

use super::{
    asset_url, TransferClient, TransferDirection, TransferError, TransferJob, TransferLock,
    TransferUpdate,
};
use crate::catalog::is_baseline;
use crate::store::Inventory;

const WORKER_NAME: &str = "voice-transfer";

pub struct TransferManager {
    client: Arc<dyn TransferClient>,
    inventory: Inventory,
    asset_base_url: String,
    lock: TransferLock,
    updates: Sender<TransferUpdate>,
}

impl TransferManager {
    pub fn new(
        client: Arc<dyn TransferClient>,
        inventory: Inventory,
        asset_base_url: impl Into<String>,
        updates: Sender<TransferUpdate>,
    ) -> Self {
        Self {
            client,
            inventory,
            asset_base_url: asset_base_url.into(),
            lock: TransferLock::new(),
            updates,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock.is_held()
    }

    /// Starts downloading `filename` unless a transfer is already running.
    /// A rejected call has no side effects.
    pub fn start_install(&self, filename: &str) -> Result<TransferJob, TransferError> {
        if is_baseline(filename) {
            return Err(TransferError::Required(filename.to_string()));
        }

        let guard = self.lock.try_acquire().ok_or_else(|| {
            log::info!("Install of {filename} rejected: transfer already in progress");
            TransferError::AlreadyBusy
        })?;

        let mut job = TransferJob::new(filename, TransferDirection::Install);

        let client = Arc::clone(&self.client);
        let updates = self.updates.clone();
        let url = asset_url(&self.asset_base_url, filename);
        let dest = self.inventory.path_for(filename);
        let target = filename.to_string();

        thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let mut on_progress = |percent: u8| {
                    let _ = updates.send(TransferUpdate::Progress {
                        filename: target.clone(),
                        percent,
                    });
                };

                let result = client
                    .fetch_to_file(&url, &dest, &mut on_progress)
                    .map_err(TransferError::from);

                match &result {
                    Ok(()) => log::info!("Installed {} at {}", target, dest.display()),
                    Err(err) => log::error!("Install of {target} failed: {err}"),
                }

                // Free the slot before the owner hears about completion.
                drop(guard);
                let _ = updates.send(TransferUpdate::Finished {
                    filename: target,
                    result,
                });
            })
            .map_err(TransferError::Spawn)?;

        job.begin();
        Ok(job)
    }

    /// Deletes an installed voice. Runs synchronously and does not take the
    /// transfer lock.
    pub fn remove(&self, filename: &str) -> Result<(), TransferError> {
        if is_baseline(filename) {
            return Err(TransferError::Required(filename.to_string()));
        }

        self.inventory.delete(filename)?;
        log::info!("Removed {filename}");
        Ok(())
    }
}
