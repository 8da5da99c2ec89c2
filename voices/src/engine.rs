//! Single-owner facade over catalog, inventory and transfers.
//!
//! The engine lives on the presentation thread. Transfer workers only post
//! [`TransferUpdate`]s; every item mutation happens here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::catalog::{parse_catalog, CatalogClient, CatalogEntry, CatalogError, BASELINE_FILENAME};
use crate::events::VoiceEvent;
use crate::reconcile::{reconcile, ItemAction, VoiceItem, VoiceList};
use crate::settings::Settings;
use crate::store::{default_install_dir, ensure_install_dir, Inventory};
use crate::telemetry::UsageReporter;
use crate::transfer::{
    TransferClient, TransferDirection, TransferError, TransferJob, TransferManager, TransferUpdate,
};
use crate::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyInstalled,
    Downloaded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

pub struct VoiceEngine {
    catalog: CatalogClient,
    inventory: Inventory,
    transfers: TransferManager,
    reporter: Arc<dyn UsageReporter>,
    updates: Receiver<TransferUpdate>,
    entries: Vec<CatalogEntry>,
    items: VoiceList,
    active: Option<TransferJob>,
    status: Option<StatusLine>,
    subscribers: Vec<Sender<VoiceEvent>>,
}

impl VoiceEngine {
    pub fn new(
        settings: &Settings,
        client: Arc<dyn TransferClient>,
        reporter: Arc<dyn UsageReporter>,
    ) -> Self {
        let inventory = Inventory::new(default_install_dir(settings));
        let (tx, rx) = unbounded();

        Self {
            catalog: CatalogClient::new(
                Arc::clone(&client),
                settings.catalog_url.as_str(),
                settings.asset_base_url.as_str(),
            ),
            transfers: TransferManager::new(
                client,
                inventory.clone(),
                settings.asset_base_url.as_str(),
                tx,
            ),
            inventory,
            reporter,
            updates: rx,
            entries: Vec::new(),
            items: VoiceList::default(),
            active: None,
            status: None,
            subscribers: Vec::new(),
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn items(&self) -> &[VoiceItem] {
        self.items.items()
    }

    pub fn list(&self) -> &VoiceList {
        &self.items
    }

    pub fn active_job(&self) -> Option<&TransferJob> {
        self.active.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some() || self.transfers.is_busy()
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Receiver side of the worker channel, for callers that multiplex it
    /// with other input. Pass what it yields to [`Self::handle_update`].
    pub fn update_receiver(&self) -> Receiver<TransferUpdate> {
        self.updates.clone()
    }

    pub fn subscribe(&mut self) -> Receiver<VoiceEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Makes sure the install directory and baseline voice exist. Blocking;
    /// call once before the catalog is loaded.
    pub fn bootstrap(&mut self) -> Result<BootstrapOutcome, CatalogError> {
        ensure_install_dir(self.inventory.root()).map_err(CatalogError::InstallDir)?;

        if self.inventory.is_present(BASELINE_FILENAME) {
            log::info!("Baseline voice present in {}", self.inventory.root().display());
            return Ok(BootstrapOutcome::AlreadyInstalled);
        }

        let dest = self.inventory.path_for(BASELINE_FILENAME);
        match self.catalog.fetch_baseline_asset(&dest) {
            Ok(()) => Ok(BootstrapOutcome::Downloaded),
            Err(err) => {
                self.set_status(err.user_message().to_string(), true);
                Err(err)
            }
        }
    }

    /// Reloads the catalog. On failure the previous entries are kept.
    pub fn refresh_catalog(&mut self) -> Result<(), CatalogError> {
        match self.catalog.fetch_catalog() {
            Ok(listing) => {
                self.load_catalog(&listing);
                Ok(())
            }
            Err(err) => {
                log::error!("Catalog refresh failed: {err}");
                self.set_status(err.user_message().to_string(), true);
                self.reconcile();
                Err(err)
            }
        }
    }

    pub fn load_catalog(&mut self, listing: &str) {
        self.entries = parse_catalog(listing);
        log::info!("Catalog lists {} voices", self.entries.len());
        self.reconcile();
    }

    /// Rebuilds the item list. The running download keeps its progress.
    pub fn reconcile(&mut self) {
        let mut items = VoiceList::new(reconcile(&self.entries, &self.inventory));
        if let Some(job) = &self.active {
            let percent = self
                .items
                .get(&job.target_filename)
                .map_or(0, |item| item.progress_percent);
            if let Some(item) = items.get_mut(&job.target_filename) {
                item.progress_percent = percent;
            }
        }
        self.items = items;
        let items = self.items.items().to_vec();
        self.emit(VoiceEvent::ListRefreshed { items });
    }

    /// Runs whatever action the item currently offers.
    pub fn toggle(&mut self, filename: &str) -> Result<(), AppError> {
        let action = self
            .items
            .get(filename)
            .map(|item| item.action)
            .ok_or_else(|| AppError::UnknownVoice(filename.to_string()))?;

        match action {
            ItemAction::Install => self.start_install(filename).map_err(AppError::from),
            ItemAction::Remove => self.remove(filename).map_err(AppError::from),
            ItemAction::None => Err(TransferError::Required(filename.to_string()).into()),
        }
    }

    /// Starts a download. Stays rejected until the previous install's
    /// completion has been applied, even if its worker already exited.
    pub fn start_install(&mut self, filename: &str) -> Result<(), TransferError> {
        if let Some(job) = &self.active {
            log::info!(
                "Install of {filename} rejected: {} not finished",
                job.target_filename
            );
            return Err(TransferError::AlreadyBusy);
        }

        match self.transfers.start_install(filename) {
            Ok(job) => {
                self.clear_status();
                self.active = Some(job);
                if let Some(item) = self.items.get_mut(filename) {
                    item.progress_percent = 0;
                }
                Ok(())
            }
            Err(TransferError::AlreadyBusy) => Err(TransferError::AlreadyBusy),
            Err(err) => {
                self.set_status(
                    format!("Error downloading file {filename}: {}", err.user_message()),
                    true,
                );
                Err(err)
            }
        }
    }

    pub fn remove(&mut self, filename: &str) -> Result<(), TransferError> {
        let name = self.display_name(filename);
        let mut job = TransferJob::new(filename, TransferDirection::Remove);
        job.begin();

        match self.transfers.remove(filename) {
            Ok(()) => {
                job.finish(true);
                self.reporter.report_remove(filename);
                self.set_status(format!("{name} Removed"), false);
                self.reconcile();
                self.emit(VoiceEvent::TransferFinished { job, error: None });
                Ok(())
            }
            Err(err) => {
                log::warn!("Removing {filename} failed: {err}");
                job.finish(false);
                self.set_status(format!("Error Removing {name}"), true);
                self.emit(VoiceEvent::TransferFinished {
                    job,
                    error: Some(err.to_string()),
                });
                Err(err)
            }
        }
    }

    /// Applies one worker update. Must run on the thread that owns the engine.
    pub fn handle_update(&mut self, update: TransferUpdate) {
        match update {
            TransferUpdate::Progress { filename, percent } => {
                self.apply_progress(&filename, percent)
            }
            TransferUpdate::Finished { filename, result } => self.finish_install(filename, result),
        }
    }

    /// Applies every update already queued. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let pending: Vec<TransferUpdate> = self.updates.try_iter().collect();
        let count = pending.len();
        for update in pending {
            self.handle_update(update);
        }
        count
    }

    /// Blocks for at most `timeout` waiting for the next update.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        match self.updates.recv_timeout(timeout) {
            Ok(update) => {
                self.handle_update(update);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Drives updates until the active install finishes or `timeout` passes.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.active.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.wait_for_update(remaining);
        }
        true
    }

    fn apply_progress(&mut self, filename: &str, percent: u8) {
        let percent = percent.min(100);
        let Some(item) = self.items.get_mut(filename) else {
            log::trace!("Progress for {filename} not in the current list");
            return;
        };

        // Never move backwards within one transfer.
        if percent < item.progress_percent {
            return;
        }
        item.progress_percent = percent;

        self.emit(VoiceEvent::TransferProgress {
            filename: filename.to_string(),
            percent,
        });
    }

    fn finish_install(&mut self, filename: String, result: Result<(), TransferError>) {
        let mut job = match self.active.take() {
            Some(job) if job.target_filename == filename => job,
            other => {
                log::warn!("Completion for {filename} without a matching job");
                self.active = other;
                TransferJob::new(&filename, TransferDirection::Install)
            }
        };
        let name = self.display_name(&filename);

        match result {
            Ok(()) => {
                job.finish(true);
                if let Some(item) = self.items.get_mut(&filename) {
                    item.installed = true;
                    item.action = ItemAction::Remove;
                    item.progress_percent = 100;
                    let item = item.clone();
                    self.emit(VoiceEvent::ItemUpdated { item });
                }
                self.reporter.report_install(&filename);
                self.set_status(format!("{name} Added"), false);
                self.reconcile();
                self.emit(VoiceEvent::TransferFinished { job, error: None });
            }
            Err(err) => {
                job.finish(false);
                self.set_status(format!("Error downloading file {filename}"), true);
                self.reconcile();
                self.emit(VoiceEvent::TransferFinished {
                    job,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    fn display_name(&self, filename: &str) -> String {
        self.items
            .get(filename)
            .map(|item| item.display_name().to_string())
            .unwrap_or_else(|| filename.to_string())
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        if is_error {
            log::warn!("{message}");
        } else {
            log::info!("{message}");
        }
        self.status = Some(StatusLine {
            message: message.clone(),
            is_error,
        });
        self.emit(VoiceEvent::Status { message, is_error });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn emit(&mut self, event: VoiceEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
