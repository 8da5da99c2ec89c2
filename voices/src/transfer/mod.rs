mod client;
mod lock;
mod manager;

use serde::Serialize;
use thiserror::Error;

use crate::store::InventoryError;

pub use client::{FetchError, HttpTransferClient, TransferClient};
pub use lock::{TransferGuard, TransferLock};
pub use manager::TransferManager;

pub fn asset_url(base_url: &str, filename: &str) -> String {
    format!("{}/{filename}", base_url.trim_end_matches('/'))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Install,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferJob {
    pub target_filename: String,
    pub direction: TransferDirection,
    pub status: TransferStatus,
}

impl TransferJob {
    pub fn new(target_filename: impl Into<String>, direction: TransferDirection) -> Self {
        Self {
            target_filename: target_filename.into(),
            direction,
            status: TransferStatus::Pending,
        }
    }

    pub fn begin(&mut self) {
        if self.status == TransferStatus::Pending {
            self.status = TransferStatus::InProgress;
        }
    }

    pub fn finish(&mut self, succeeded: bool) {
        self.status = if succeeded {
            TransferStatus::Succeeded
        } else {
            TransferStatus::Failed
        };
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TransferStatus::Succeeded | TransferStatus::Failed
        )
    }
}

/// Posted by the transfer worker to the thread that owns the item list.
#[derive(Debug)]
pub enum TransferUpdate {
    Progress {
        filename: String,
        percent: u8,
    },
    Finished {
        filename: String,
        result: Result<(), TransferError>,
    },
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Another transfer is already in progress")]
    AlreadyBusy,

    #[error("{0} is required and cannot be changed")]
    Required(String),

    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Inventory(#[from] InventoryError),

    #[error("Could not start transfer worker: {0}")]
    Spawn(#[source] std::io::Error),
}

impl TransferError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AlreadyBusy => "Please wait for the current download to finish.",
            Self::Required(_) => "This voice is required and cannot be added or removed.",
            Self::Fetch(err) => err.user_message(),
            Self::Inventory(err) => err.user_message(),
            Self::Spawn(_) => "The download could not be completed.",
        }
    }
}
