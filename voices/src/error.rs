use thiserror::Error;

use crate::catalog::CatalogError;
use crate::store::InventoryError;
use crate::transfer::TransferError;

/// Unified app errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Transfer: {0}")]
    Transfer(#[from] TransferError),

    #[error("Inventory: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("{0} is already installed")]
    AlreadyInstalled(String),

    #[error("Settings: {0}")]
    Settings(String),
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(err) => err.user_message().to_string(),
            Self::Transfer(err) => err.user_message().to_string(),
            Self::Inventory(err) => err.user_message().to_string(),
            Self::UnknownVoice(name) => format!("No voice named \"{name}\" in the list."),
            Self::AlreadyInstalled(name) => format!("{name} is already on this computer."),
            Self::Settings(_) => "The settings file could not be read or written.".to_string(),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
