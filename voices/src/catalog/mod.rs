mod client;
mod parser;

use serde::Serialize;
use thiserror::Error;

use crate::transfer::FetchError;

pub use client::CatalogClient;
pub use parser::{classify_token, parse_catalog, TokenKind};

/// The voice the screen reader needs; never offered for removal.
pub const BASELINE_FILENAME: &str = "H2R_en_Indic-English_Male.flitevox";

/// Add-on package published alongside the voices.
pub const INSTALLER_ARTIFACT: &str = "Hear2Read voice.nvda-addon";

pub const EXECUTABLE_EXTENSION: &str = "exe";

pub const CATALOG_DELIMITER: char = '|';

pub fn is_baseline(filename: &str) -> bool {
    filename == BASELINE_FILENAME
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub filename: String,
    pub prefix: String,
    pub language_token: String,
    pub display_name: String,
    pub is_mandatory: bool,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog listing unavailable: {0}")]
    Listing(#[source] FetchError),

    #[error("Baseline voice unavailable: {0}")]
    Baseline(#[source] FetchError),

    #[error("Install directory unavailable: {0}")]
    InstallDir(#[source] std::io::Error),
}

impl CatalogError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Listing(_) => {
                "Could not load the list of voices. Check your internet connection and try again."
            }
            Self::Baseline(_) => "Error downloading file H2R_en_Indic-English_Male.flitevox",
            Self::InstallDir(_) => {
                "The voices folder could not be created. Check disk space and permissions."
            }
        }
    }
}
