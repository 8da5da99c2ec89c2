use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Voice files end with this extension once fully installed.
const VOICE_EXTENSION: &str = "flitevox";

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("{0} is not installed")]
    NotFound(String),

    #[error("Permission denied removing {0}")]
    PermissionDenied(String),

    #[error("I/O error removing {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl InventoryError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "The voice file was not found on this computer.",
            Self::PermissionDenied(_) => {
                "The voice file could not be removed. Check folder permissions."
            }
            Self::Io { .. } => "The voice file could not be removed.",
        }
    }
}

/// Filesystem view of the install directory. Every query hits the disk.
#[derive(Clone, Debug)]
pub struct Inventory {
    root: PathBuf,
}

impl Inventory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn is_present(&self, filename: &str) -> bool {
        self.path_for(filename).is_file()
    }

    pub fn delete(&self, filename: &str) -> Result<(), InventoryError> {
        let path = self.path_for(filename);
        if !path.is_file() {
            return Err(InventoryError::NotFound(filename.to_string()));
        }

        fs::remove_file(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => InventoryError::NotFound(filename.to_string()),
            ErrorKind::PermissionDenied => InventoryError::PermissionDenied(filename.to_string()),
            _ => InventoryError::Io {
                name: filename.to_string(),
                source,
            },
        })
    }

    /// Names of the voice files currently in the directory.
    pub fn installed_files(&self) -> std::io::Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        if !self.root.is_dir() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            let is_voice = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(VOICE_EXTENSION));
            if !is_voice {
                log::trace!("Skipping non-voice file {}", path.display());
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }

        Ok(names)
    }
}
