//! Derives each voice's displayed state from the catalog and the disk.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::store::Inventory;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Install,
    Remove,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoiceItem {
    pub entry: CatalogEntry,
    pub installed: bool,
    pub action: ItemAction,
    pub progress_percent: u8,
}

impl VoiceItem {
    pub fn filename(&self) -> &str {
        &self.entry.filename
    }

    pub fn display_name(&self) -> &str {
        &self.entry.display_name
    }
}

/// Builds a fresh item list in catalog order.
///
/// The baseline voice is always reported installed with no action, even if
/// it is missing on disk.
pub fn reconcile(entries: &[CatalogEntry], inventory: &Inventory) -> Vec<VoiceItem> {
    entries
        .iter()
        .map(|entry| {
            let (installed, action) = if entry.is_mandatory {
                (true, ItemAction::None)
            } else if inventory.is_present(&entry.filename) {
                (true, ItemAction::Remove)
            } else {
                (false, ItemAction::Install)
            };

            VoiceItem {
                entry: entry.clone(),
                installed,
                action,
                progress_percent: 0,
            }
        })
        .collect()
}

/// Ordered items addressable by filename.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoiceList {
    items: Vec<VoiceItem>,
    index: HashMap<String, usize>,
}

impl VoiceList {
    pub fn new(items: Vec<VoiceItem>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.entry.filename.clone(), position))
            .collect();
        Self { items, index }
    }

    pub fn items(&self) -> &[VoiceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, filename: &str) -> Option<&VoiceItem> {
        self.index.get(filename).map(|&position| &self.items[position])
    }

    pub fn get_mut(&mut self, filename: &str) -> Option<&mut VoiceItem> {
        match self.index.get(filename) {
            Some(&position) => self.items.get_mut(position),
            None => None,
        }
    }

    /// 1-based position, as shown to the user.
    pub fn by_number(&self, number: usize) -> Option<&VoiceItem> {
        number.checked_sub(1).and_then(|position| self.items.get(position))
    }

    pub fn find_by_display_name(&self, name: &str) -> Option<&VoiceItem> {
        let name = name.trim();
        self.items
            .iter()
            .find(|item| item.entry.display_name.eq_ignore_ascii_case(name))
    }
}
