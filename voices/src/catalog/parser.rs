//! Turns the `|`-delimited catalog listing into voice entries.

use std::collections::HashSet;

use super::{
    is_baseline, CatalogEntry, CATALOG_DELIMITER, EXECUTABLE_EXTENSION, INSTALLER_ARTIFACT,
};

const SEGMENT_DELIMITER: char = '_';
const SEGMENT_COUNT: usize = 4;

/// How a single catalog token is treated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Empty,
    InstallerArtifact,
    Executable,
    Malformed,
    Voice(CatalogEntry),
}

pub fn classify_token(raw: &str) -> TokenKind {
    let token = raw.trim();

    if token.is_empty() {
        return TokenKind::Empty;
    }
    if token == INSTALLER_ARTIFACT {
        return TokenKind::InstallerArtifact;
    }
    if is_baseline(token) {
        return match build_entry(token) {
            Some(entry) => TokenKind::Voice(entry),
            None => TokenKind::Malformed,
        };
    }
    // Filenames are joined onto the install directory.
    if token.contains(['/', '\\']) {
        return TokenKind::Malformed;
    }
    if token.split(SEGMENT_DELIMITER).count() != SEGMENT_COUNT {
        return TokenKind::Malformed;
    }
    if has_executable_extension(token) {
        return TokenKind::Executable;
    }

    match build_entry(token) {
        Some(entry) => TokenKind::Voice(entry),
        None => TokenKind::Malformed,
    }
}

/// Parses a raw listing, keeping catalog order.
///
/// A repeated filename yields an entry identical to the earlier one, so
/// keeping either copy gives the same item. The first occurrence's position
/// is kept rather than the last's.
pub fn parse_catalog(listing: &str) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for token in listing.split(CATALOG_DELIMITER) {
        match classify_token(token) {
            TokenKind::Voice(entry) => {
                if seen.insert(entry.filename.clone()) {
                    entries.push(entry);
                } else {
                    log::debug!("Duplicate catalog entry {}", entry.filename);
                }
            }
            TokenKind::Empty => {}
            other => log::trace!("Skipping catalog token {:?}: {:?}", token.trim(), other),
        }
    }

    log::debug!("Parsed {} voices from catalog", entries.len());
    entries
}

fn has_executable_extension(token: &str) -> bool {
    token
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(EXECUTABLE_EXTENSION))
}

fn build_entry(filename: &str) -> Option<CatalogEntry> {
    let segments: Vec<&str> = filename.split(SEGMENT_DELIMITER).collect();
    let [prefix, language, region, name] = segments[..] else {
        return None;
    };

    let name = name.split('.').next().unwrap_or_default();

    Some(CatalogEntry {
        filename: filename.to_string(),
        prefix: prefix.to_string(),
        language_token: language.to_string(),
        display_name: format!("{region} {name}"),
        is_mandatory: is_baseline(filename),
    })
}
