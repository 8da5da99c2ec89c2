#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::Receiver;
use hear2read_voices_lib::settings::Settings;
use hear2read_voices_lib::telemetry::UsageReporter;
use hear2read_voices_lib::transfer::{FetchError, TransferClient};
use hear2read_voices_lib::VoiceEngine;

pub const CATALOG_URL: &str = "https://catalog.test/getFlitevoxNames.php";
pub const ASSET_BASE_URL: &str = "https://assets.test/NVDA-Addon";
pub const HINDI: &str = "H2R_hi_Hindi_Female.flitevox";
pub const TAMIL: &str = "H2R_ta_Tamil_Male.flitevox";
pub const SCENARIO_A: &str =
    "H2R_en_Indic-English_Male.flitevox|H2R_hi_Hindi_Female.flitevox|Hear2Read voice.nvda-addon|";

pub fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "h2r_{label}_{}_{}",
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

pub fn settings_for(dir: &Path) -> Settings {
    Settings {
        install_dir: Some(dir.to_string_lossy().to_string()),
        catalog_url: CATALOG_URL.to_string(),
        asset_base_url: ASSET_BASE_URL.to_string(),
        telemetry_enabled: false,
        ..Settings::default()
    }
}

/// In-memory stand-in for the HTTP client.
pub struct FakeClient {
    pub listing: Mutex<Option<String>>,
    pub fail_downloads: Mutex<bool>,
    pub gate: Mutex<Option<Receiver<()>>>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new(listing: &str) -> Arc<Self> {
        Arc::new(Self {
            listing: Mutex::new(Some(listing.to_string())),
            fail_downloads: Mutex::new(false),
            gate: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn offline() -> Arc<Self> {
        let client = Self::new("");
        *client.listing.lock().unwrap() = None;
        *client.fail_downloads.lock().unwrap() = true;
        client
    }

    /// Downloads stall at 25% until the returned sender fires or is dropped.
    pub fn hold_downloads(&self) -> crossbeam_channel::Sender<()> {
        let (tx, rx) = crossbeam_channel::unbounded();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.starts_with(ASSET_BASE_URL))
            .count()
    }
}

impl TransferClient for FakeClient {
    fn fetch_string(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match &*self.listing.lock().unwrap() {
            Some(listing) if url == CATALOG_URL => Ok(listing.clone()),
            _ => Err(FetchError::Request {
                url: url.to_string(),
                message: "offline".to_string(),
            }),
        }
    }

    fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(), FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        on_progress(0);
        on_progress(25);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        if *self.fail_downloads.lock().unwrap() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }

        for percent in [50, 75, 100] {
            on_progress(percent);
        }
        fs::write(dest, b"flitevox")?;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub installs: Mutex<Vec<String>>,
    pub removes: Mutex<Vec<String>>,
}

impl UsageReporter for RecordingReporter {
    fn report_install(&self, filename: &str) {
        self.installs.lock().unwrap().push(filename.to_string());
    }

    fn report_remove(&self, filename: &str) {
        self.removes.lock().unwrap().push(filename.to_string());
    }
}

pub fn engine_with(
    dir: &Path,
    client: Arc<FakeClient>,
) -> (VoiceEngine, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = VoiceEngine::new(&settings_for(dir), client, reporter.clone());
    (engine, reporter)
}
