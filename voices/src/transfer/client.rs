use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("h2r-voice-manager/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{url}: request failed: {message}")]
    Request { url: String, message: String },

    #[error("{url}: unexpected status {status}")]
    Status { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Request { .. } | Self::Status { .. } => {
                "The Hear2Read server could not be reached. Check your internet connection."
            }
            Self::Io(_) => {
                "The app could not write its local files. Check disk space and permissions."
            }
        }
    }
}

/// Opaque HTTP collaborator. Implementations must be shareable with the
/// transfer worker thread.
pub trait TransferClient: Send + Sync {
    fn fetch_string(&self, url: &str) -> Result<String, FetchError>;

    /// Writes the body at `url` to `dest`. `on_progress` receives
    /// non-decreasing percentages ending at 100 on success. `dest` is only
    /// created once the whole body has arrived.
    fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(), FetchError>;
}

pub struct HttpTransferClient {
    http: reqwest::blocking::Client,
}

impl HttpTransferClient {
    pub fn new() -> Result<Self, FetchError> {
        // No overall timeout: voice files are large and downloads run to completion.
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(None)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: format!("client setup: {e}"),
            })?;

        Ok(Self { http })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let response = self.http.get(url).send().map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl TransferClient for HttpTransferClient {
    fn fetch_string(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("GET {url}");
        self.get(url)?.text().map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: format!("read body: {e}"),
        })
    }

    fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(), FetchError> {
        let tmp = partial_path(dest);
        let result = download_once(self, url, &tmp, dest, on_progress);

        if result.is_err() && tmp.exists() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

fn download_once(
    client: &HttpTransferClient,
    url: &str,
    tmp: &Path,
    dest: &Path,
    on_progress: &mut dyn FnMut(u8),
) -> Result<(), FetchError> {
    log::info!("Downloading voice to {} from {url}", dest.display());

    let response = client.get(url)?;
    let total_size = response.content_length().unwrap_or(0);

    let mut tracker = ProgressTracker::new(total_size);
    on_progress(0);

    let mut file = fs::File::create(tmp)?;
    let mut reader = response;
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: format!("read failed: {e}"),
        })?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])?;

        if let Some(percent) = tracker.advance(bytes_read as u64) {
            on_progress(percent);
        }
    }

    if total_size > 0 && tracker.downloaded != total_size {
        return Err(FetchError::Request {
            url: url.to_string(),
            message: format!(
                "incomplete download: expected {} bytes, got {}",
                total_size, tracker.downloaded
            ),
        });
    }

    file.flush()?;
    drop(file);
    fs::rename(tmp, dest)?;

    if tracker.last_percent < 100 {
        on_progress(100);
    }
    Ok(())
}

pub(crate) fn partial_path(dest: &Path) -> std::path::PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".download");
    dest.with_file_name(name)
}

/// Turns byte counts into whole percentages, reporting each value once.
struct ProgressTracker {
    total: u64,
    downloaded: u64,
    last_percent: u8,
}

impl ProgressTracker {
    fn new(total: u64) -> Self {
        Self {
            total,
            downloaded: 0,
            last_percent: 0,
        }
    }

    fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.downloaded += bytes;
        if self.total == 0 {
            return None;
        }

        let percent = (self.downloaded.saturating_mul(100) / self.total).min(100) as u8;
        if percent > self.last_percent {
            self.last_percent = percent;
            Some(percent)
        } else {
            None
        }
    }
}
