//! Best-effort usage pings after a voice is added or removed.

use std::sync::{Arc, OnceLock};
use std::thread;

use crate::settings::Settings;
use crate::transfer::{FetchError, TransferClient};

const UNKNOWN_ADDRESS: &str = "unknown";

pub trait UsageReporter: Send + Sync {
    fn report_install(&self, filename: &str);
    fn report_remove(&self, filename: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageKind {
    Install,
    Remove,
}

impl UsageKind {
    fn query_key(self) -> &'static str {
        match self {
            Self::Install => "file",
            Self::Remove => "removed",
        }
    }
}

/// Values are single-quoted, matching what the logging endpoint records,
/// and percent-encoded along with the quotes.
pub fn usage_url(
    endpoint: &str,
    kind: UsageKind,
    filename: &str,
    address: &str,
) -> Result<String, FetchError> {
    let mut url = reqwest::Url::parse(endpoint).map_err(|e| FetchError::Request {
        url: endpoint.to_string(),
        message: format!("invalid endpoint: {e}"),
    })?;

    url.query_pairs_mut()
        .append_pair(kind.query_key(), &format!("'{filename}'"))
        .append_pair("ip", &format!("'{address}'"));

    Ok(url.into())
}

pub struct HttpUsageReporter {
    client: Arc<dyn TransferClient>,
    endpoint: String,
    ip_lookup_url: String,
    address: Arc<OnceLock<String>>,
}

impl HttpUsageReporter {
    pub fn new(
        client: Arc<dyn TransferClient>,
        endpoint: impl Into<String>,
        ip_lookup_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            ip_lookup_url: ip_lookup_url.into(),
            address: Arc::new(OnceLock::new()),
        }
    }

    fn spawn_report(&self, kind: UsageKind, filename: &str) {
        let client = Arc::clone(&self.client);
        let endpoint = self.endpoint.clone();
        let lookup_url = self.ip_lookup_url.clone();
        let address = Arc::clone(&self.address);
        let filename = filename.to_string();

        let spawned = thread::Builder::new()
            .name("usage-report".to_string())
            .spawn(move || {
                let address = address.get_or_init(|| public_address(client.as_ref(), &lookup_url));
                let sent = usage_url(&endpoint, kind, &filename, address)
                    .and_then(|url| client.fetch_string(&url));
                if let Err(err) = sent {
                    log::debug!("Usage report for {filename} dropped: {err}");
                }
            });

        if let Err(err) = spawned {
            log::debug!("Usage report thread not started: {err}");
        }
    }
}

impl UsageReporter for HttpUsageReporter {
    fn report_install(&self, filename: &str) {
        self.spawn_report(UsageKind::Install, filename);
    }

    fn report_remove(&self, filename: &str) {
        self.spawn_report(UsageKind::Remove, filename);
    }
}

/// Used when usage reporting is switched off.
#[derive(Default)]
pub struct DisabledReporter;

impl UsageReporter for DisabledReporter {
    fn report_install(&self, _filename: &str) {}
    fn report_remove(&self, _filename: &str) {}
}

pub fn reporter_from_settings(
    settings: &Settings,
    client: Arc<dyn TransferClient>,
) -> Arc<dyn UsageReporter> {
    if settings.telemetry_enabled {
        Arc::new(HttpUsageReporter::new(
            client,
            settings.telemetry_url.as_str(),
            settings.ip_lookup_url.as_str(),
        ))
    } else {
        log::info!("Usage reporting disabled");
        Arc::new(DisabledReporter)
    }
}

fn public_address(client: &dyn TransferClient, lookup_url: &str) -> String {
    match client.fetch_string(lookup_url) {
        Ok(body) => {
            let address = body.trim();
            if address.is_empty() {
                UNKNOWN_ADDRESS.to_string()
            } else {
                address.to_string()
            }
        }
        Err(err) => {
            log::debug!("Public address lookup failed: {err}");
            UNKNOWN_ADDRESS.to_string()
        }
    }
}
