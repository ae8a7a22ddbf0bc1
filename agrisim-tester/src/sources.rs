//! Platform adapters for the season runner: HTTP weather, file-backed handoff
//! storage and a fixed-name geocoder.
use agrisim_game::{
    GeoPoint, HandoffState, HandoffStore, RawDay, ReverseGeocoder, SimError, SimResult,
    UpstreamRequest, WeatherSource, parse_upstream_response,
};
use async_trait::async_trait;
use reqwest::Client;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Daily point weather over HTTP.
#[derive(Clone)]
pub struct PowerClient {
    client: Client,
    base_url: String,
}

impl PowerClient {
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }
}

#[async_trait]
impl WeatherSource for PowerClient {
    async fn fetch(&self, request: &UpstreamRequest) -> SimResult<Vec<RawDay>> {
        let url = request.to_url(&self.base_url);
        log::debug!("fetching {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SimError::UpstreamDataUnavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SimError::UpstreamDataUnavailable(format!(
                "upstream returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SimError::UpstreamDataUnavailable(format!("unreadable body: {e}")))?;
        parse_upstream_response(&body)
    }
}

/// Handoff record kept as a JSON file between runs.
#[derive(Debug, Clone)]
pub struct FileHandoffStore {
    path: PathBuf,
}

impl FileHandoffStore {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn io_error(action: &str, path: &std::path::Path, err: std::io::Error) -> SimError {
    SimError::Storage {
        context: format!("{action} {}", path.display()),
        source: err,
    }
}

impl HandoffStore for FileHandoffStore {
    fn save_handoff(&self, handoff: &HandoffState) -> SimResult<()> {
        let encoded = serde_json::to_string_pretty(handoff)?;
        fs::write(&self.path, encoded).map_err(|e| io_error("write", &self.path, e))
    }

    fn load_handoff(&self) -> SimResult<Option<HandoffState>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => HandoffState::from_json(&raw).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error("read", &self.path, err)),
        }
    }

    fn clear_handoff(&self) -> SimResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", &self.path, err)),
        }
    }
}

/// Geocoder that only knows the name given on the command line.
pub struct FixedNameGeocoder(pub Option<String>);

impl ReverseGeocoder for FixedNameGeocoder {
    fn display_name(&self, _point: GeoPoint) -> SimResult<String> {
        self.0
            .clone()
            .ok_or_else(|| SimError::UpstreamDataUnavailable("no geocoder configured".into()))
    }
}
