use crate::core::error::{Error, Result};
use crate::core::models::{Sample, SampleValue};
use crate::core::store::SampleStore;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// How often a window wakes up to check whether the interval has elapsed.
/// Sampling therefore lags the requested interval by up to one granularity
/// period.
pub const POLL_GRANULARITY: Duration = Duration::from_secs(10);

/// Whether a collection window recorded a sample or was shut down first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    Sampled,
    Cancelled,
}

/// Polls a routing API for one route and accumulates timestamped travel
/// duration samples in a [`SampleStore`].
///
/// The request configuration (base URL, parameter map, API key) is fixed
/// for the lifetime of the sampler. Each collection window performs exactly
/// one request; any failure aborts the window without touching the store.
pub struct RouteSampler {
    client: reqwest::Client,
    base_url: String,
    params: BTreeMap<String, Option<String>>,
    api_key: String,
    store: SampleStore,
}

impl RouteSampler {
    /// Opens (or initializes) the store at `store_path` and binds the
    /// request configuration.
    pub fn new(
        store_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
        params: BTreeMap<String, Option<String>>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let store = SampleStore::open(store_path)?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            params,
            api_key: api_key.into(),
            store,
        })
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Builds the request URL: every parameter with a present value in map
    /// iteration order, then the API key as the final `key=` pair. Values
    /// are form-urlencoded; the upstream API accepts percent-encoded
    /// coordinates, and raw `&` or `=` in a value would corrupt the query.
    pub fn build_url(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.params {
            if let Some(value) = value {
                query.append_pair(name, value);
            }
        }
        query.append_pair("key", &self.api_key);

        format!("{}{}", self.base_url, query.finish())
    }

    /// One GET, parsed as JSON. Connection failures and non-2xx statuses
    /// are network errors; an unparseable body is a parse error.
    async fn send_request(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("unexpected status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(serde_json::from_str(&body)?)
    }

    /// Navigates the fixed `resourceSets[0].resources[0]` path of a Routes
    /// API response. An empty result set (no route found) is a schema error.
    fn extract_resource(json: &serde_json::Value) -> Result<&serde_json::Value> {
        json.get("resourceSets")
            .and_then(|sets| sets.get(0))
            .and_then(|set| set.get("resources"))
            .and_then(|resources| resources.get(0))
            .ok_or(Error::Schema("resourceSets[0].resources[0]"))
    }

    /// Fetches one sample. The stored value is the scalar duration unless
    /// `keep_full_payload` is set, in which case the entire parsed response
    /// is kept.
    pub async fn fetch_sample(&self, url: &str, keep_full_payload: bool) -> Result<Sample> {
        let body = self.send_request(url).await?;
        let timestamp = Utc::now();

        let resource = Self::extract_resource(&body)?;
        let duration = resource
            .get("travelDurationTraffic")
            .and_then(serde_json::Value::as_f64)
            .ok_or(Error::Schema("travelDurationTraffic"))?;

        tracing::info!(%timestamp, duration_secs = duration, "Trip duration sample");

        let value = if keep_full_payload {
            SampleValue::Payload(body)
        } else {
            SampleValue::Duration(duration)
        };

        Ok(Sample::new(timestamp, value))
    }

    /// Blocks until `interval` has elapsed (checked every
    /// [`POLL_GRANULARITY`]), then records exactly one sample and persists
    /// the full store. Returns early without sampling when shutdown is
    /// signalled. Errors propagate; the window is not retried.
    pub async fn run_collection_window(
        &mut self,
        interval: Duration,
        keep_full_payload: bool,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<WindowOutcome> {
        self.collect_window(interval, keep_full_payload, POLL_GRANULARITY, shutdown)
            .await
    }

    async fn collect_window(
        &mut self,
        interval: Duration,
        keep_full_payload: bool,
        granularity: Duration,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<WindowOutcome> {
        let start = Instant::now();

        loop {
            if *shutdown.borrow() {
                return Ok(WindowOutcome::Cancelled);
            }

            tokio::select! {
                _ = tokio::time::sleep(granularity) => {}
                changed = shutdown.changed() => match changed {
                    Ok(()) => continue,
                    // Sender gone; no further signal can arrive.
                    Err(_) => tokio::time::sleep(granularity).await,
                },
            }

            if start.elapsed() >= interval {
                let url = self.build_url();
                let sample = self.fetch_sample(&url, keep_full_payload).await?;
                self.store.append(sample);
                self.store.persist()?;
                return Ok(WindowOutcome::Sampled);
            }
        }
    }
}
