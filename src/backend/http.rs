use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::backend::{
    RuleDescriptor, ServiceMap, StatisticsBackend, StatisticsQuery, decode_statistics,
};
use crate::core::Sample;
use crate::error::{TimelineError, TimelineResult};

/// Blocking client for the monitoring HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> TimelineResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> TimelineResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(TimelineError::InvalidData(
                "backend base url must not be empty".to_owned(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TimelineError::Fetch(format!("failed to build http client: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn get_text(&self, path: &str, query: &[(&str, String)]) -> TimelineResult<String> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, params = query.len(), "backend request");
        self.client
            .get(&url)
            .query(query)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| TimelineError::Fetch(format!("GET {path}: {e}")))
    }
}

impl StatisticsBackend for HttpBackend {
    fn services(&self) -> TimelineResult<ServiceMap> {
        let body = self.get_text("/api/services", &[])?;
        serde_json::from_str(&body)
            .map_err(|e| TimelineError::Decode(format!("services body: {e}")))
    }

    fn rules(&self) -> TimelineResult<Vec<RuleDescriptor>> {
        let body = self.get_text("/api/rules", &[])?;
        serde_json::from_str(&body).map_err(|e| TimelineError::Decode(format!("rules body: {e}")))
    }

    fn statistics(&self, query: &StatisticsQuery) -> TimelineResult<Vec<Sample>> {
        let body = self.get_text("/api/statistics", &query.pairs())?;
        decode_statistics(query.metric, &body)
    }
}
