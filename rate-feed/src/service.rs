//! Rate feed service implementation

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::models::RateSheet;

/// Default timeout for one fetch attempt
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Service providing the current interest-rate sheet.
///
/// With no source URL configured it serves the built-in fallback sheet.
/// With a URL it GETs a JSON object of product-to-rate pairs; any
/// network, status, or decode failure is logged and answered with the
/// fallback sheet instead. Callers never see an error.
pub struct RateFeedService {
    client: reqwest::Client,
    source_url: Option<String>,
}

impl RateFeedService {
    /// Create a rate feed, optionally backed by a remote source
    pub fn new(source_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent("bank-rate-feed/1.0")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, source_url }
    }

    /// Fetch the current rate sheet, falling back on any failure
    pub async fn current_rates(&self) -> RateSheet {
        let url = match &self.source_url {
            Some(url) => url,
            None => {
                debug!("No rate source configured, serving fallback rates");
                return RateSheet::fallback();
            }
        };

        match self.fetch_remote(url).await {
            Ok(rates) if !rates.is_empty() => RateSheet::from_source(url.clone(), rates),
            Ok(_) => {
                warn!("Rate source {} returned an empty sheet, serving fallback", url);
                RateSheet::fallback()
            }
            Err(e) => {
                warn!("Failed to fetch rates from {}: {}", url, e);
                RateSheet::fallback()
            }
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<BTreeMap<String, String>, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.json::<BTreeMap<String, String>>().await
    }
}
