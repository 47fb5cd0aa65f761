//! Paginated retrieval from the provider API
//!
//! The provider pages with an `offset` query parameter and does not report a
//! total. Retrieval stops at the first page holding fewer records than the
//! configured full-page size; otherwise the offset advances by the number of
//! records just received. One failed page fails the whole fetch, and pages
//! already received are discarded.

use crate::config::ApiConfig;
use crate::credentials::ApiCredentials;
use crate::error::{IngestError, Result};
use crate::record::{FetchedCollection, Record};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Header carrying the provider API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

const OFFSET_PARAM: &str = "offset";

/// Query filter sent with every page request.
///
/// An `offset` entry, if present, is the starting offset; the fetcher owns
/// the parameter from there on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    params: BTreeMap<String, String>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(country: impl Into<String>) -> Self {
        Self::new().with("country", country)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    fn start_offset(&self) -> Result<usize> {
        match self.params.get(OFFSET_PARAM) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                IngestError::config(format!("Filter offset is not a number: '{}'", raw))
            }),
            None => Ok(0),
        }
    }

    fn query(&self, offset: usize) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter(|(key, _)| key.as_str() != OFFSET_PARAM)
            .map(|(key, value)| (key.clone(), value.clone()))
            .chain(std::iter::once((OFFSET_PARAM.to_string(), offset.to_string())))
            .collect()
    }
}

pub struct PaginatedFetcher {
    client: Client,
    base_url: String,
    page_size: usize,
    credentials: ApiCredentials,
}

impl PaginatedFetcher {
    pub fn new(config: &ApiConfig, credentials: ApiCredentials) -> Result<Self> {
        if config.page_size == 0 {
            return Err(IngestError::config("Page size must be greater than 0"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| IngestError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            page_size: config.page_size,
            credentials,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Retrieve every page for `filter`, in arrival order
    #[instrument(skip(self), fields(url = %self.base_url, page_size = self.page_size))]
    pub async fn fetch(&self, filter: &FilterParams) -> Result<FetchedCollection> {
        info!("Fetching records from the provider API");

        let mut records: Vec<Record> = Vec::new();
        let mut offset = filter.start_offset()?;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(filter, offset).await?;
            let page_len = page.len();
            pages += 1;

            debug!(offset, page_len, "Received page");
            records.extend(page);

            if page_len < self.page_size {
                break;
            }
            offset += page_len;
        }

        info!(pages, records = records.len(), "Fetched all pages");

        Ok(FetchedCollection::new(records))
    }

    async fn fetch_page(&self, filter: &FilterParams, offset: usize) -> Result<Vec<Record>> {
        let response = self
            .client
            .get(&self.base_url)
            .header(API_KEY_HEADER, self.credentials.api_key())
            .query(&filter.query(offset))
            .send()
            .await
            .map_err(|e| IngestError::retrieval(offset, e))?
            .error_for_status()
            .map_err(|e| IngestError::retrieval(offset, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| IngestError::retrieval(offset, e))?;

        serde_json::from_slice::<Vec<Record>>(&body).map_err(|e| {
            let reason = format!("response is not a JSON array of records: {}", e);
            IngestError::retrieval(offset, reason)
        })
    }
}
