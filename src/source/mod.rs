pub mod transport;

use std::num::NonZeroU32;

use futures::stream::{self, StreamExt, TryStreamExt};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::Listing;

pub use transport::{HttpTransport, Transport};

/// Page size the listing endpoints use on the server side.
pub const DEFAULT_API_PAGE_SIZE: usize = 10;
pub const DEFAULT_CONCURRENCY: usize = 16;
/// Upper bound on the number of pages a reported `count` may imply.
pub const DEFAULT_MAX_PAGES: usize = 1_000;
pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid URL: {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request failed: {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("API error: {status} {reason} for {url}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("implausible record count {count} from {url}: {page_count} pages exceeds the limit of {max_pages}")]
    ImplausibleCount {
        url: String,
        count: usize,
        page_count: usize,
        max_pages: usize,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Listing URLs of the three collections the browser reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub people: String,
    pub films: String,
    pub planets: String,
}

impl Endpoints {
    pub fn from_base(base_url: &str, people: &str, films: &str, planets: &str) -> Self {
        let join = |path: &str| format!("{}/{}/", base_url.trim_end_matches('/'), path.trim_matches('/'));
        Self {
            people: join(people),
            films: join(films),
            planets: join(planets),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_base(DEFAULT_BASE_URL, "people", "films", "planets")
    }
}

/// Appends `page=<n>` to a collection URL, keeping any existing query.
pub fn page_url(collection_url: &str, page: usize) -> Result<String, SourceError> {
    let mut url = reqwest::Url::parse(collection_url).map_err(|e| SourceError::InvalidUrl {
        url: collection_url.to_string(),
        message: e.to_string(),
    })?;
    url.query_pairs_mut().append_pair("page", &page.to_string());
    Ok(url.to_string())
}

/// Reads whole paginated collections through a [`Transport`].
pub struct RecordSource<T> {
    transport: T,
    api_page_size: usize,
    concurrency: usize,
    max_pages: usize,
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl<T: Transport> RecordSource<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            api_page_size: DEFAULT_API_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_pages: DEFAULT_MAX_PAGES,
            limiter: None,
        }
    }

    pub fn with_api_page_size(mut self, api_page_size: usize) -> Self {
        self.api_page_size = api_page_size.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Limits requests per second; 0 disables the limit.
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.limiter = NonZeroU32::new(rate).map(|r| RateLimiter::direct(Quota::per_second(r)));
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_listing<R: DeserializeOwned>(&self, url: &str) -> Result<Listing<R>, SourceError> {
        if let Some(lim) = self.limiter.as_ref() {
            lim.until_ready().await;
        }
        tracing::debug!(url, "fetching listing");
        let body = self.transport.get(url).await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    /// Fetches every record of a collection.
    ///
    /// Pages are requested concurrently but concatenated in page-number order,
    /// so the result keeps the collection's ordinal order. Any failed page
    /// fails the whole fetch, and so does a reported `count` that would need
    /// more than the configured maximum number of pages.
    pub async fn fetch_all<R: DeserializeOwned>(&self, collection_url: &str) -> Result<Vec<R>, SourceError> {
        let head: Listing<R> = self.fetch_listing(collection_url).await?;
        let count = head.count;
        let page_count = count.div_ceil(self.api_page_size);
        if page_count > self.max_pages {
            return Err(SourceError::ImplausibleCount {
                url: collection_url.to_string(),
                count,
                page_count,
                max_pages: self.max_pages,
            });
        }
        tracing::debug!(collection_url, count, page_count, "fetching collection pages");

        let urls = (1..=page_count)
            .map(|page| page_url(collection_url, page))
            .collect::<Result<Vec<_>, _>>()?;

        let pages: Vec<Listing<R>> = stream::iter(urls.iter())
            .map(|url| self.fetch_listing::<R>(url))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let records: Vec<R> = pages.into_iter().flat_map(|page| page.results).collect();
        if records.len() != count {
            tracing::warn!(
                collection_url,
                count,
                received = records.len(),
                "collection size differs from reported count"
            );
        }
        Ok(records)
    }
}
