// Backend interface for the results page: one read endpoint for hotel
// metadata and one for the asynchronously-computed price quotes. The HTTP
// implementation is a thin reqwest wrapper; tests and benches run against the
// mock server at the bottom of this file.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{Hotel, PriceApiResponse};
use crate::params::SearchParams;

// Error types for the two fetchers. Fetch errors are surfaced per-fetcher as
// banner text and never stop the other fetcher's polling.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("BACKEND_URL is not configured")]
    MissingBaseUrl,
}

// Client configuration. The base URL comes from the environment, read once
// at startup; both poll intervals default to the page's 5 second cadence.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub hotel_poll_interval: Duration,
    pub price_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            hotel_poll_interval: Duration::from_secs(5),
            price_poll_interval: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BACKEND_URL").unwrap_or_default(),
            ..Default::default()
        }
    }
}

// Read seam over the backend. The session and the pollers only see this
// trait, so tests swap in the mock server below.
#[async_trait]
pub trait SearchApi: Send + Sync + 'static {
    // GET {base}/hotels?destination_id={id}
    async fn fetch_hotels(&self, destination_id: &str) -> Result<Vec<Hotel>, FetchError>;

    // GET {base}/hotels/prices?destination_id=..&checkin=..&checkout=..&guests=..
    async fn fetch_prices(&self, params: &SearchParams) -> Result<PriceApiResponse, FetchError>;
}

pub struct HttpSearchApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSearchApi {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        if config.base_url.is_empty() {
            return Err(FetchError::MissingBaseUrl);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn hotels_url(&self, destination_id: &str) -> String {
        format!("{}/hotels?destination_id={}", self.base_url, destination_id)
    }

    // Absent parameters are omitted from the query string rather than sent
    // as placeholder values.
    fn prices_url(&self, params: &SearchParams) -> String {
        let mut url = format!("{}/hotels/prices?", self.base_url);
        let pairs = [
            ("destination_id", &params.destination_id),
            ("checkin", &params.checkin),
            ("checkout", &params.checkout),
            ("guests", &params.guests),
        ];

        let mut first = true;
        for (key, value) in pairs {
            if let Some(value) = value {
                if !first {
                    url.push('&');
                }
                url.push_str(key);
                url.push('=');
                url.push_str(value);
                first = false;
            }
        }

        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(%url, "issuing backend request");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn fetch_hotels(&self, destination_id: &str) -> Result<Vec<Hotel>, FetchError> {
        self.get_json(&self.hotels_url(destination_id)).await
    }

    async fn fetch_prices(&self, params: &SearchParams) -> Result<PriceApiResponse, FetchError> {
        self.get_json(&self.prices_url(params)).await
    }
}

// Mock backend for tests and benches. Price quotes are revealed in batches
// across successive polls, the way the real pricing job converges, and either
// endpoint can be told to fail its next N requests.
pub mod mock_server {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::PriceInfo;

    pub struct MockSearchApi {
        hotels: Mutex<Vec<Hotel>>,
        quotes: Mutex<Vec<PriceInfo>>,
        // 0 means every quote is available on the first poll
        quotes_per_poll: AtomicUsize,
        price_polls_served: AtomicUsize,
        hotel_requests: AtomicUsize,
        price_requests: AtomicUsize,
        fail_next_hotel_requests: AtomicUsize,
        fail_next_price_requests: AtomicUsize,
        delay_ms: AtomicUsize,
    }

    impl MockSearchApi {
        pub fn new() -> Self {
            Self {
                hotels: Mutex::new(Vec::new()),
                quotes: Mutex::new(Vec::new()),
                quotes_per_poll: AtomicUsize::new(0),
                price_polls_served: AtomicUsize::new(0),
                hotel_requests: AtomicUsize::new(0),
                price_requests: AtomicUsize::new(0),
                fail_next_hotel_requests: AtomicUsize::new(0),
                fail_next_price_requests: AtomicUsize::new(0),
                delay_ms: AtomicUsize::new(0),
            }
        }

        pub fn set_hotels(&self, hotels: Vec<Hotel>) {
            *self.hotels.lock() = hotels;
        }

        pub fn set_quotes(&self, quotes: Vec<PriceInfo>) {
            *self.quotes.lock() = quotes;
            self.price_polls_served.store(0, Ordering::SeqCst);
        }

        pub fn set_quotes_per_poll(&self, count: usize) {
            self.quotes_per_poll.store(count, Ordering::SeqCst);
        }

        pub fn set_delay(&self, delay_ms: usize) {
            self.delay_ms.store(delay_ms, Ordering::SeqCst);
        }

        pub fn fail_next_hotel_requests(&self, count: usize) {
            self.fail_next_hotel_requests.store(count, Ordering::SeqCst);
        }

        pub fn fail_next_price_requests(&self, count: usize) {
            self.fail_next_price_requests.store(count, Ordering::SeqCst);
        }

        pub fn hotel_request_count(&self) -> usize {
            self.hotel_requests.load(Ordering::SeqCst)
        }

        pub fn price_request_count(&self) -> usize {
            self.price_requests.load(Ordering::SeqCst)
        }

        fn take_failure(counter: &AtomicUsize) -> bool {
            let current = counter.load(Ordering::SeqCst);
            if current > 0 {
                counter.store(current - 1, Ordering::SeqCst);
                true
            } else {
                false
            }
        }

        async fn simulate_latency(&self) {
            let delay = self.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                let jitter = rand::random::<usize>() % (delay / 2 + 1);
                tokio::time::sleep(Duration::from_millis((delay + jitter) as u64)).await;
            }
        }
    }

    impl Default for MockSearchApi {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl SearchApi for MockSearchApi {
        async fn fetch_hotels(&self, _destination_id: &str) -> Result<Vec<Hotel>, FetchError> {
            self.hotel_requests.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;

            if Self::take_failure(&self.fail_next_hotel_requests) {
                return Err(FetchError::Status(503));
            }

            Ok(self.hotels.lock().clone())
        }

        async fn fetch_prices(
            &self,
            _params: &SearchParams,
        ) -> Result<PriceApiResponse, FetchError> {
            self.price_requests.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;

            if Self::take_failure(&self.fail_next_price_requests) {
                return Err(FetchError::Status(503));
            }

            let quotes = self.quotes.lock();
            let per_poll = self.quotes_per_poll.load(Ordering::SeqCst);
            let polls = self.price_polls_served.fetch_add(1, Ordering::SeqCst) + 1;

            let available = if per_poll == 0 {
                quotes.len()
            } else {
                (per_poll * polls).min(quotes.len())
            };

            Ok(PriceApiResponse {
                hotels: quotes[..available].to_vec(),
                completed: available == quotes.len(),
            })
        }
    }
}
