// Polling layer. Each fetcher runs as a spawned task that publishes its
// latest state through a watch channel: hotel metadata re-polls on a fixed
// interval for as long as the page is mounted, price quotes re-poll until the
// backend reports the search completed. Dropping a handle aborts its task,
// which is the unmount path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::SearchApi;
use crate::models::{Hotel, PriceApiResponse};
use crate::params::SearchParams;

// Mirror of the {data, error, isLoading} triple the page consumes.
// is_loading is true only before the first settled response. A failed poll
// records the error but keeps the last-known-good data; the next successful
// poll clears it.
#[derive(Debug)]
pub struct FetchState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl<T> FetchState<T> {
    fn loading() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
        }
    }

    fn resolve(&mut self, value: T) {
        self.data = Some(Arc::new(value));
        self.error = None;
        self.is_loading = false;
    }

    fn reject(&mut self, message: String) {
        self.error = Some(message);
        self.is_loading = false;
    }
}

impl<T> Clone for FetchState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
        }
    }
}

// Handle to a running poller. Holds the watch receiver and the task; the
// task is aborted on drop so no timer outlives the page.
pub struct PollHandle<T> {
    rx: watch::Receiver<FetchState<T>>,
    task: JoinHandle<()>,
}

impl<T> PollHandle<T> {
    pub fn state(&self) -> FetchState<T> {
        self.rx.borrow().clone()
    }

    // Resolves when the poller publishes a new state. Once the task has
    // finished (price polling completed) no further updates will arrive and
    // this pends forever; the caller's other fetcher keeps driving updates.
    pub async fn changed(&mut self) {
        if self.rx.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// Re-issues the hotel metadata request every interval with no stop
// condition. A failed tick surfaces as state and never aborts future ticks;
// there is no retry beyond the next tick and no backoff.
pub fn spawn_hotel_poller(
    api: Arc<dyn SearchApi>,
    destination_id: String,
    interval: Duration,
) -> PollHandle<Vec<Hotel>> {
    let (tx, rx) = watch::channel(FetchState::loading());

    let task = tokio::spawn(async move {
        loop {
            match api.fetch_hotels(&destination_id).await {
                Ok(hotels) => {
                    debug!(count = hotels.len(), "hotel metadata refreshed");
                    tx.send_modify(|state| state.resolve(hotels));
                }
                Err(e) => {
                    warn!(error = %e, "hotel fetch failed");
                    tx.send_modify(|state| state.reject(e.to_string()));
                }
            }

            tokio::time::sleep(interval).await;
        }
    });

    PollHandle { rx, task }
}

// Re-issues the price request every interval until a response arrives with
// completed = true, then exits. If the very first response is already
// completed, exactly one request is made. A parameter change is a new
// request key: the session drops this poller and spawns a fresh one.
pub fn spawn_price_poller(
    api: Arc<dyn SearchApi>,
    params: SearchParams,
    interval: Duration,
) -> PollHandle<PriceApiResponse> {
    let (tx, rx) = watch::channel(FetchState::loading());

    let task = tokio::spawn(async move {
        loop {
            match api.fetch_prices(&params).await {
                Ok(response) => {
                    let completed = response.completed;
                    debug!(
                        quotes = response.hotels.len(),
                        completed, "price quotes refreshed"
                    );
                    tx.send_modify(|state| state.resolve(response));
                    if completed {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "price fetch failed");
                    tx.send_modify(|state| state.reject(e.to_string()));
                }
            }

            tokio::time::sleep(interval).await;
        }
    });

    PollHandle { rx, task }
}
