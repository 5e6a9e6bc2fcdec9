// Per-search orchestration: owns the two pollers and the user controls,
// composes fetch state into the snapshot the view renders. The two fetches
// race; the join only produces output once both have delivered a successful
// response, and an error on one never halts the other.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::client::{ClientConfig, SearchApi};
use crate::models::{Hotel, PriceApiResponse, StitchedHotel};
use crate::params::SearchParams;
use crate::pipeline::{self, SortBy, StarRange};
use crate::poll::{self, FetchState, PollHandle};

pub struct ResultsSession {
    api: Arc<dyn SearchApi>,
    config: ClientConfig,
    params: SearchParams,
    hotels: PollHandle<Vec<Hotel>>,
    prices: PollHandle<PriceApiResponse>,
    sort_label: String,
    stars: StarRange,
    stitch_memo: Mutex<StitchMemo>,
}

// The join reruns only when one of its input collections is replaced; Arc
// identity stands in for the reference equality the page relied on.
#[derive(Default)]
struct StitchMemo {
    hotels: Option<Arc<Vec<Hotel>>>,
    prices: Option<Arc<PriceApiResponse>>,
    stitched: Arc<Vec<StitchedHotel>>,
}

// Everything the presentation layer needs for one render.
#[derive(Debug, Clone)]
pub struct ResultsSnapshot {
    pub destination_id: Option<String>,
    pub is_loading: bool,
    pub hotel_error: Option<String>,
    pub price_error: Option<String>,
    pub completed: bool,
    pub sort_label: String,
    pub stars: StarRange,
    pub hotels: Vec<StitchedHotel>,
}

impl ResultsSession {
    pub fn new(api: Arc<dyn SearchApi>, config: ClientConfig, params: SearchParams) -> Self {
        let (hotels, prices) = spawn_pollers(&api, &config, &params);

        Self {
            api,
            config,
            params,
            hotels,
            prices,
            sort_label: SortBy::DEFAULT_LABEL.to_string(),
            stars: StarRange::default(),
            stitch_memo: Mutex::new(StitchMemo::default()),
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    // A different parameter tuple is a new request key: both pollers are
    // dropped (aborting their timers) and polling restarts from scratch.
    pub fn set_params(&mut self, params: SearchParams) {
        if params.request_key() == self.params.request_key() {
            return;
        }

        info!(key = %params.request_key(), "search parameters changed, restarting pollers");
        self.params = params;
        let (hotels, prices) = spawn_pollers(&self.api, &self.config, &self.params);
        self.hotels = hotels;
        self.prices = prices;
        *self.stitch_memo.lock() = StitchMemo::default();
    }

    pub fn set_sort_label(&mut self, label: impl Into<String>) {
        self.sort_label = label.into();
    }

    pub fn set_star_range(&mut self, stars: StarRange) {
        self.stars = stars;
    }

    // Resolves when either fetcher publishes a new state. Once price polling
    // has stopped, the hotel poller keeps driving this.
    pub async fn changed(&mut self) {
        tokio::select! {
            _ = self.hotels.changed() => {}
            _ = self.prices.changed() => {}
        }
    }

    pub fn snapshot(&self) -> ResultsSnapshot {
        let hotels = self.hotels.state();
        let prices = self.prices.state();

        let completed = prices
            .data
            .as_deref()
            .map_or(false, |response| response.completed);
        let is_loading = hotels.is_loading || prices.is_loading || !completed;

        let stitched = self.stitched(&hotels, &prices);
        let filtered = pipeline::filter_by_stars(&stitched, self.stars);
        let sorted = pipeline::sort_hotels(&filtered, &self.sort_label);

        ResultsSnapshot {
            destination_id: self.params.destination_id.clone(),
            is_loading,
            hotel_error: hotels.error,
            price_error: prices.error,
            completed,
            sort_label: self.sort_label.clone(),
            stars: self.stars,
            hotels: sorted,
        }
    }

    fn stitched(
        &self,
        hotels: &FetchState<Vec<Hotel>>,
        prices: &FetchState<PriceApiResponse>,
    ) -> Arc<Vec<StitchedHotel>> {
        let (hotels, prices) = match (hotels.data.as_ref(), prices.data.as_ref()) {
            (Some(hotels), Some(prices)) => (hotels, prices),
            // one of the fetches has not delivered yet
            _ => return Arc::new(Vec::new()),
        };

        let mut memo = self.stitch_memo.lock();
        let fresh = memo
            .hotels
            .as_ref()
            .map_or(false, |cached| Arc::ptr_eq(cached, hotels))
            && memo
                .prices
                .as_ref()
                .map_or(false, |cached| Arc::ptr_eq(cached, prices));

        if !fresh {
            memo.stitched = Arc::new(pipeline::stitch_hotels(hotels, prices));
            memo.hotels = Some(Arc::clone(hotels));
            memo.prices = Some(Arc::clone(prices));
        }

        Arc::clone(&memo.stitched)
    }
}

fn spawn_pollers(
    api: &Arc<dyn SearchApi>,
    config: &ClientConfig,
    params: &SearchParams,
) -> (PollHandle<Vec<Hotel>>, PollHandle<PriceApiResponse>) {
    let destination_id = params.destination_id.clone().unwrap_or_default();

    (
        poll::spawn_hotel_poller(
            Arc::clone(api),
            destination_id,
            config.hotel_poll_interval,
        ),
        poll::spawn_price_poller(
            Arc::clone(api),
            params.clone(),
            config.price_poll_interval,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::client::mock_server::MockSearchApi;
    use crate::models::PriceInfo;

    fn hotel(id: &str, rating: f32) -> Hotel {
        Hotel {
            id: id.to_string(),
            name: format!("Hotel {}", id),
            rating,
            images: vec![],
            address: None,
            description: None,
        }
    }

    fn quote(id: &str, price: f64) -> PriceInfo {
        PriceInfo {
            id: id.to_string(),
            price,
            search_rank: None,
        }
    }

    fn config() -> ClientConfig {
        ClientConfig {
            base_url: "http://mock".to_string(),
            ..Default::default()
        }
    }

    fn results_params() -> SearchParams {
        SearchParams::from_url("/results/RsBU?checkin=2025-10-01&checkout=2025-10-07&guests=2")
    }

    fn scripted_api() -> Arc<MockSearchApi> {
        let api = Arc::new(MockSearchApi::new());
        api.set_hotels(vec![hotel("1", 4.0), hotel("2", 3.0)]);
        api.set_quotes(vec![quote("1", 100.0), quote("2", 80.0)]);
        api
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_loads_and_stitches() {
        let api = scripted_api();
        let mut session = ResultsSession::new(api.clone(), config(), results_params());

        assert!(session.snapshot().is_loading);

        session.changed().await;
        session.changed().await;
        let snapshot = session.snapshot();

        assert!(!snapshot.is_loading);
        assert!(snapshot.completed);
        // default sort: price ascending
        let ids: Vec<&str> = snapshot.hotels.iter().map(|h| h.id()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(snapshot.hotels[0].price, 80.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stays_loading_until_prices_complete() {
        let api = scripted_api();
        api.set_quotes_per_poll(1); // completes on the second poll

        let mut session = ResultsSession::new(api.clone(), config(), results_params());

        session.changed().await;
        session.changed().await;
        let snapshot = session.snapshot();

        // both fetches settled, but the pricing job has not converged: the
        // partial join is visible while the page stays loading
        assert!(!snapshot.completed);
        assert!(snapshot.is_loading);
        let ids: Vec<&str> = snapshot.hotels.iter().map(|h| h.id()).collect();
        assert_eq!(ids, vec!["1"]);

        tokio::time::sleep(Duration::from_secs(6)).await;
        let snapshot = session.snapshot();
        assert!(snapshot.completed);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.hotels.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_error_banners_can_show_at_once() {
        let api = scripted_api();
        api.fail_next_hotel_requests(1);
        api.fail_next_price_requests(1);

        let mut session = ResultsSession::new(api.clone(), config(), results_params());
        session.changed().await;
        session.changed().await;

        let snapshot = session.snapshot();
        assert!(snapshot.hotel_error.is_some());
        assert!(snapshot.price_error.is_some());
        assert!(snapshot.hotels.is_empty());

        // errors clear independently on the next successful ticks
        tokio::time::sleep(Duration::from_secs(6)).await;
        let snapshot = session.snapshot();
        assert!(snapshot.hotel_error.is_none());
        assert!(snapshot.price_error.is_none());
        assert_eq!(snapshot.hotels.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_controls_filter_and_sort_the_snapshot() {
        let api = scripted_api();
        let mut session = ResultsSession::new(api.clone(), config(), results_params());

        session.changed().await;
        session.changed().await;

        session.set_sort_label("Rating (Descending)");
        let ids: Vec<String> = session
            .snapshot()
            .hotels
            .iter()
            .map(|h| h.id().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);

        session.set_star_range(StarRange { min: 3.5, max: 5.0 });
        let snapshot = session.snapshot();
        assert_eq!(snapshot.hotels.len(), 1);
        assert_eq!(snapshot.hotels[0].id(), "1");

        session.set_star_range(StarRange { min: 5.0, max: 3.0 });
        assert!(session.snapshot().hotels.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_param_change_restarts_price_polling() {
        let api = scripted_api();
        let mut session = ResultsSession::new(api.clone(), config(), results_params());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.price_request_count(), 1);
        assert!(session.snapshot().completed);

        // same key: nothing restarts
        session.set_params(results_params());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.price_request_count(), 1);

        // new dates: polling starts over from scratch
        api.set_quotes(vec![quote("1", 110.0), quote("2", 95.0)]);
        session.set_params(SearchParams::from_url(
            "/results/RsBU?checkin=2025-11-01&checkout=2025-11-03&guests=2",
        ));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.price_request_count(), 2);

        session.changed().await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.hotels[0].price, 95.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hotel_poller_keeps_driving_changes_after_completion() {
        let api = scripted_api();
        let mut session = ResultsSession::new(api.clone(), config(), results_params());

        session.changed().await;
        session.changed().await;
        assert!(session.snapshot().completed);

        // price polling has stopped; the metadata poller still ticks
        let next = tokio::time::timeout(Duration::from_secs(10), session.changed()).await;
        assert!(next.is_ok());
    }
}
