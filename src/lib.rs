// Client-side engine for the hotel search results page: poll hotel metadata
// and asynchronously-converging price quotes, stitch the two lists, filter
// by star rating, sort, and render result cards with booking links.

pub mod client;
pub mod models;
pub mod params;
pub mod pipeline;
pub mod poll;
pub mod session;
pub mod view;

// Re-export key types for convenience
pub use client::{ClientConfig, FetchError, HttpSearchApi, SearchApi};
pub use models::{Hotel, PriceApiResponse, PriceInfo, Room, StitchedHotel};
pub use params::SearchParams;
pub use pipeline::{filter_by_stars, sort_hotels, stitch_hotels, SortBy, StarRange};
pub use poll::{FetchState, PollHandle};
pub use session::{ResultsSession, ResultsSnapshot};
