// Data model for the search results page: static hotel records from the
// content endpoint, price quotes from the asynchronous pricing job, and the
// stitched record the pipeline produces out of the two.

use serde::{Deserialize, Serialize};

// Static hotel record. Replaced wholesale on every metadata poll, never
// updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub rating: f32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// One quote out of the pricing job. The id matches a Hotel id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceInfo {
    pub id: String,
    pub price: f64,
    #[serde(rename = "searchRank", default)]
    pub search_rank: Option<f64>,
}

// Pricing endpoint payload. `completed` is the backend's in-band signal that
// every quote for the search has been computed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceApiResponse {
    #[serde(default)]
    pub hotels: Vec<PriceInfo>,
    pub completed: bool,
}

// Hotel enriched with its resolved quote. Stitching drops hotels without a
// quote, so price is not optional here.
#[derive(Debug, Clone)]
pub struct StitchedHotel {
    pub hotel: Hotel,
    pub price: f64,
    pub search_rank: Option<f64>,
}

impl StitchedHotel {
    pub fn id(&self) -> &str {
        &self.hotel.id
    }

    pub fn rating(&self) -> f32 {
        self.hotel.rating
    }
}

// Room listing used by the room-level card. Sourced from a separate
// room-listing flow, not from the two endpoints above.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Room {
    pub key: String,
    #[serde(rename = "roomNormalizedDescription")]
    pub description: String,
    #[serde(default)]
    pub images: Vec<RoomImage>,
    pub price: f64,
    #[serde(rename = "roomAdditionalInfo", default)]
    pub additional_info: RoomAdditionalInfo,
    #[serde(default)]
    pub free_cancellation: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomAdditionalInfo {
    #[serde(rename = "breakfastInfo", default)]
    pub breakfast_info: Option<String>,
}
