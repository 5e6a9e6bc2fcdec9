// Join / filter / sort stages of the results pipeline. All three are pure
// functions over the fetched collections; the session recomputes them when an
// input changes and memoizes the join as an optimization only.

use std::cmp::Ordering;

use crate::models::{Hotel, PriceApiResponse, StitchedHotel};

// Merge hotel records with their price quotes by id: first matching quote
// wins (at most one is expected), hotels without a quote are dropped, and
// the result gets a default ascending-price order that the sort stage may
// supersede.
pub fn stitch_hotels(hotels: &[Hotel], prices: &PriceApiResponse) -> Vec<StitchedHotel> {
    let mut stitched: Vec<StitchedHotel> = hotels
        .iter()
        .filter_map(|hotel| {
            let quote = prices.hotels.iter().find(|price| price.id == hotel.id)?;
            Some(StitchedHotel {
                hotel: hotel.clone(),
                price: quote.price,
                search_rank: quote.search_rank,
            })
        })
        .collect();

    stitched.sort_by(|a, b| cmp_f64(a.price, b.price));
    stitched
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

// Star-rating band, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRange {
    pub min: f32,
    pub max: f32,
}

impl Default for StarRange {
    fn default() -> Self {
        Self { min: 0.5, max: 5.0 }
    }
}

// max below min is a degenerate range and yields the empty set, not an
// error.
pub fn filter_by_stars(hotels: &[StitchedHotel], range: StarRange) -> Vec<StitchedHotel> {
    if range.max < range.min {
        return Vec::new();
    }

    hotels
        .iter()
        .filter(|hotel| hotel.rating() >= range.min && hotel.rating() <= range.max)
        .cloned()
        .collect()
}

// Sort criteria offered by the dropdown, addressed by its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    PriceAscending,
    PriceDescending,
    RatingAscending,
    RatingDescending,
}

impl SortBy {
    pub const DEFAULT_LABEL: &'static str = "Price (Ascending)";

    pub const ALL: [SortBy; 4] = [
        SortBy::PriceAscending,
        SortBy::PriceDescending,
        SortBy::RatingAscending,
        SortBy::RatingDescending,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Price (Ascending)" => Some(SortBy::PriceAscending),
            "Price (Descending)" => Some(SortBy::PriceDescending),
            "Rating (Ascending)" => Some(SortBy::RatingAscending),
            "Rating (Descending)" => Some(SortBy::RatingDescending),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::PriceAscending => "Price (Ascending)",
            SortBy::PriceDescending => "Price (Descending)",
            SortBy::RatingAscending => "Rating (Ascending)",
            SortBy::RatingDescending => "Rating (Descending)",
        }
    }
}

// Returns a newly ordered copy, never mutating the input. Unknown labels
// leave the incoming order untouched with no error raised. The underlying
// sort is stable, so ties keep their incoming order.
pub fn sort_hotels(hotels: &[StitchedHotel], label: &str) -> Vec<StitchedHotel> {
    let mut sorted = hotels.to_vec();

    match SortBy::from_label(label) {
        Some(SortBy::PriceAscending) => sorted.sort_by(|a, b| cmp_f64(a.price, b.price)),
        Some(SortBy::PriceDescending) => sorted.sort_by(|a, b| cmp_f64(b.price, a.price)),
        Some(SortBy::RatingAscending) => sorted.sort_by(|a, b| cmp_f32(a.rating(), b.rating())),
        Some(SortBy::RatingDescending) => sorted.sort_by(|a, b| cmp_f32(b.rating(), a.rating())),
        None => {}
    }

    sorted
}
