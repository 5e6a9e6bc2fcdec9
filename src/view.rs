// Presentation layer: renders a snapshot as terminal text in the page's
// priority order (loading skeleton, error banners, controls, result cards),
// and builds the booking deep link each card's Book Now action points at.

use chrono::Local;

use crate::models::{Room, StitchedHotel};
use crate::params::SearchParams;
use crate::pipeline::SortBy;
use crate::session::ResultsSnapshot;

pub fn render_results(snapshot: &ResultsSnapshot, params: &SearchParams) -> String {
    let mut out = String::new();

    let destination = snapshot.destination_id.as_deref().unwrap_or("-");
    out.push_str(&format!("Search Results for {}\n", destination));
    out.push_str("====================\n\n");

    if snapshot.is_loading {
        out.push_str("Please wait a moment as we fetch the best prices for you...\n");
    }
    if let Some(error) = &snapshot.hotel_error {
        out.push_str(&format!("Error loading hotel data: {}\n", error));
    }
    if let Some(error) = &snapshot.price_error {
        out.push_str(&format!("Error loading price data: {}\n", error));
    }

    if snapshot.is_loading {
        out.push_str(&render_skeleton());
        return out;
    }

    out.push_str(&format!(
        "Last updated: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&render_sort_control(&snapshot.sort_label));
    out.push_str(&format!(
        "Filter By: {:.1} to {:.1} stars\n\n",
        snapshot.stars.min, snapshot.stars.max
    ));

    if snapshot.hotels.is_empty() {
        out.push_str("No matching hotels found. Please try a different criteria!\n");
    } else {
        for hotel in &snapshot.hotels {
            out.push_str(&render_hotel_card(hotel, params));
        }
    }

    out
}

// Placeholder card shown while either fetch is still in flight.
fn render_skeleton() -> String {
    let mut out = String::new();
    out.push_str("+----------+------------------------+\n");
    out.push_str("| ######## | ####################   |\n");
    out.push_str("| ######## | ####  ####             |\n");
    out.push_str("| ######## |              [######]  |\n");
    out.push_str("+----------+------------------------+\n");
    out
}

fn render_sort_control(selected: &str) -> String {
    let options: Vec<String> = SortBy::ALL
        .iter()
        .map(|criterion| {
            if criterion.label() == selected {
                format!("[{}]", criterion.label())
            } else {
                criterion.label().to_string()
            }
        })
        .collect();

    format!("Sort by: {}\n", options.join(" | "))
}

fn render_hotel_card(hotel: &StitchedHotel, params: &SearchParams) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} ({} stars)\n",
        hotel.hotel.name,
        hotel.rating()
    ));

    match hotel.hotel.images.first() {
        Some(image) => out.push_str(&format!("  image: {}\n", image)),
        None => out.push_str("  image: (no image available)\n"),
    }
    if let Some(address) = &hotel.hotel.address {
        out.push_str(&format!("  {}\n", address));
    }

    out.push_str(&format!("  Price: {:.2}\n", hotel.price));
    out.push_str(&format!(
        "  Book Now -> {}\n\n",
        booking_url(hotel.id(), params)
    ));

    out
}

// Booking deep link. The lang/currency/country constants are fixed rather
// than derived from user input, exactly as on the original page.
pub fn booking_url(hotel_id: &str, params: &SearchParams) -> String {
    format!(
        "/booking/{}?destination_id={}&checkin={}&checkout={}&lang=en_US&currency=SGD&country_code=SG&guests={}",
        hotel_id,
        params.destination_id.as_deref().unwrap_or(""),
        params.checkin.as_deref().unwrap_or(""),
        params.checkout.as_deref().unwrap_or(""),
        params.guests.as_deref().unwrap_or("")
    )
}

// Room-level card from the separate room-listing flow. The currency
// argument is display-only; the booking link keeps its own constants. A
// room without images renders a defined placeholder instead of faulting.
pub fn render_room_card(
    room: &Room,
    currency: &str,
    hotel_id: &str,
    params: &SearchParams,
) -> String {
    let mut out = String::new();

    match room.images.first() {
        Some(image) => out.push_str(&format!("image: {}\n", image.url)),
        None => out.push_str("image: (no image available)\n"),
    }

    out.push_str(&format!("{}\n", room.description));
    if let Some(breakfast) = &room.additional_info.breakfast_info {
        out.push_str(&format!("{}\n", breakfast));
    }

    out.push_str(&format!("{} {}\n", currency, room.price));
    if room.free_cancellation {
        out.push_str("Free Cancellation\n");
    }

    out.push_str(&format!("Book Now -> {}\n", booking_url(hotel_id, params)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::{Hotel, RoomAdditionalInfo, RoomImage};
    use crate::pipeline::StarRange;

    fn stitched(id: &str, rating: f32, price: f64) -> StitchedHotel {
        StitchedHotel {
            hotel: Hotel {
                id: id.to_string(),
                name: format!("Hotel {}", id),
                rating,
                images: vec![],
                address: None,
                description: None,
            },
            price,
            search_rank: None,
        }
    }

    fn params() -> SearchParams {
        SearchParams::from_url("/results/RsBU?checkin=2025-10-01&checkout=2025-10-07&guests=2")
    }

    fn snapshot(hotels: Vec<StitchedHotel>) -> ResultsSnapshot {
        ResultsSnapshot {
            destination_id: Some("RsBU".to_string()),
            is_loading: false,
            hotel_error: None,
            price_error: None,
            completed: true,
            sort_label: SortBy::DEFAULT_LABEL.to_string(),
            stars: StarRange::default(),
            hotels,
        }
    }

    #[test]
    fn test_loading_render_shows_wait_message_and_skeleton() {
        let mut snap = snapshot(vec![stitched("1", 4.0, 100.0)]);
        snap.is_loading = true;
        snap.completed = false;

        let text = render_results(&snap, &params());
        assert!(text.contains("Please wait a moment as we fetch the best prices for you..."));
        assert!(text.contains("########"));
        // cards are suppressed while loading
        assert!(!text.contains("Book Now"));
    }

    #[test]
    fn test_both_error_banners_render_together() {
        let mut snap = snapshot(vec![]);
        snap.is_loading = true;
        snap.hotel_error = Some("backend returned status 503".to_string());
        snap.price_error = Some("network error: timed out".to_string());

        let text = render_results(&snap, &params());
        assert!(text.contains("Error loading hotel data: backend returned status 503"));
        assert!(text.contains("Error loading price data: network error: timed out"));
    }

    #[test]
    fn test_loaded_render_has_controls_and_cards_in_order() {
        let snap = snapshot(vec![stitched("2", 3.0, 80.0), stitched("1", 4.0, 100.0)]);

        let text = render_results(&snap, &params());
        assert!(text.contains("Search Results for RsBU"));
        assert!(text.contains("Last updated:"));
        assert!(text.contains("Sort by: [Price (Ascending)]"));
        assert!(text.contains("Filter By: 0.5 to 5.0 stars"));

        let first = text.find("Hotel 2").unwrap();
        let second = text.find("Hotel 1").unwrap();
        assert!(first < second);
        assert!(text.contains("Price: 80.00"));
    }

    #[test]
    fn test_empty_result_set_renders_no_match_message() {
        let text = render_results(&snapshot(vec![]), &params());
        assert!(text.contains("No matching hotels found. Please try a different criteria!"));
        assert!(!text.contains("Book Now"));
    }

    #[test]
    fn test_booking_url_carries_search_context_and_fixed_locale() {
        let url = booking_url("iOzi", &params());
        assert_eq!(
            url,
            "/booking/iOzi?destination_id=RsBU&checkin=2025-10-01&checkout=2025-10-07&lang=en_US&currency=SGD&country_code=SG&guests=2"
        );
    }

    #[test]
    fn test_booking_url_with_absent_params() {
        let url = booking_url("iOzi", &SearchParams::default());
        assert_eq!(
            url,
            "/booking/iOzi?destination_id=&checkin=&checkout=&lang=en_US&currency=SGD&country_code=SG&guests="
        );
    }

    #[test]
    fn test_room_card_without_images_renders_placeholder() {
        let room = Room {
            key: "r1".to_string(),
            description: "Deluxe King Room".to_string(),
            images: vec![],
            price: 212.4,
            additional_info: RoomAdditionalInfo {
                breakfast_info: Some("Breakfast included".to_string()),
            },
            free_cancellation: true,
        };

        let text = render_room_card(&room, "SGD", "iOzi", &params());
        assert!(text.contains("(no image available)"));
        assert!(text.contains("Deluxe King Room"));
        assert!(text.contains("Breakfast included"));
        assert!(text.contains("SGD 212.4"));
        assert!(text.contains("Free Cancellation"));
        assert!(text.contains("/booking/iOzi?"));
    }

    #[test]
    fn test_room_card_displays_caller_currency_but_links_fixed_one() {
        let room = Room {
            key: "r1".to_string(),
            description: "Twin Room".to_string(),
            images: vec![RoomImage {
                url: "https://img.example/r1.jpg".to_string(),
            }],
            price: 99.0,
            additional_info: RoomAdditionalInfo::default(),
            free_cancellation: false,
        };

        let text = render_room_card(&room, "USD", "iOzi", &params());
        assert!(text.contains("USD 99"));
        assert!(text.contains("currency=SGD"));
        assert!(!text.contains("Free Cancellation"));
    }
}
