// hotel-results: drives one search session against the backend and renders
// the results page as text. The positional argument is the results-page
// location, e.g. "/results/RsBU?checkin=2025-10-01&checkout=2025-10-07&guests=2".

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hotel_results::client::{ClientConfig, HttpSearchApi};
use hotel_results::params::SearchParams;
use hotel_results::pipeline::{SortBy, StarRange};
use hotel_results::session::ResultsSession;
use hotel_results::view;

#[derive(Parser, Debug)]
#[command(name = "hotel-results")]
#[command(about = "Hotel search results page, rendered in a terminal")]
struct Args {
    /// Results-page location: /results/{destination_id}?checkin=..&checkout=..&guests=..
    url: String,

    /// Backend base URL
    #[arg(long, env = "BACKEND_URL")]
    base_url: String,

    /// Sort criterion label, e.g. "Price (Ascending)"
    #[arg(long, default_value = SortBy::DEFAULT_LABEL)]
    sort: String,

    /// Lower star bound, inclusive
    #[arg(long, default_value_t = 0.5)]
    min_stars: f32,

    /// Upper star bound, inclusive
    #[arg(long, default_value_t = 5.0)]
    max_stars: f32,

    /// Keep re-rendering after prices complete (hotel metadata re-polls forever)
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let params = SearchParams::from_url(&args.url);
    let config = ClientConfig {
        base_url: args.base_url.clone(),
        ..Default::default()
    };
    let api = HttpSearchApi::new(&config).context("backend configuration")?;

    let mut session = ResultsSession::new(Arc::new(api), config, params);
    session.set_sort_label(args.sort.as_str());
    session.set_star_range(StarRange {
        min: args.min_stars,
        max: args.max_stars,
    });

    info!(destination = ?session.params().destination_id, "starting search session");

    loop {
        session.changed().await;

        let snapshot = session.snapshot();
        print!("{}", view::render_results(&snapshot, session.params()));
        println!();

        if !snapshot.is_loading && !args.watch {
            break;
        }
    }

    Ok(())
}
