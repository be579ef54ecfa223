use clap::Args;
use comfy_table::Table;
use skyhop_core::{
    config::SkyhopConfig,
    estimator::{RouteComparison, TimeEstimator},
    session::{PairChange, TravelSession},
};
use skyhop_providers::travel_client::TravelClient;
use tracing::info;

use crate::{
    parsers::{self, PlaceArg},
    places,
};

#[derive(Args)]
pub struct CompareArgs {
    /// Origin, as "lat,lng" or a place name
    #[arg(short, long, value_parser = parsers::parse_place)]
    from: PlaceArg,

    /// Destination, as "lat,lng" or a place name
    #[arg(short, long, value_parser = parsers::parse_place)]
    to: PlaceArg,

    /// Print the comparison as JSON
    #[arg(long)]
    json: bool,
}

pub fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, minutes) => format!("{minutes} min"),
        (hours, 0) => format!("{hours} h"),
        (hours, minutes) => format!("{hours} h {minutes} min"),
    }
}

fn comparison_table(from: &str, to: &str, comparison: &RouteComparison) -> Table {
    let unavailable = || String::from("unavailable");

    let mut table = Table::new();
    table.set_header(vec![format!("{from} -> {to}"), String::from("Aerial"), String::from("Cab")]);
    table.add_row(vec![
        String::from("Distance"),
        format!("{} km", comparison.distance_km),
        String::new(),
    ]);
    table.add_row(vec![
        String::from("Time"),
        format_minutes(comparison.flying_minutes),
        comparison
            .cab_minutes
            .map(format_minutes)
            .unwrap_or_else(unavailable),
    ]);
    if let Some(saved) = comparison.minutes_saved() {
        table.add_row(vec![
            String::from("Saved"),
            format_minutes(saved.max(0) as u32),
            String::new(),
        ]);
    }
    table
}

pub async fn run(args: CompareArgs, config: &SkyhopConfig) -> anyhow::Result<()> {
    let client = TravelClient::from_config(config);
    let pair = places::resolve_pair(client.as_ref(), &config.country, &args.from, &args.to).await?;

    let mut session = TravelSession::new();
    let PairChange::Ready(ticket) = session.set_locations(Some(pair.from), Some(pair.to)) else {
        anyhow::bail!("Both places are required");
    };

    let estimator = TimeEstimator::new(client.as_ref(), config.provider_timeout);
    let cab_minutes = estimator
        .cab_minutes(&ticket.pair().from, &ticket.pair().to)
        .await;
    session.apply_cab_minutes(&ticket, cab_minutes);

    let Some(comparison) = session.comparison() else {
        anyhow::bail!("No comparison for the selected places");
    };
    info!(
        "{} -> {}: {} km",
        ticket.pair().from.name(),
        ticket.pair().to.name(),
        comparison.distance_km
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(comparison)?);
    } else {
        println!(
            "{}",
            comparison_table(ticket.pair().from.name(), ticket.pair().to.name(), comparison)
        );
    }

    Ok(())
}
