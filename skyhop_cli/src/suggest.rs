use clap::Args;
use comfy_table::Table;
use skyhop_core::{config::SkyhopConfig, location_input::LocationInputController};
use skyhop_providers::travel_client::TravelClient;
use tracing::warn;

#[derive(Args)]
pub struct SuggestArgs {
    /// Text to search for
    query: String,

    /// ISO country code restricting the results, defaults to SKYHOP_COUNTRY
    #[arg(short, long)]
    country: Option<String>,
}

pub async fn run(args: SuggestArgs, config: &SkyhopConfig) -> anyhow::Result<()> {
    let client = TravelClient::from_config(config);
    if !client.as_ref().is_some_and(TravelClient::has_places) {
        warn!("Place search needs GRAPHHOPPER_API_KEY");
    }

    let country = args.country.unwrap_or_else(|| config.country.clone());
    let controller = LocationInputController::new(client.as_ref(), country, |_, _| {});
    let suggestions = controller.search(&args.query).await?;

    if suggestions.is_empty() {
        println!("No places found in {}", controller.country());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Place", "Lat", "Lng"]);
    for suggestion in suggestions {
        table.add_row(vec![
            suggestion.label,
            format!("{:.5}", suggestion.lat),
            format!("{:.5}", suggestion.lng),
        ]);
    }
    println!("{table}");

    Ok(())
}
