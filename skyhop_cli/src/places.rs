use anyhow::anyhow;
use skyhop_core::{
    location::{Location, LocationPair},
    location_input::{LocationField, LocationInputController},
    providers::{PlaceSuggestion, PlacesProvider},
};
use tracing::debug;

use crate::parsers::PlaceArg;

/// Picks the first suggestion for queries. Coordinates skip the places provider.
pub async fn resolve_pair<P: PlacesProvider>(
    places: P,
    country: &str,
    from: &PlaceArg,
    to: &PlaceArg,
) -> anyhow::Result<LocationPair> {
    let mut controller = LocationInputController::new(places, country, |from, to| {
        debug!(
            "Selected {:?} -> {:?}",
            from.map(Location::name),
            to.map(Location::name)
        );
    });

    for (field, place) in [(LocationField::From, from), (LocationField::To, to)] {
        let suggestion = match place {
            PlaceArg::Coordinates { lat, lng } => PlaceSuggestion {
                label: format!("{lat},{lng}"),
                lat: *lat,
                lng: *lng,
            },
            PlaceArg::Query(query) => controller
                .search(query)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("No place found for {query:?} in {country}"))?,
        };

        controller.select(field, &suggestion)?;
    }

    match (controller.from(), controller.to()) {
        (Some(from), Some(to)) => Ok(LocationPair {
            from: from.clone(),
            to: to.clone(),
        }),
        _ => Err(anyhow!("Both places are required")),
    }
}
