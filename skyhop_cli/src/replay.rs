use std::{path::PathBuf, time::Duration};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use skyhop_core::{
    config::SkyhopConfig,
    estimator::TimeEstimator,
    renderer::MapRenderer,
    style_viewport::StyleViewport,
    view::TravelView,
};
use skyhop_providers::travel_client::TravelClient;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::{
    compare::format_minutes,
    parsers::{self, PlaceArg},
    places,
};

#[derive(Args)]
pub struct ReplayArgs {
    /// Origin, as "lat,lng" or a place name
    #[arg(short, long, value_parser = parsers::parse_place)]
    from: PlaceArg,

    /// Destination, as "lat,lng" or a place name
    #[arg(short, long, value_parser = parsers::parse_place)]
    to: PlaceArg,

    /// How long to animate (e.g., "12s", "1m", "PT30S")
    #[arg(short, long, value_parser = parsers::parse_duration, default_value = "12s")]
    duration: jiff::SignedDuration,

    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=120))]
    fps: u32,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// File receiving the final style document, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ReplayArgs, config: &SkyhopConfig) -> anyhow::Result<()> {
    let client = TravelClient::from_config(config);
    let pair = places::resolve_pair(client.as_ref(), &config.country, &args.from, &args.to).await?;

    let viewport =
        StyleViewport::with_streets_basemap(config.map.style_url.clone(), args.width, args.height);
    let mut renderer = MapRenderer::initialize(viewport, &config.map)?;
    renderer.on_style_load()?;

    let mut view = TravelView::new(renderer);
    let Some(ticket) = view.on_locations_changed(Some(pair.from), Some(pair.to))? else {
        anyhow::bail!("Both places are required");
    };

    let estimator = TimeEstimator::new(client.as_ref(), config.provider_timeout);
    let lookup = estimator.lookup_driving(ticket.pair());
    tokio::pin!(lookup);
    let mut lookup_pending = true;

    let total_ms = u64::try_from(args.duration.as_millis()).unwrap_or(0);
    let frames = total_ms * u64::from(args.fps) / 1000;

    let bar = ProgressBar::new(frames);
    bar.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} frames ({elapsed})")?);

    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(args.fps)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = Instant::now();

    let mut frame = 0;
    while frame < frames {
        tokio::select! {
            lookup = &mut lookup, if lookup_pending => {
                lookup_pending = false;
                if !view.apply_lookup(&ticket, lookup)? {
                    info!("Driving lookup arrived for a previous pair");
                }
            }
            now = interval.tick() => {
                let timestamp_ms = (now - started).as_secs_f64() * 1000.0;
                view.on_frame(timestamp_ms)?;
                frame += 1;
                bar.inc(1);
            }
        }
    }
    bar.finish_and_clear();

    if lookup_pending {
        warn!("Driving lookup did not finish within the replay");
    }

    if let Some(comparison) = view.comparison() {
        info!(
            "Aerial {} for {} km, cab {}",
            format_minutes(comparison.flying_minutes),
            comparison.distance_km,
            comparison
                .cab_minutes
                .map(format_minutes)
                .unwrap_or_else(|| String::from("unavailable"))
        );
    }
    info!(
        "Reveal {:?} after {frame} frames",
        view.animator().reveal_state()
    );

    let document = view.renderer().viewport().to_json()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, document)?;
            info!("Style written to {}", path.display());
        }
        None => println!("{document}"),
    }

    view.unmount()?;
    Ok(())
}
