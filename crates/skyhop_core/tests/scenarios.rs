use std::{cell::RefCell, time::Duration};

use skyhop_core::{
    animator::{AnimationKind, RevealState},
    estimator::TimeEstimator,
    location::LngLat,
    path::empty_geojson,
    providers::ProviderError,
    renderer::{AERIAL_SOURCE, DRIVING_SOURCE},
};

use crate::setup::{FakeRoads, FakeRoute, create_view, delhi, mumbai, ok_after, pune};

mod setup;

#[tokio::test(start_paused = true)]
async fn late_response_for_previous_pair_is_discarded() {
    let estimator = TimeEstimator::new(
        Some(FakeRoads::new(vec![
            ok_after("Delhi", 3_000, 72_000.0),
            ok_after("Pune", 500, 10_800.0),
        ])),
        Duration::from_secs(8),
    );
    let view = RefCell::new(create_view());

    let first = view
        .borrow_mut()
        .on_locations_changed(Some(mumbai()), Some(delhi()))
        .unwrap()
        .unwrap();
    let second = view
        .borrow_mut()
        .on_locations_changed(Some(mumbai()), Some(pune()))
        .unwrap()
        .unwrap();

    let (first_applied, second_applied) = tokio::join!(
        async {
            let lookup = estimator.lookup_driving(first.pair()).await;
            view.borrow_mut().apply_lookup(&first, lookup).unwrap()
        },
        async {
            let lookup = estimator.lookup_driving(second.pair()).await;
            view.borrow_mut().apply_lookup(&second, lookup).unwrap()
        }
    );

    assert!(!first_applied);
    assert!(second_applied);

    let view = view.into_inner();
    let comparison = view.comparison().unwrap();
    assert_eq!(comparison.cab_minutes, Some(180));

    let driving = view.session().driving_path().unwrap();
    assert_eq!(driving.last(), Some(&pune().lng_lat()));
    assert_eq!(
        view.renderer().viewport().source_data(DRIVING_SOURCE),
        Some(&driving.to_geojson())
    );
}

#[tokio::test(start_paused = true)]
async fn non_ok_status_leaves_cab_time_unavailable() {
    let estimator = TimeEstimator::new(
        Some(FakeRoads::new(vec![FakeRoute {
            destination: "Delhi",
            delay: Duration::from_millis(200),
            result: Err(ProviderError::Status {
                status: String::from("ZERO_RESULTS"),
                message: String::from("Cannot find route"),
            }),
        }])),
        Duration::from_secs(8),
    );
    let mut view = create_view();

    let ticket = view
        .on_locations_changed(Some(mumbai()), Some(delhi()))
        .unwrap()
        .unwrap();
    let lookup = estimator.lookup_driving(ticket.pair()).await;
    assert!(view.apply_lookup(&ticket, lookup).unwrap());

    let comparison = view.comparison().unwrap();
    assert_eq!(comparison.flying_minutes, 277);
    assert_eq!(comparison.cab_minutes, None);
    assert_eq!(
        view.renderer().viewport().source_data(DRIVING_SOURCE),
        Some(&empty_geojson())
    );
}

#[tokio::test(start_paused = true)]
async fn slow_provider_gives_up_after_timeout() {
    let estimator = TimeEstimator::new(
        Some(FakeRoads::new(vec![ok_after("Delhi", 60_000, 72_000.0)])),
        Duration::from_secs(8),
    );
    let mut view = create_view();

    let ticket = view
        .on_locations_changed(Some(mumbai()), Some(delhi()))
        .unwrap()
        .unwrap();
    let started = tokio::time::Instant::now();
    let lookup = estimator.lookup_driving(ticket.pair()).await;

    assert!(started.elapsed() < Duration::from_secs(9));
    assert!(view.apply_lookup(&ticket, lookup).unwrap());
    assert_eq!(view.comparison().unwrap().cab_minutes, None);
}

#[test]
fn mumbai_to_delhi_flight() {
    let mut view = create_view();
    view.on_locations_changed(Some(mumbai()), Some(delhi()))
        .unwrap();

    let comparison = view.comparison().unwrap();
    assert_eq!(comparison.distance_km, 1153);
    assert_eq!(comparison.flying_minutes, 277);

    let mut timestamp = 0.0;
    let mut reveal_progress = 0.0;
    loop {
        assert!(view.on_frame(timestamp).unwrap());

        let progress = view.animator().reveal().progress();
        assert!(progress >= reveal_progress);
        reveal_progress = progress;

        let vehicle = view.renderer().vehicle().unwrap();
        let marker = view.renderer().viewport().marker(vehicle).unwrap();
        assert!((0.0..360.0).contains(&marker.rotation));

        if view.animator().reveal_state() == RevealState::Complete {
            break;
        }
        timestamp += 16.0;
    }
    assert!((5_000.0..5_016.0).contains(&timestamp));

    let aerial = view.renderer().viewport().layer(AERIAL_SOURCE).unwrap();
    assert!(aerial.paint.get("line-gradient").is_none());

    // Only the marker keeps scheduling frames once the reveal is done.
    assert_eq!(view.animator().frames().pending_for(AnimationKind::Reveal), 0);
    view.on_frame(timestamp).unwrap();
    assert_eq!(view.animator().reveal_state(), RevealState::Complete);
}

#[test]
fn same_origin_and_destination() {
    let mut view = create_view();
    view.on_locations_changed(Some(mumbai()), Some(mumbai()))
        .unwrap();

    let comparison = view.comparison().unwrap();
    assert_eq!(comparison.distance_km, 0);
    assert_eq!(comparison.flying_minutes, 0);

    for timestamp in [0.0, 1_000.0, 9_999.0] {
        view.on_frame(timestamp).unwrap();
        let vehicle = view.renderer().vehicle().unwrap();
        let marker = view.renderer().viewport().marker(vehicle).unwrap();
        assert_eq!(marker.position, LngLat::new(72.8777, 19.0760));
    }
}

#[test]
fn unmount_stops_every_animation() {
    let mut view = create_view();
    view.on_locations_changed(Some(mumbai()), Some(delhi()))
        .unwrap();
    view.on_frame(0.0).unwrap();
    view.on_frame(100.0).unwrap();

    view.teardown().unwrap();
    assert!(view.animator().is_idle());
    assert!(!view.on_frame(200.0).unwrap());

    let viewport = view.unmount().unwrap();
    assert!(viewport.markers().is_empty());
}
