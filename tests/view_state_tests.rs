use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scatter_chart::view_state::{Channel, ViewState};
use scatter_chart::ViewBounds;

#[test]
fn test_set_bounds_fires_data_view_channel() {
    let state = ViewState::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    let _sub = state.subscribe(Channel::DataView, move |snapshot| {
        assert!(snapshot.bounds.is_some());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    state.set_bounds(Some(ViewBounds::new(0.0, 1.0, 0.0, 1.0)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_channels_are_independent() {
    let state = ViewState::new();
    let data_view_hits = Arc::new(AtomicUsize::new(0));
    let interaction_hits = Arc::new(AtomicUsize::new(0));

    let c1 = data_view_hits.clone();
    let _s1 = state.subscribe(Channel::DataView, move |_| {
        c1.fetch_add(1, Ordering::SeqCst);
    });
    let c2 = interaction_hits.clone();
    let _s2 = state.subscribe(Channel::Interaction, move |_| {
        c2.fetch_add(1, Ordering::SeqCst);
    });

    state.set_interaction(true);
    state.set_animation(false);

    assert_eq!(data_view_hits.load(Ordering::SeqCst), 0);
    assert_eq!(interaction_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_snapshot_reflects_all_setters() {
    let state = ViewState::new();
    state.set_bounds(Some(ViewBounds::new(-1.0, 1.0, -2.0, 2.0)));
    state.set_interaction(true);
    state.set_animation(true);

    let snapshot = state.get();
    assert_eq!(snapshot.bounds, Some(ViewBounds::new(-1.0, 1.0, -2.0, 2.0)));
    assert!(snapshot.interaction_in_progress);
    assert!(snapshot.animation_enabled);
}

#[test]
fn test_dropped_subscription_stops_delivery() {
    let state = ViewState::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    let sub = state.subscribe(Channel::DataView, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    state.set_bounds(None);
    drop(sub);
    state.set_bounds(Some(ViewBounds::new(0.0, 1.0, 0.0, 1.0)));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
