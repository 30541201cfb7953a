use std::sync::Arc;

use eyre::eyre;
use parking_lot::Mutex;
use scatter_chart::chart_model::{ChartModel, ChartModelParams};
use scatter_chart::engine::{
    bin_fields, parse_bin_row, DatasetEntry, DatasetKind, RenderingEngine, UpdatePayload,
};
use scatter_chart::view_state::ViewState;
use scatter_chart::{
    keys, Axis, BinRow, DataPage, LayoutMeta, LocaleInfo, PipelineConfig, ViewBounds,
};

#[derive(Default)]
struct RecordingEngine {
    layouts: Vec<UpdatePayload>,
    updates: Vec<UpdatePayload>,
}

impl RenderingEngine for RecordingEngine {
    fn layout_components(&mut self, payload: UpdatePayload) {
        self.layouts.push(payload);
    }

    fn update(&mut self, payload: UpdatePayload) {
        self.updates.push(payload);
    }
}

type Engine = Arc<Mutex<RecordingEngine>>;

fn layout(total: usize) -> LayoutMeta {
    LayoutMeta {
        home_extent: ViewBounds::new(0.0, 100.0, 0.0, 100.0),
        total_count: total,
        ..Default::default()
    }
}

fn make_model(total: usize) -> (ChartModel<Engine>, Engine, Arc<ViewState>) {
    let engine: Engine = Arc::new(Mutex::new(RecordingEngine::default()));
    let view_state = ViewState::new();
    let model = ChartModel::new(ChartModelParams {
        engine: engine.clone(),
        view_state: view_state.clone(),
        layout: layout(total),
        config: PipelineConfig::default(),
        locale_info: LocaleInfo::default(),
        color_data: Vec::new(),
    });
    (model, engine, view_state)
}

fn pages(n: usize) -> Vec<DataPage> {
    (0..n)
        .map(|i| DataPage::point(i as i64, (i % 10) as f64 * 10.0, ((i / 10) % 10) as f64 * 10.0))
        .collect()
}

#[test]
fn test_parse_bin_row_exact_mapping() {
    let page = DataPage {
        element_number: 1,
        numeric_value: 5.0,
        state: Default::default(),
        text_values: vec![1.0, 2.0, 3.0, 4.0],
    };
    assert_eq!(
        parse_bin_row(&page),
        BinRow {
            bin: 1,
            bin_x: 2.0,
            bin_y: 3.0,
            bin_density: 5.0,
        }
    );
}

#[test]
fn test_bin_fields_enumeration() {
    let fields = bin_fields();
    let pairs: Vec<(&str, &str)> = fields.iter().map(|f| (f.key, f.title)).collect();
    assert_eq!(
        pairs,
        vec![
            ("bin", "Bin"),
            ("binX", "X"),
            ("binY", "Y"),
            ("binDensity", "Density"),
        ]
    );
}

#[test]
fn test_interaction_in_progress_skips_fetch() {
    let (mut model, engine, view_state) = make_model(100);

    view_state.set_interaction(true);
    view_state.set_bounds(Some(ViewBounds::new(0.0, 10.0, 0.0, 10.0)));

    assert!(model.poll(0).is_none());
    assert!(model.poll(1000).is_none());
    assert!(engine.lock().updates.is_empty());
}

#[test]
fn test_debounce_fires_on_trailing_edge_only() {
    let (mut model, _engine, view_state) = make_model(100);

    view_state.set_bounds(Some(ViewBounds::new(0.0, 10.0, 0.0, 10.0)));
    assert!(model.poll(0).is_none());
    assert!(model.poll(49).is_none());
    assert!(model.poll(50).is_some());
    // Nothing pending afterwards.
    assert!(model.poll(51).is_none());
}

#[test]
fn test_debounce_coalesces_rapid_changes() {
    let (mut model, _engine, view_state) = make_model(100);

    view_state.set_bounds(Some(ViewBounds::new(0.0, 10.0, 0.0, 10.0)));
    assert!(model.poll(0).is_none());
    // A second change before the deadline replaces the pending slot.
    view_state.set_bounds(Some(ViewBounds::new(0.0, 20.0, 0.0, 20.0)));
    assert!(model.poll(30).is_none());
    assert!(model.poll(50).is_none());
    let request = model.poll(80).expect("trailing edge");
    assert_eq!(request.query().view.x_axis_max, 20.0);
    assert!(model.poll(200).is_none());
}

#[test]
fn test_partial_update_when_nothing_changed() {
    let (mut model, engine, view_state) = make_model(100);

    view_state.set_bounds(Some(ViewBounds::new(0.0, 10.0, 0.0, 10.0)));
    model.poll(0);
    let request = model.poll(50).unwrap();
    model.complete_fetch(request, Ok(pages(10)));

    let updates = &engine.lock().updates;
    assert_eq!(updates.len(), 1);
    assert!(updates[0].partial_data);
    assert!(updates[0].data.is_none());
    assert_eq!(
        updates[0].exclude_from_update,
        vec![
            keys::component::X_AXIS_TITLE,
            keys::component::Y_AXIS_TITLE,
            keys::component::MINI_CHART_POINT,
        ]
    );
}

#[test]
fn test_mode_switch_triggers_full_update() {
    let (mut model, engine, view_state) = make_model(5000);

    // Home view with 5000 rows: binned, and the mode flips from the
    // initial raw state.
    view_state.set_bounds(None);
    model.poll(0);
    let request = model.poll(50).unwrap();
    assert!(request.query().binned);
    model.complete_fetch(request, Ok(pages(5000)));

    {
        let updates = &engine.lock().updates;
        assert_eq!(updates.len(), 1);
        assert!(!updates[0].partial_data);
        let data = updates[0].data.as_ref().unwrap();
        assert_eq!(data[0].key, keys::data::MAIN);
        assert!(matches!(data[0].kind, DatasetKind::QueryResult { .. }));
        assert_eq!(data[1].key, keys::data::BIN);
        match &data[1].kind {
            DatasetKind::Matrix { fields, rows } => {
                assert_eq!(*fields, bin_fields());
                assert!(!rows.is_empty());
            }
            other => panic!("expected matrix dataset, got {other:?}"),
        }
    }

    // Second settlement in the same mode with the overview unchanged:
    // partial.
    view_state.set_bounds(Some(ViewBounds::new(0.0, 90.0, 0.0, 90.0)));
    model.poll(100);
    let request = model.poll(150).unwrap();
    model.complete_fetch(request, Ok(pages(4000)));

    let updates = &engine.lock().updates;
    assert_eq!(updates.len(), 2);
    assert!(updates[1].partial_data);
}

#[test]
fn test_failed_fetch_still_updates_exactly_once() {
    let (mut model, engine, view_state) = make_model(100);

    view_state.set_bounds(Some(ViewBounds::new(0.0, 10.0, 0.0, 10.0)));
    model.poll(0);
    let request = model.poll(50).unwrap();
    model.complete_fetch(request, Err(eyre!("connection lost")));

    // The chart must not stall on a failed fetch.
    assert_eq!(engine.lock().updates.len(), 1);
}

#[test]
fn test_stale_fetch_does_not_overwrite_newer_result() {
    let (mut model, engine, view_state) = make_model(100);

    view_state.set_bounds(Some(ViewBounds::new(0.0, 10.0, 0.0, 10.0)));
    model.poll(0);
    let older = model.poll(50).unwrap();

    view_state.set_bounds(Some(ViewBounds::new(20.0, 30.0, 20.0, 30.0)));
    model.poll(60);
    let newer = model.poll(110).unwrap();

    model.complete_fetch(newer, Ok(pages(7)));
    assert_eq!(model.data_handler().pages().len(), 7);

    // The older fetch resolves after the newer one: silently dropped.
    model.complete_fetch(older, Ok(pages(90)));
    assert_eq!(model.data_handler().pages().len(), 7);
    assert_eq!(engine.lock().updates.len(), 1);
}

#[test]
fn test_mini_overview_toggle_triggers_full_updates() {
    let (mut model, engine, view_state) = make_model(5000);

    // Settlement 1: home + binned populates the home cache, the overview
    // flips off -> on.
    view_state.set_bounds(None);
    model.poll(0);
    let request = model.poll(50).unwrap();
    model.complete_fetch(request, Ok(pages(5000)));
    assert!(model.mini_chart_enabled());

    // Settlement 2: schema change drops the cache, overview flips
    // on -> off while the view moves to a sparse window.
    model.data_handler_mut().invalidate();
    view_state.set_bounds(Some(ViewBounds::new(0.0, 5.0, 0.0, 5.0)));
    model.poll(100);
    let request = model.poll(150).unwrap();
    assert!(!request.query().binned);
    model.complete_fetch(request, Ok(pages(5)));
    assert!(!model.mini_chart_enabled());

    let updates = &engine.lock().updates;
    assert_eq!(updates.len(), 2);
    for update in updates.iter() {
        assert!(!update.partial_data);
        let data = update.data.as_ref().unwrap();
        assert_eq!(data[0].key, keys::data::MAIN);
    }
}

#[test]
fn test_color_data_appended_to_full_updates() {
    let engine: Engine = Arc::new(Mutex::new(RecordingEngine::default()));
    let view_state = ViewState::new();
    let color_entry = DatasetEntry {
        key: "color-layer",
        kind: DatasetKind::External {
            pages: vec![DataPage::point(0, 1.0, 1.0)],
        },
    };
    let mut model = ChartModel::new(ChartModelParams {
        engine: engine.clone(),
        view_state: view_state.clone(),
        layout: layout(5000),
        config: PipelineConfig::default(),
        locale_info: LocaleInfo::default(),
        color_data: vec![color_entry.clone()],
    });

    view_state.set_bounds(None);
    model.poll(0);
    let request = model.poll(50).unwrap();
    model.complete_fetch(request, Ok(pages(5000)));

    let updates = &engine.lock().updates;
    let data = updates[0].data.as_ref().unwrap();
    assert_eq!(data.last(), Some(&color_entry));
}

#[test]
fn test_prelayout_cleared_by_layout_components() {
    let (mut model, engine, _view_state) = make_model(100);

    assert!(model.is_prelayout());
    let settings = serde_json::json!({ "key": "settings" });
    model.layout_components(Some(settings.clone()));
    assert!(!model.is_prelayout());

    let layouts = &engine.lock().layouts;
    assert_eq!(layouts.len(), 1);
    assert_eq!(layouts[0].settings, Some(settings));
    let data = layouts[0].data.as_ref().unwrap();
    assert_eq!(data[0].key, keys::data::MAIN);
}

#[test]
fn test_layout_components_seeds_extrema() {
    let (mut model, _engine, _view_state) = make_model(100);
    model.layout_components(None);

    let x = model.extremum().extents(Axis::X);
    assert_eq!((x.min, x.max), (0.0, 100.0));
}

#[test]
fn test_update_command_pushes_dataset() {
    let (mut model, engine, _view_state) = make_model(100);
    model.update(None);

    let updates = &engine.lock().updates;
    assert_eq!(updates.len(), 1);
    assert!(!updates[0].partial_data);
    assert!(updates[0].data.is_some());
}

#[test]
fn test_formatter_uses_locale_decimal_separator() {
    let engine: Engine = Arc::new(Mutex::new(RecordingEngine::default()));
    let model = ChartModel::new(ChartModelParams {
        engine,
        view_state: ViewState::new(),
        layout: layout(10),
        config: PipelineConfig::default(),
        locale_info: LocaleInfo {
            decimal_separator: ',',
            thousand_separator: '.',
        },
        color_data: Vec::new(),
    });

    assert_eq!(model.formatter(Axis::X).format(1.5), "1,5");
    assert_eq!(model.formatter(Axis::Y).format(3.0), "3");
}

#[test]
fn test_mini_chart_disabled_in_snapshot_layout() {
    let engine: Engine = Arc::new(Mutex::new(RecordingEngine::default()));
    let view_state = ViewState::new();
    let mut snapshot_layout = layout(5000);
    snapshot_layout.is_snapshot = true;
    let mut model = ChartModel::new(ChartModelParams {
        engine,
        view_state: view_state.clone(),
        layout: snapshot_layout,
        config: PipelineConfig::default(),
        locale_info: LocaleInfo::default(),
        color_data: Vec::new(),
    });

    view_state.set_bounds(None);
    model.poll(0);
    let request = model.poll(50).unwrap();
    model.complete_fetch(request, Ok(pages(5000)));

    assert!(!model.data_handler().home_state_bins().is_empty());
    assert!(!model.mini_chart_enabled());
}
