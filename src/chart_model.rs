//! Update orchestration.
//!
//! Subscribes to data-view changes, debounces them through a single-slot
//! pending register, drives generation-stamped fetches and decides whether
//! the rendering engine gets a partial or a full update. Time is passed in
//! by the host (milliseconds), so scheduling is deterministic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eyre::Result;
use tracing::debug;

use crate::data_handler::{DataHandler, FetchOutcome, FetchTicket};
use crate::data_types::{
    Axis, DataPage, DataQuery, DataSource, LayoutMeta, LocaleInfo, PipelineConfig,
};
use crate::engine::{
    bin_fields, parse_bin_row, DatasetEntry, DatasetKind, RenderingEngine, Settings, UpdatePayload,
};
use crate::extremum::ExtremumModel;
use crate::keys;
use crate::view_handler::ViewHandler;
use crate::view_state::{Channel, Subscription, ViewState};

/// Single-slot trailing-edge debounce. Arming replaces any pending
/// deadline; only the newest one can fire.
#[derive(Debug, Default)]
struct DebounceSlot {
    deadline: Option<u64>,
}

impl DebounceSlot {
    fn arm(&mut self, now_ms: u64, delay_ms: u64) {
        self.deadline = Some(now_ms + delay_ms);
    }

    fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// An in-flight fetch the host must execute and hand back through
/// [`ChartModel::complete_fetch`].
#[derive(Debug)]
pub struct FetchRequest {
    ticket: FetchTicket,
}

impl FetchRequest {
    pub fn query(&self) -> &DataQuery {
        &self.ticket.query
    }
}

/// Locale-aware measure formatter.
#[derive(Clone, Debug)]
pub struct Formatter {
    locale: LocaleInfo,
}

impl Formatter {
    pub fn format(&self, value: f64) -> String {
        let s = format!("{value}");
        if self.locale.decimal_separator == '.' {
            s
        } else {
            s.replace('.', &self.locale.decimal_separator.to_string())
        }
    }
}

pub struct ChartModelParams<E> {
    pub engine: E,
    pub view_state: Arc<ViewState>,
    pub layout: LayoutMeta,
    pub config: PipelineConfig,
    pub locale_info: LocaleInfo,
    /// Externally supplied color-layer datasets, appended to full updates.
    pub color_data: Vec<DatasetEntry>,
}

pub struct ChartModel<E: RenderingEngine> {
    engine: E,
    view_state: Arc<ViewState>,
    view_handler: Arc<ViewHandler>,
    data_handler: DataHandler,
    extremum: ExtremumModel,
    locale_info: LocaleInfo,
    color_data: Vec<DatasetEntry>,
    debounce: DebounceSlot,
    debounce_ms: u64,
    data_view_dirty: Arc<AtomicBool>,
    prev_binned: bool,
    prev_mini_visible: bool,
    prelayout: bool,
    _subscription: Subscription,
}

impl<E: RenderingEngine> ChartModel<E> {
    pub fn new(params: ChartModelParams<E>) -> Self {
        let ChartModelParams {
            engine,
            view_state,
            layout,
            config,
            locale_info,
            color_data,
        } = params;

        let view_handler = Arc::new(ViewHandler::new(view_state.clone(), layout));
        let debounce_ms = config.debounce_ms;
        let data_handler = DataHandler::new(config, layout);

        // The subscription only marks the slot dirty; all real work happens
        // in poll() so callbacks never re-enter the model. A change during
        // an active gesture is dropped outright to avoid fetch storms.
        let data_view_dirty = Arc::new(AtomicBool::new(false));
        let dirty = data_view_dirty.clone();
        let subscription = view_state.subscribe(Channel::DataView, move |snapshot| {
            if !snapshot.interaction_in_progress {
                dirty.store(true, Ordering::Release);
            }
        });

        Self {
            engine,
            view_state,
            view_handler,
            data_handler,
            extremum: ExtremumModel::new(),
            locale_info,
            color_data,
            debounce: DebounceSlot::default(),
            debounce_ms,
            data_view_dirty,
            prev_binned: false,
            prev_mini_visible: false,
            prelayout: true,
            _subscription: subscription,
        }
    }

    // ---- queries ----

    pub fn view_state(&self) -> &Arc<ViewState> {
        &self.view_state
    }

    pub fn view_handler(&self) -> &Arc<ViewHandler> {
        &self.view_handler
    }

    pub fn data_handler(&self) -> &DataHandler {
        &self.data_handler
    }

    pub fn data_handler_mut(&mut self) -> &mut DataHandler {
        &mut self.data_handler
    }

    pub fn locale_info(&self) -> &LocaleInfo {
        &self.locale_info
    }

    pub fn extremum(&self) -> &ExtremumModel {
        &self.extremum
    }

    /// True until the first structural layout pass; consumers should not
    /// act on chart geometry before that.
    pub fn is_prelayout(&self) -> bool {
        self.prelayout
    }

    pub fn formatter(&self, _axis: Axis) -> Formatter {
        Formatter {
            locale: self.locale_info.clone(),
        }
    }

    /// The mini overview needs the cached home aggregation as its data and
    /// never shows in snapshots.
    pub fn mini_chart_enabled(&self) -> bool {
        !self.view_handler.layout().is_snapshot && !self.data_handler.home_state_bins().is_empty()
    }

    // ---- commands ----

    /// Structural layout pass; clears the prelayout flag.
    pub fn layout_components(&mut self, settings: Option<Settings>) {
        let home = self.view_handler.layout().home_extent;
        self.extremum.update_extrema(Axis::X, home.x_min, home.x_max);
        self.extremum.update_extrema(Axis::Y, home.y_min, home.y_max);

        let payload = UpdatePayload::full(self.build_data(), settings);
        self.engine.layout_components(payload);
        self.prelayout = false;
    }

    /// Data/value refresh without restructuring.
    pub fn update(&mut self, settings: Option<Settings>) {
        let payload = UpdatePayload::full(self.build_data(), settings);
        self.engine.update(payload);
    }

    // ---- redraw state machine ----

    /// Advances the debounce clock. Returns a fetch request once the
    /// trailing edge fires; the request supersedes any fetch still in
    /// flight (its result will resolve as stale).
    pub fn poll(&mut self, now_ms: u64) -> Option<FetchRequest> {
        if self.data_view_dirty.swap(false, Ordering::AcqRel) {
            self.debounce.arm(now_ms, self.debounce_ms);
        }
        if !self.debounce.fire(now_ms) {
            return None;
        }
        let view = self.view_handler.data_view();
        let is_home = self.view_handler.meta().is_home_state;
        let ticket = self.data_handler.begin_fetch(&view, is_home);
        Some(FetchRequest { ticket })
    }

    /// Resolves a fetch. Stale results are discarded silently; failures
    /// keep last-valid data but still redraw so the view never freezes.
    pub fn complete_fetch(&mut self, request: FetchRequest, result: Result<Vec<DataPage>>) {
        let outcome = self.data_handler.resolve(&request.ticket, result);
        let is_binned = match outcome {
            FetchOutcome::Stale => return,
            FetchOutcome::Settled { is_binned_data } | FetchOutcome::Failed { is_binned_data } => {
                is_binned_data
            }
        };

        let mini_visible = self.mini_chart_enabled();
        if is_binned == self.prev_binned && mini_visible == self.prev_mini_visible {
            // Same mode, same components: skip re-measuring the expensive
            // parts.
            self.engine.update(UpdatePayload::partial(vec![
                keys::component::X_AXIS_TITLE,
                keys::component::Y_AXIS_TITLE,
                keys::component::MINI_CHART_POINT,
            ]));
        } else {
            debug!(
                is_binned,
                mini_visible, "mode or overview changed, full update"
            );
            self.update(None);
        }
        self.prev_binned = is_binned;
        self.prev_mini_visible = mini_visible;
    }

    /// Convenience driver for hosts with a synchronous source: polls and,
    /// when a fetch fires, executes and resolves it in one go.
    pub fn pump(&mut self, now_ms: u64, source: &dyn DataSource) {
        if let Some(request) = self.poll(now_ms) {
            let result = source.fetch_pages(request.query());
            self.complete_fetch(request, result);
        }
    }

    fn build_data(&self) -> Vec<DatasetEntry> {
        let mut data = vec![DatasetEntry {
            key: keys::data::MAIN,
            kind: DatasetKind::QueryResult {
                pages: self.data_handler.pages().to_vec(),
                locale_info: self.locale_info.clone(),
            },
        }];
        if self.data_handler.meta().is_binned_data {
            data.push(DatasetEntry {
                key: keys::data::BIN,
                kind: DatasetKind::Matrix {
                    fields: bin_fields(),
                    rows: self
                        .data_handler
                        .bin_array()
                        .iter()
                        .map(|bin| parse_bin_row(&bin.to_page()))
                        .collect(),
                },
            });
        }
        data.extend(self.color_data.iter().cloned());
        data
    }
}
