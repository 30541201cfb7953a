//! Adaptive scatter/density chart data pipeline.
//!
//! Decides what data an interactive point chart shows and when it redraws:
//! a typed view-state store, a pure view derivation layer, a binning data
//! handler with a generation-stamped fetch protocol, a debounced update
//! orchestrator with partial/full redraw semantics, and a dirty-rect
//! highlight compositor for brush feedback over the rasterized density
//! layer. Rendering, data delivery and gesture emission are trait
//! boundaries; the crate itself is headless.

pub mod actions;
pub mod binning;
pub mod chart_model;
pub mod data_handler;
pub mod data_types;
pub mod engine;
pub mod extremum;
pub mod highlight;
pub mod keys;
pub mod transform;
pub mod view_handler;
pub mod view_state;

pub use actions::{ActionBus, BrushEvent};
pub use chart_model::{ChartModel, ChartModelParams, FetchRequest};
pub use data_handler::{DataHandler, DataMeta, FetchOutcome, FetchTicket};
pub use data_types::{
    Axis, Bin, BinGrid, CanvasSize, DataPage, DataQuery, DataSource, DataView, LayoutMeta,
    LocaleInfo, PipelineConfig, RowState, VecDataSource, ViewBounds,
};
pub use engine::{
    bin_fields, parse_bin_row, BinField, BinRow, DatasetEntry, DatasetKind, RenderingEngine,
    Settings, UpdatePayload,
};
pub use extremum::{Extents, ExtremumModel};
pub use highlight::{DirtyRect, HighlightCompositor, PixelBuffer};
pub use transform::PlotTransform;
pub use view_handler::{ViewHandler, ViewMeta};
pub use view_state::{Channel, Subscription, ViewState, ViewStateSnapshot};
