//! Boundary to the rendering engine.
//!
//! The engine consumes declarative payloads and is otherwise opaque; the
//! pipeline only guarantees payload shape. Dataset keys are stable so the
//! engine can diff consecutive updates.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::data_types::{DataPage, LocaleInfo};
use crate::keys;

/// Opaque scene settings forwarded verbatim to the engine.
pub type Settings = serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct DatasetEntry {
    pub key: &'static str,
    pub kind: DatasetKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatasetKind {
    /// The primary hypercube-shaped dataset.
    QueryResult {
        pages: Vec<DataPage>,
        locale_info: LocaleInfo,
    },
    /// Row-matrix dataset (the bin layer).
    Matrix {
        fields: Vec<BinField>,
        rows: Vec<BinRow>,
    },
    /// Externally supplied dataset (color layer) passed through untouched.
    External { pages: Vec<DataPage> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinField {
    pub key: &'static str,
    pub title: &'static str,
}

/// The four bin columns, in matrix order.
pub fn bin_fields() -> Vec<BinField> {
    vec![
        BinField {
            key: keys::fields::BIN,
            title: "Bin",
        },
        BinField {
            key: keys::fields::BIN_X,
            title: "X",
        },
        BinField {
            key: keys::fields::BIN_Y,
            title: "Y",
        },
        BinField {
            key: keys::fields::BIN_DENSITY,
            title: "Density",
        },
    ]
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BinRow {
    pub bin: i64,
    pub bin_x: f64,
    pub bin_y: f64,
    pub bin_density: f64,
}

/// Maps a raw aggregation row into a matrix row.
pub fn parse_bin_row(page: &DataPage) -> BinRow {
    BinRow {
        bin: page.element_number,
        bin_x: page.text_values.get(1).copied().unwrap_or(0.0),
        bin_y: page.text_values.get(2).copied().unwrap_or(0.0),
        bin_density: page.numeric_value,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdatePayload {
    pub data: Option<Vec<DatasetEntry>>,
    pub settings: Option<Settings>,
    pub partial_data: bool,
    /// Component keys the engine must not re-measure on a partial update.
    pub exclude_from_update: Vec<&'static str>,
}

impl UpdatePayload {
    pub fn full(data: Vec<DatasetEntry>, settings: Option<Settings>) -> Self {
        Self {
            data: Some(data),
            settings,
            partial_data: false,
            exclude_from_update: Vec::new(),
        }
    }

    pub fn partial(exclude_from_update: Vec<&'static str>) -> Self {
        Self {
            data: None,
            settings: None,
            partial_data: true,
            exclude_from_update,
        }
    }
}

/// The rendering engine collaborator.
pub trait RenderingEngine {
    /// Structural layout pass.
    fn layout_components(&mut self, payload: UpdatePayload);

    /// Data/value refresh without restructuring.
    fn update(&mut self, payload: UpdatePayload);
}

impl<E: RenderingEngine> RenderingEngine for Arc<Mutex<E>> {
    fn layout_components(&mut self, payload: UpdatePayload) {
        self.lock().layout_components(payload);
    }

    fn update(&mut self, payload: UpdatePayload) {
        self.lock().update(payload);
    }
}
