use super::axis::DataView;

/// Selection state of a raw row, as reported by the data source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowState {
    #[default]
    Locked,
    Selected,
    Excluded,
}

/// One raw row supplied by the data source. Immutable once received.
///
/// `text_values` carries the auxiliary per-row numbers the source encodes
/// alongside the measure (for bin rows: the cell geometry).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataPage {
    pub element_number: i64,
    pub numeric_value: f64,
    pub state: RowState,
    pub text_values: Vec<f64>,
}

impl DataPage {
    pub fn point(element_number: i64, x: f64, y: f64) -> Self {
        Self {
            element_number,
            numeric_value: 0.0,
            state: RowState::Locked,
            text_values: vec![x, y],
        }
    }

    /// X/Y position of a point row, when present.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self.text_values.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Grid resolution for a binning pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinGrid {
    pub cols: usize,
    pub rows: usize,
}

impl BinGrid {
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

/// One aggregated density cell.
///
/// `representatives` is the value row handed to the matrix dataset:
/// `[x0, x_center, y_center, y0]`, indexed by [`parse_bin_row`].
///
/// [`parse_bin_row`]: crate::engine::parse_bin_row
#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    pub id: i64,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub density: f64,
    pub representatives: Vec<f64>,
}

impl Bin {
    /// Bin rendered as a raw matrix row.
    pub fn to_page(&self) -> DataPage {
        DataPage {
            element_number: self.id,
            numeric_value: self.density,
            state: RowState::Locked,
            text_values: self.representatives.clone(),
        }
    }
}

/// The query a fetch ticket describes: the window to cover and whether the
/// source rows will be aggregated into bins on resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataQuery {
    pub view: DataView,
    pub binned: bool,
    pub grid: BinGrid,
}
