//! Pure derivation layer over the view state and layout metadata.
//!
//! Never blocks and has no fetch or aggregation side effects: identical
//! view state and layout always yield a value-equal [`DataView`], which is
//! what lets the orchestrator skip redundant work.

use std::sync::Arc;

use crate::data_types::{CanvasSize, DataView, LayoutMeta};
use crate::transform::PlotTransform;
use crate::view_state::ViewState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewMeta {
    pub is_home_state: bool,
    pub is_continuous: bool,
    pub is_big_data: bool,
}

pub struct ViewHandler {
    view_state: Arc<ViewState>,
    layout: LayoutMeta,
}

impl ViewHandler {
    pub fn new(view_state: Arc<ViewState>, layout: LayoutMeta) -> Self {
        Self { view_state, layout }
    }

    pub fn layout(&self) -> &LayoutMeta {
        &self.layout
    }

    /// The currently visible data window: explicit bounds when zoomed or
    /// panned, the layout's home extent otherwise.
    pub fn data_view(&self) -> DataView {
        match self.view_state.get().bounds {
            Some(bounds) => DataView::from_bounds(&bounds),
            None => DataView::from_bounds(&self.layout.home_extent),
        }
    }

    pub fn meta(&self) -> ViewMeta {
        ViewMeta {
            is_home_state: self.view_state.get().bounds.is_none(),
            is_continuous: self.layout.is_continuous,
            is_big_data: self.layout.is_big_data,
        }
    }

    pub fn interaction_in_progress(&self) -> bool {
        self.view_state.get().interaction_in_progress
    }

    pub fn transform(&self, canvas: CanvasSize) -> PlotTransform {
        PlotTransform::new(self.data_view(), canvas)
    }
}
