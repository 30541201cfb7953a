use serde::{Deserialize, Serialize};

/// Axis selector for range events, extrema tracking and formatters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Explicit zoom/pan bounds stored in the view state.
///
/// `None` bounds on the view state mean the chart is in its home state and
/// the data view falls back to the layout's home extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// Immutable snapshot of the currently visible data window.
///
/// Derived from the view state on every change, never mutated in place.
/// Value equality is what the orchestrator uses to skip redundant work.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DataView {
    pub x_axis_min: f64,
    pub x_axis_max: f64,
    pub y_axis_min: f64,
    pub y_axis_max: f64,
}

impl DataView {
    pub fn from_bounds(b: &ViewBounds) -> Self {
        Self {
            x_axis_min: b.x_min,
            x_axis_max: b.x_max,
            y_axis_min: b.y_min,
            y_axis_max: b.y_max,
        }
    }

    pub fn x_span(&self) -> f64 {
        self.x_axis_max - self.x_axis_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_axis_max - self.y_axis_min
    }

    pub fn area(&self) -> f64 {
        self.x_span() * self.y_span()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_axis_min && x <= self.x_axis_max && y >= self.y_axis_min && y <= self.y_axis_max
    }

    /// Range along one axis, as (min, max).
    pub fn axis_range(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.x_axis_min, self.x_axis_max),
            Axis::Y => (self.y_axis_min, self.y_axis_max),
        }
    }
}

/// Logical canvas size in CSS pixels, plus the device pixel ratio used to
/// scale into physical buffer coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn physical_width(&self) -> u32 {
        (self.width * self.pixel_ratio).round() as u32
    }

    pub fn physical_height(&self) -> u32 {
        (self.height * self.pixel_ratio).round() as u32
    }
}
