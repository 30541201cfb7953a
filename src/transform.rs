//! Coordinate projection between the data window and the canvas.

use glam::{DVec2, Vec2};

use crate::data_types::{CanvasSize, DataView};

/// Projects data coordinates into logical screen coordinates for the
/// current data view. Screen y grows downwards.
#[derive(Clone, Copy, Debug)]
pub struct PlotTransform {
    pub view: DataView,
    pub canvas: CanvasSize,
}

impl PlotTransform {
    pub fn new(view: DataView, canvas: CanvasSize) -> Self {
        Self { view, canvas }
    }

    pub fn data_to_screen(&self, point: DVec2) -> Vec2 {
        let x_span = self.view.x_span();
        let y_span = self.view.y_span();
        if x_span <= 0.0 || y_span <= 0.0 {
            return Vec2::ZERO;
        }
        let fx = (point.x - self.view.x_axis_min) / x_span;
        let fy = (point.y - self.view.y_axis_min) / y_span;
        Vec2::new(
            (fx * self.canvas.width as f64) as f32,
            ((1.0 - fy) * self.canvas.height as f64) as f32,
        )
    }

    pub fn screen_to_data(&self, point: Vec2) -> DVec2 {
        let w = self.canvas.width as f64;
        let h = self.canvas.height as f64;
        if w <= 0.0 || h <= 0.0 {
            return DVec2::new(self.view.x_axis_min, self.view.y_axis_min);
        }
        let fx = point.x as f64 / w;
        let fy = 1.0 - point.y as f64 / h;
        DVec2::new(
            self.view.x_axis_min + fx * self.view.x_span(),
            self.view.y_axis_min + fy * self.view.y_span(),
        )
    }
}
