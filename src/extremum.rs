//! Rolling per-axis extrema for scale stability.
//!
//! Extents only widen as new layouts arrive; they shrink only through an
//! explicit reset (full data reload). Keeping the widest observed range
//! stops the axes from re-scaling on every partial update.

use crate::data_types::Axis;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extents {
    pub min: f64,
    pub max: f64,
}

impl Default for Extents {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Extents {
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtremumModel {
    x: Extents,
    y: Extents,
}

impl ExtremumModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extents(&self, axis: Axis) -> Extents {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Widens the tracked range; never narrows it.
    pub fn update_extrema(&mut self, axis: Axis, min: f64, max: f64) {
        let e = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        };
        e.min = e.min.min(min);
        e.max = e.max.max(max);
    }

    /// Full data reload: start tracking from scratch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
