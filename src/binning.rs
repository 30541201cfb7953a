//! Fixed-grid density aggregation.
//!
//! A binning pass partitions the visible window into a grid, counts rows
//! per cell and emits one [`Bin`] per non-empty cell. Cell edges snap to a
//! stable size so panning does not make the grid jitter.

use rayon::prelude::*;

use crate::data_types::{Bin, BinGrid, DataPage, DataView};

/// Grid cell size (power-of-ten based 1/2/5 step) just above the ideal
/// resolution for the requested cell count.
pub fn stable_cell_size(range: f64, cells: usize) -> f64 {
    if range <= 0.0 || cells == 0 {
        return 1.0;
    }
    let ideal = range / cells as f64;
    let exponent = ideal.log10().floor();
    let base = 10.0f64.powf(exponent);
    let rel = ideal / base;

    let stable_rel = if rel <= 1.0 {
        1.0
    } else if rel <= 2.0 {
        2.0
    } else if rel <= 5.0 {
        5.0
    } else {
        10.0
    };

    base * stable_rel
}

struct GridSpec {
    origin_x: f64,
    origin_y: f64,
    cell_w: f64,
    cell_h: f64,
    cols: usize,
    rows: usize,
}

impl GridSpec {
    fn for_view(view: &DataView, grid: BinGrid) -> Option<Self> {
        if view.x_span() <= 0.0 || view.y_span() <= 0.0 || grid.cell_count() == 0 {
            return None;
        }
        let cell_w = stable_cell_size(view.x_span(), grid.cols);
        let cell_h = stable_cell_size(view.y_span(), grid.rows);
        // Snap the origin to the cell size so a pan re-uses the same cells.
        let origin_x = (view.x_axis_min / cell_w).floor() * cell_w;
        let origin_y = (view.y_axis_min / cell_h).floor() * cell_h;
        let cols = ((view.x_axis_max - origin_x) / cell_w).ceil().max(1.0) as usize;
        let rows = ((view.y_axis_max - origin_y) / cell_h).ceil().max(1.0) as usize;
        Some(Self {
            origin_x,
            origin_y,
            cell_w,
            cell_h,
            cols,
            rows,
        })
    }

    fn cell_index(&self, x: f64, y: f64) -> Option<usize> {
        let col = ((x - self.origin_x) / self.cell_w).floor() as isize;
        let row = ((y - self.origin_y) / self.cell_h).floor() as isize;
        // Points sitting exactly on the max edge land in the last cell.
        let col = col.min(self.cols as isize - 1);
        let row = row.min(self.rows as isize - 1);
        if col < 0 || row < 0 {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }
}

/// Aggregates rows covering `view` into density bins on a
/// `grid.cols x grid.rows` (stable-sized) grid.
pub fn bin_pages(pages: &[DataPage], view: &DataView, grid: BinGrid) -> Vec<Bin> {
    let Some(spec) = GridSpec::for_view(view, grid) else {
        return Vec::new();
    };
    let cell_count = spec.cols * spec.rows;

    let counts = pages
        .par_iter()
        .fold(
            || vec![0u32; cell_count],
            |mut counts, page| {
                if let Some((x, y)) = page.position() {
                    if view.contains(x, y) {
                        if let Some(idx) = spec.cell_index(x, y) {
                            counts[idx] += 1;
                        }
                    }
                }
                counts
            },
        )
        .reduce(
            || vec![0u32; cell_count],
            |mut a, b| {
                for (acc, add) in a.iter_mut().zip(b) {
                    *acc += add;
                }
                a
            },
        );

    counts
        .into_iter()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .map(|(idx, count)| {
            let col = idx % spec.cols;
            let row = idx / spec.cols;
            let x0 = spec.origin_x + col as f64 * spec.cell_w;
            let y0 = spec.origin_y + row as f64 * spec.cell_h;
            let x1 = x0 + spec.cell_w;
            let y1 = y0 + spec.cell_h;
            Bin {
                id: idx as i64,
                x_range: (x0, x1),
                y_range: (y0, y1),
                density: count as f64,
                representatives: vec![x0, (x0 + x1) / 2.0, (y0 + y1) / 2.0, y0],
            }
        })
        .collect()
}
