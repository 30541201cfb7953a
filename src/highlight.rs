//! Brush-selection highlight compositor.
//!
//! Sits on a transparent surface stacked above the rasterized density
//! layer. It reads pixels from that layer exactly once per gesture (the
//! snapshot) and then re-stamps sub-rectangles of the snapshot as the
//! brushed range moves, clearing only the previously dirtied rectangle.
//! That keeps the per-pointer-move cost proportional to the highlight,
//! not the canvas, and the density layer itself is never drawn into.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::actions::{ActionBus, BrushEvent, BusSubscription, GestureKind};
use crate::data_types::{Axis, CanvasSize};
use crate::view_handler::ViewHandler;

/// RGBA8 pixel buffer in physical (device) pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let pixels: &[[u8; 4]] = bytemuck::cast_slice(&self.data);
        pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let width = self.width;
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut self.data);
        pixels[(y * width + x) as usize] = rgba;
    }

    /// Forces every non-transparent pixel to full opacity, so stamping the
    /// snapshot later does not streak from partially transparent edges.
    pub fn force_opaque(&mut self) {
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut self.data);
        for px in pixels {
            if px[3] != 0 {
                px[3] = 255;
            }
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn clear_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let (x, y, w, h) = self.clamp_rect(x, y, w, h);
        for row in y..y + h {
            let start = ((row * self.width + x) * 4) as usize;
            let end = start + (w * 4) as usize;
            self.data[start..end].fill(0);
        }
    }

    /// Copies the given region of `src` into the same position here. Both
    /// buffers must share dimensions; mismatches are a silent no-op.
    pub fn stamp_rect_from(&mut self, src: &PixelBuffer, x: u32, y: u32, w: u32, h: u32) {
        if src.width != self.width || src.height != self.height {
            return;
        }
        let (x, y, w, h) = self.clamp_rect(x, y, w, h);
        for row in y..y + h {
            let start = ((row * self.width + x) * 4) as usize;
            let end = start + (w * 4) as usize;
            self.data[start..end].copy_from_slice(&src.data[start..end]);
        }
    }

    fn clamp_rect(&self, x: u32, y: u32, w: u32, h: u32) -> (u32, u32, u32, u32) {
        let x = x.min(self.width);
        let y = y.min(self.height);
        (x, y, w.min(self.width - x), h.min(self.height - y))
    }
}

/// Dirty region in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirtyRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl DirtyRect {
    fn full(canvas: &CanvasSize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: canvas.width,
            h: canvas.height,
        }
    }
}

struct HighlightState {
    view_handler: Arc<ViewHandler>,
    density: Arc<Mutex<PixelBuffer>>,
    canvas: CanvasSize,
    surface: PixelBuffer,
    snapshot: Option<PixelBuffer>,
    dirty: DirtyRect,
}

impl HighlightState {
    fn physical(&self, rect: &DirtyRect) -> (u32, u32, u32, u32) {
        let r = self.canvas.pixel_ratio;
        (
            (rect.x * r).round().max(0.0) as u32,
            (rect.y * r).round().max(0.0) as u32,
            (rect.w * r).round().max(0.0) as u32,
            (rect.h * r).round().max(0.0) as u32,
        )
    }

    fn on_range_start(&mut self) {
        // Lazy: an active highlight keeps its snapshot.
        if self.snapshot.is_some() {
            return;
        }
        let density = self.density.lock();
        if density.is_empty() {
            // The density layer has not been rasterized yet.
            trace!("no raster surface, skipping snapshot");
            return;
        }
        let mut snapshot = density.clone();
        snapshot.force_opaque();
        self.snapshot = Some(snapshot);
    }

    fn on_axis_range(&mut self, range: (f64, f64), axis: Axis) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let view = self.view_handler.data_view();
        let (view_min, view_max) = view.axis_range(axis);
        let span = view_max - view_min;
        if span <= 0.0 {
            return;
        }

        let (dx, dy, dw, dh) = self.physical(&self.dirty);
        self.surface.clear_rect(dx, dy, dw, dh);

        let lo = range.0.min(range.1);
        let hi = range.0.max(range.1);
        let next = match axis {
            Axis::X => {
                let x = ((lo - view_min) * self.canvas.width as f64 / span) as f32;
                let w = ((hi - lo) * self.canvas.width as f64 / span) as f32;
                DirtyRect {
                    x: x.clamp(0.0, self.canvas.width),
                    y: self.dirty.y,
                    w: w.min(self.canvas.width),
                    h: self.dirty.h,
                }
            }
            Axis::Y => {
                // Pixel y grows downwards, data y upwards.
                let y = ((view_max - hi) * self.canvas.height as f64 / span) as f32;
                let h = ((hi - lo) * self.canvas.height as f64 / span) as f32;
                DirtyRect {
                    x: self.dirty.x,
                    y: y.clamp(0.0, self.canvas.height),
                    w: self.dirty.w,
                    h: h.min(self.canvas.height),
                }
            }
        };

        let (sx, sy, sw, sh) = self.physical(&next);
        self.surface.stamp_rect_from(snapshot, sx, sy, sw, sh);
        self.dirty = next;
    }

    fn on_range_highlight_clear(&mut self) {
        self.snapshot = None;
        self.surface.clear();
    }

    fn on_selection_clear(&mut self) {
        self.surface.clear();
        // Reset to the whole extent so the next pass starts from a clean
        // baseline instead of the last-known sub-rectangle.
        self.dirty = DirtyRect::full(&self.canvas);
    }
}

/// Event-driven overlay compositor for brush feedback.
pub struct HighlightCompositor {
    state: Arc<Mutex<HighlightState>>,
    subscriptions: Vec<BusSubscription>,
}

impl HighlightCompositor {
    pub fn new(
        view_handler: Arc<ViewHandler>,
        density: Arc<Mutex<PixelBuffer>>,
        canvas: CanvasSize,
    ) -> Self {
        let surface = PixelBuffer::new(canvas.physical_width(), canvas.physical_height());
        let dirty = DirtyRect::full(&canvas);
        Self {
            state: Arc::new(Mutex::new(HighlightState {
                view_handler,
                density,
                canvas,
                surface,
                snapshot: None,
                dirty,
            })),
            subscriptions: Vec::new(),
        }
    }

    /// Installs the gesture listener set, replacing any previous one.
    pub fn attach(&mut self, bus: &Arc<ActionBus>) {
        // Drop the old registrations first so handlers never double up.
        self.subscriptions.clear();

        let kinds = [
            GestureKind::RangeStart,
            GestureKind::XRange,
            GestureKind::YRange,
            GestureKind::RangeHighlightClear,
            GestureKind::SelectionClear,
        ];
        for kind in kinds {
            let state = self.state.clone();
            self.subscriptions.push(bus.subscribe(kind, move |event| {
                let mut state = state.lock();
                match *event {
                    BrushEvent::RangeStart => state.on_range_start(),
                    BrushEvent::AxisRange { range, axis } => state.on_axis_range(range, axis),
                    BrushEvent::RangeHighlightClear => state.on_range_highlight_clear(),
                    BrushEvent::SelectionClear => state.on_selection_clear(),
                }
            }));
        }
    }

    pub fn dirty_rect(&self) -> DirtyRect {
        self.state.lock().dirty
    }

    pub fn has_snapshot(&self) -> bool {
        self.state.lock().snapshot.is_some()
    }

    /// Read access to the highlight surface (e.g. for presenting it).
    pub fn with_surface<R>(&self, f: impl FnOnce(&PixelBuffer) -> R) -> R {
        f(&self.state.lock().surface)
    }
}
