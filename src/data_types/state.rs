use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use super::axis::ViewBounds;

/// Externally configured pipeline tuning, read once per layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Estimated visible points above which binned mode kicks in.
    pub density_threshold: usize,
    /// Fraction of the threshold the estimate must drop below before
    /// leaving binned mode again. 1.0 disables hysteresis (hard cutoff).
    pub hysteresis: f64,
    /// Bin grid resolution for the binning pass.
    pub bin_cols: usize,
    pub bin_rows: usize,
    /// Trailing-edge debounce delay for data view changes, in milliseconds.
    pub debounce_ms: u64,
    /// Master toggle for binned (density) rendering.
    pub bin_mode_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            density_threshold: 1000,
            hysteresis: 0.8,
            bin_cols: 24,
            bin_rows: 16,
            debounce_ms: 50,
            bin_mode_enabled: true,
        }
    }
}

impl PipelineConfig {
    /// Parses a host-supplied property blob.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).wrap_err("invalid pipeline configuration")
    }
}

/// Layout metadata the pipeline derives decisions from. Fixed for the
/// lifetime of one layout; a new layout replaces the whole struct.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutMeta {
    /// Full data extent, i.e. the home-state window.
    pub home_extent: ViewBounds,
    /// Continuous-axis layout: always binned regardless of density.
    pub is_continuous: bool,
    /// Source flagged the cube as exceeding the raw-rendering budget.
    pub is_big_data: bool,
    /// Static snapshot rendering, no mini overview.
    pub is_snapshot: bool,
    /// Total number of rows in the source.
    pub total_count: usize,
}

/// Locale details forwarded to the rendering engine with the main dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocaleInfo {
    pub decimal_separator: char,
    pub thousand_separator: char,
}

impl Default for LocaleInfo {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            thousand_separator: ',',
        }
    }
}
