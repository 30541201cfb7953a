//! Stable identifiers shared with the rendering engine.
//!
//! Dataset and component keys stay constant between updates so the engine
//! can diff payloads instead of rebuilding everything.

pub mod data {
    pub const MAIN: &str = "qHyperCube";
    pub const BIN: &str = "binData";
}

pub mod fields {
    pub const BIN: &str = "bin";
    pub const BIN_X: &str = "binX";
    pub const BIN_Y: &str = "binY";
    pub const BIN_DENSITY: &str = "binDensity";
}

pub mod component {
    pub const POINT: &str = "point-component";
    pub const HEAT_MAP: &str = "heat-map";
    pub const HEAT_MAP_HIGHLIGHT: &str = "heat-map-highlight";
    pub const X_AXIS_TITLE: &str = "x-axis-title";
    pub const Y_AXIS_TITLE: &str = "y-axis-title";
    pub const MINI_CHART_POINT: &str = "mini-chart-point";
}
