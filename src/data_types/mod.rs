pub mod axis;
pub mod data;
pub mod datasource;
pub mod state;

pub use axis::{Axis, CanvasSize, DataView, ViewBounds};
pub use data::{Bin, BinGrid, DataPage, DataQuery, RowState};
pub use datasource::{DataSource, VecDataSource};
pub use state::{LayoutMeta, LocaleInfo, PipelineConfig};
