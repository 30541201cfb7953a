use eyre::Result;

use super::axis::ViewBounds;
use super::data::{DataPage, DataQuery};

/// Boundary to the external data source.
///
/// The pipeline never assumes synchronous delivery: the orchestrator hands
/// out a fetch ticket, the host runs `fetch_pages` however it likes and
/// resolves the ticket with the result. `fetch_pages` is only required to
/// return the rows whose position falls inside the queried window.
pub trait DataSource: Send + Sync {
    /// Rows covering the queried window.
    fn fetch_pages(&self, query: &DataQuery) -> Result<Vec<DataPage>>;

    /// Total number of rows in the source.
    fn total_count(&self) -> usize;

    /// Full data extent, if the source knows it.
    fn extent(&self) -> Option<ViewBounds>;
}

/// In-memory source over a point list, sorted by x.
pub struct VecDataSource {
    pages: Vec<DataPage>,
    extent: Option<ViewBounds>,
}

impl VecDataSource {
    pub fn new(mut pages: Vec<DataPage>) -> Self {
        pages.sort_by(|a, b| {
            let ax = a.position().map_or(f64::NAN, |(x, _)| x);
            let bx = b.position().map_or(f64::NAN, |(x, _)| x);
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        });
        let extent = Self::compute_extent(&pages);
        Self { pages, extent }
    }

    fn compute_extent(pages: &[DataPage]) -> Option<ViewBounds> {
        let mut b = ViewBounds::new(
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        let mut any = false;
        for p in pages {
            if let Some((x, y)) = p.position() {
                b.x_min = b.x_min.min(x);
                b.x_max = b.x_max.max(x);
                b.y_min = b.y_min.min(y);
                b.y_max = b.y_max.max(y);
                any = true;
            }
        }
        any.then_some(b)
    }
}

impl DataSource for VecDataSource {
    fn fetch_pages(&self, query: &DataQuery) -> Result<Vec<DataPage>> {
        let view = &query.view;
        // Sorted by x, so the window is a contiguous slice.
        let start = self
            .pages
            .partition_point(|p| p.position().is_some_and(|(x, _)| x < view.x_axis_min));
        let end = self
            .pages
            .partition_point(|p| p.position().is_some_and(|(x, _)| x <= view.x_axis_max));

        Ok(self.pages[start..end]
            .iter()
            .filter(|p| {
                p.position()
                    .is_some_and(|(_, y)| y >= view.y_axis_min && y <= view.y_axis_max)
            })
            .cloned()
            .collect())
    }

    fn total_count(&self) -> usize {
        self.pages.len()
    }

    fn extent(&self) -> Option<ViewBounds> {
        self.extent
    }
}
