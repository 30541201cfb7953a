//! Data-fetch protocol, raw-vs-binned mode decision and bin caching.
//!
//! Fetches are generation-stamped: `begin_fetch` hands out a ticket for the
//! current data view and `resolve` commits a result only when its ticket is
//! still the latest. An older fetch resolving after a newer one is dropped,
//! so recency decides what is applied, not completion order. There is no
//! abort primitive; superseding is the cancellation mechanism.

use eyre::Result;
use tracing::{debug, warn};

use crate::binning::bin_pages;
use crate::data_types::{Bin, BinGrid, DataPage, DataQuery, DataView, LayoutMeta, PipelineConfig};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataMeta {
    pub is_binned_data: bool,
}

/// Generation-stamped fetch descriptor. The host executes `query` against
/// the data source and resolves the ticket with the rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchTicket {
    generation: u64,
    pub query: DataQuery,
    is_home: bool,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// How a resolve settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Result committed; current mode after the commit.
    Settled { is_binned_data: bool },
    /// The ticket was superseded by a newer fetch; nothing committed.
    Stale,
    /// The fetch failed; last-valid mode and bins were kept so the caller
    /// can still redraw.
    Failed { is_binned_data: bool },
}

pub struct DataHandler {
    config: PipelineConfig,
    layout: LayoutMeta,
    generation: u64,
    is_binned: bool,
    bins: Vec<Bin>,
    pages: Vec<DataPage>,
    home_bins: Option<Vec<Bin>>,
}

impl DataHandler {
    pub fn new(config: PipelineConfig, layout: LayoutMeta) -> Self {
        Self {
            config,
            layout,
            generation: 0,
            is_binned: false,
            bins: Vec::new(),
            pages: Vec::new(),
            home_bins: None,
        }
    }

    pub fn meta(&self) -> DataMeta {
        DataMeta {
            is_binned_data: self.is_binned,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Last-committed bin set; empty when in raw mode or nothing has been
    /// computed yet.
    pub fn bin_array(&self) -> &[Bin] {
        &self.bins
    }

    /// Last-committed raw rows for the active window.
    pub fn pages(&self) -> &[DataPage] {
        &self.pages
    }

    /// Cached home-state aggregation; empty until the first home-view
    /// binned fetch settles.
    pub fn home_state_bins(&self) -> &[Bin] {
        self.home_bins.as_deref().unwrap_or(&[])
    }

    /// Drops cached aggregations after a schema or measure change. The
    /// next fetch recomputes from scratch.
    pub fn invalidate(&mut self) {
        self.home_bins = None;
        self.bins.clear();
    }

    /// Replaces the layout (new data reload); all cached state is stale.
    pub fn set_layout(&mut self, layout: LayoutMeta) {
        self.layout = layout;
        self.invalidate();
    }

    /// Rows likely to render in the window, from the visible fraction of
    /// the home extent.
    fn estimate_visible_points(&self, view: &DataView) -> usize {
        let home = DataView::from_bounds(&self.layout.home_extent);
        let home_area = home.area();
        if home_area <= 0.0 {
            return self.layout.total_count;
        }
        let fraction = (view.area() / home_area).clamp(0.0, 1.0);
        (self.layout.total_count as f64 * fraction).round() as usize
    }

    /// Binned mode is selected when the density estimate exceeds the
    /// configured threshold or the layout forces it. Leaving binned mode
    /// requires dropping below `threshold * hysteresis` so the mode does
    /// not flap right at the boundary.
    fn decide_mode(&self, view: &DataView) -> bool {
        if !self.config.bin_mode_enabled {
            return false;
        }
        if self.layout.is_continuous || self.layout.is_big_data {
            return true;
        }
        let estimate = self.estimate_visible_points(view);
        let threshold = self.config.density_threshold;
        if self.is_binned {
            let exit = (threshold as f64 * self.config.hysteresis) as usize;
            estimate > exit
        } else {
            estimate > threshold
        }
    }

    /// Starts a fetch for `view`, superseding any fetch still in flight.
    pub fn begin_fetch(&mut self, view: &DataView, is_home: bool) -> FetchTicket {
        self.generation += 1;
        let binned = self.decide_mode(view);
        FetchTicket {
            generation: self.generation,
            query: DataQuery {
                view: *view,
                binned,
                grid: BinGrid {
                    cols: self.config.bin_cols,
                    rows: self.config.bin_rows,
                },
            },
            is_home,
        }
    }

    /// Commits a fetch result, unless a newer fetch has superseded it.
    pub fn resolve(&mut self, ticket: &FetchTicket, result: Result<Vec<DataPage>>) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale fetch result"
            );
            return FetchOutcome::Stale;
        }

        let pages = match result {
            Ok(pages) => pages,
            Err(err) => {
                warn!(%err, "fetch failed, keeping last-valid data");
                return FetchOutcome::Failed {
                    is_binned_data: self.is_binned,
                };
            }
        };

        if self.is_binned != ticket.query.binned {
            debug!(binned = ticket.query.binned, "render mode switched");
        }
        self.is_binned = ticket.query.binned;
        self.pages = pages;

        if ticket.query.binned {
            if ticket.is_home {
                if self.home_bins.is_none() {
                    self.home_bins = Some(bin_pages(
                        &self.pages,
                        &ticket.query.view,
                        ticket.query.grid,
                    ));
                }
                // Home-state bins are reused until invalidated.
                self.bins = self.home_bins.clone().unwrap_or_default();
            } else {
                self.bins = bin_pages(&self.pages, &ticket.query.view, ticket.query.grid);
            }
        } else {
            self.bins.clear();
        }

        FetchOutcome::Settled {
            is_binned_data: self.is_binned,
        }
    }
}
