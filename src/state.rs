//! Owned viewer state and the commands a host shell invokes on it.
//!
//! The state holds the current call summary, the cluster image registry, the
//! selected marker and the active view. Every load either fully replaces the
//! relevant part of the state or leaves it untouched and records a status
//! message.

use anyhow::Result;
use camino::Utf8Path;
use log::{debug, info, warn};

use crate::batch::{BatchProgress, BatchSource, ImageLoader, build_registry};
use crate::model::{AggregateCounts, ClusterK, Row};
use crate::registry::{ImageHandle, ImageRegistry};
use crate::selection::{PanelImage, caption, resolve_selection, revalidate_selection};
use crate::summary::SummaryView;
use crate::table::{TableLayout, TableReader, interpret_with_layout};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Start,
    Summary,
    Cluster(ClusterK),
}

/// Application state for one viewer session.
#[derive(Debug)]
pub struct ViewerState<H: ImageHandle> {
    summary: AggregateCounts,
    layout: Option<TableLayout>,
    registry: ImageRegistry<H>,
    selected: Option<String>,
    view: View,
    status: Option<String>,
    load_generation: u64,
    cluster_generation: u64,
}

impl<H: ImageHandle> Default for ViewerState<H> {
    fn default() -> Self {
        Self {
            summary: AggregateCounts::default(),
            layout: None,
            registry: ImageRegistry::new(),
            selected: None,
            view: View::default(),
            status: None,
            load_generation: 0,
            cluster_generation: 0,
        }
    }
}

impl<H: ImageHandle> ViewerState<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &AggregateCounts {
        &self.summary
    }

    /// Layout of the last successfully loaded table.
    pub fn layout(&self) -> Option<&TableLayout> {
        self.layout.as_ref()
    }

    pub fn registry(&self) -> &ImageRegistry<H> {
        &self.registry
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ── Summary table ─────────────────────────────────────────────────────

    /// Start a table load. Only the most recently started load may publish
    /// its result; pass the returned ticket to [`Self::finish_summary_load`].
    pub fn begin_summary_load(&mut self) -> u64 {
        self.load_generation += 1;
        self.status = Some("Loading cohort calls".to_string());
        self.load_generation
    }

    /// True if `ticket` belongs to the most recently started table load.
    pub fn is_current_load(&self, ticket: u64) -> bool {
        ticket == self.load_generation
    }

    /// Publish the rows read for `ticket`. Returns true when the summary was
    /// replaced. Stale tickets and read errors leave the summary untouched.
    pub fn finish_summary_load(&mut self, ticket: u64, rows: Result<Vec<Row>>) -> bool {
        if ticket != self.load_generation {
            debug!(
                "Discarding table load {} (current is {})",
                ticket, self.load_generation
            );
            return false;
        }
        match rows {
            Ok(rows) => {
                self.apply_summary(&rows);
                self.status = Some(format!("Parsing complete. Total rows: {}", rows.len()));
                true
            }
            Err(e) => {
                warn!("Table load failed: {:#}", e);
                self.status = Some(format!("Error reading CSV: {:#}", e));
                false
            }
        }
    }

    /// Replace the summary with the aggregate of `rows`.
    pub fn apply_summary(&mut self, rows: &[Row]) {
        let (counts, layout) = interpret_with_layout(rows);
        info!("Summary updated: {:?}", counts);
        self.summary = counts;
        self.layout = Some(layout);
    }

    /// Read and apply a table file synchronously.
    pub fn load_summary(&mut self, path: &Utf8Path, reader: &TableReader) -> bool {
        let ticket = self.begin_summary_load();
        let rows = reader.load(path, &mut |_| {});
        self.finish_summary_load(ticket, rows)
    }

    pub fn summary_view(&self) -> SummaryView {
        SummaryView::from_counts(&self.summary)
    }

    // ── Cluster images ────────────────────────────────────────────────────

    /// Start a cluster batch load. Only the most recently started batch may
    /// replace the registry; pass the ticket to [`Self::finish_cluster_load`].
    pub fn begin_cluster_load(&mut self) -> u64 {
        self.cluster_generation += 1;
        self.status = Some("Loading cluster images".to_string());
        self.cluster_generation
    }

    /// True if `ticket` belongs to the most recently started batch load.
    pub fn is_current_cluster_load(&self, ticket: u64) -> bool {
        ticket == self.cluster_generation
    }

    /// Show per-file progress of the current batch as the status message.
    pub fn report_cluster_progress(&mut self, ticket: u64, progress: BatchProgress) {
        if self.is_current_cluster_load(ticket) {
            self.status = Some(progress.message());
        }
    }

    /// Swap in the registry built for `ticket`. The previous registry's
    /// images are released on replacement. On failure, or for a stale ticket,
    /// the current registry is kept; a failure becomes the status message.
    pub fn finish_cluster_load(&mut self, ticket: u64, registry: Result<ImageRegistry<H>>) -> bool {
        if !self.is_current_cluster_load(ticket) {
            debug!(
                "Discarding cluster load {} (current is {})",
                ticket, self.cluster_generation
            );
            return false;
        }
        match registry {
            Ok(registry) => {
                self.registry = registry;
                self.revalidate();
                self.status = Some(format!(
                    "Loaded cluster images for {} markers",
                    self.registry.len()
                ));
                true
            }
            Err(e) => {
                self.status = Some(format!("{:#}", e));
                false
            }
        }
    }

    /// Build a new registry from `source` synchronously and swap it in once
    /// complete.
    pub fn load_clusters<L: ImageLoader<Image = H>>(
        &mut self,
        source: &mut dyn BatchSource,
        loader: &mut L,
        on_progress: &mut dyn FnMut(BatchProgress),
    ) -> bool {
        let ticket = self.begin_cluster_load();
        let registry = build_registry(source, loader, on_progress);
        self.finish_cluster_load(ticket, registry)
    }

    /// Release all cluster images.
    pub fn clear_clusters(&mut self) {
        self.registry.clear();
        self.revalidate();
    }

    // ── Navigation and selection ──────────────────────────────────────────

    pub fn switch_view(&mut self, view: View) {
        self.view = view;
        self.revalidate();
    }

    /// Select `marker` if it is offered for the active view.
    pub fn select_marker(&mut self, marker: &str) -> bool {
        if self.marker_list().iter().any(|m| m == marker) {
            self.selected = Some(marker.to_string());
            true
        } else {
            false
        }
    }

    /// Markers offered by the selector for the active view.
    pub fn marker_list(&self) -> Vec<String> {
        match self.view {
            View::Cluster(k) => self.registry.list_markers(k),
            _ => Vec::new(),
        }
    }

    pub fn selector_visible(&self) -> bool {
        matches!(self.view, View::Cluster(_))
    }

    pub fn cluster_panel(&self, k: ClusterK) -> PanelImage<'_, H> {
        resolve_selection(&self.registry, self.selected.as_deref(), k)
    }

    pub fn panel_caption(&self, k: ClusterK) -> String {
        caption(&self.cluster_panel(k), self.selected.as_deref(), k)
    }

    fn revalidate(&mut self) {
        let list = self.marker_list();
        self.selected = revalidate_selection(&list, self.selected.as_deref());
    }
}
