use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::aggregate::{build_view, DashboardView};
use crate::data::filter::{Dimension, FilterSelection};
use crate::data::loader::DatasetCache;
use crate::data::model::SalesDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The loaded table is immutable and shared behind `Arc`; every interaction
/// re-runs the pure filter → aggregate pipeline into a fresh [`DashboardView`].
#[derive(Default)]
pub struct AppState {
    /// Load cache, keyed by source path.
    pub cache: DatasetCache,

    /// Path of the currently shown source file.
    pub source: Option<PathBuf>,

    /// Loaded table (None until a file is opened).
    pub dataset: Option<Arc<SalesDataset>>,

    /// Per-dimension filter selections.
    pub selection: FilterSelection,

    /// Aggregates for the current selection.
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Open a source file through the cache and show it.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                log::info!(
                    "loaded {} transactions ({} columns) from {}",
                    dataset.len(),
                    dataset.column_count(),
                    path.display()
                );
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a loaded table: default every filter to "all values selected"
    /// and build the initial view.
    pub fn set_dataset(&mut self, dataset: Arc<SalesDataset>) {
        self.selection = FilterSelection::all(&dataset);
        self.view = Some(build_view(&dataset, &self.selection));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Re-run filter → aggregate after a selection change.
    pub fn refresh_view(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = Some(build_view(ds, &self.selection));
        }
    }

    /// Toggle a single value in one dimension's selection.
    pub fn toggle_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.selection.selected_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refresh_view();
    }

    /// Select all observed values in one dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            let all = dim.distinct(ds).clone();
            *self.selection.selected_mut(dim) = all;
            self.refresh_view();
        }
    }

    /// Deselect every value in one dimension (matches nothing).
    pub fn select_none(&mut self, dim: Dimension) {
        self.selection.selected_mut(dim).clear();
        self.refresh_view();
    }
}
