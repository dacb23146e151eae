//! Sidebar state and the confirm → generate → display flow.

use crate::catalog::ProfessionCatalog;
use crate::render::{MapRequest, RequestError};
use crate::selection::ProfessionSelection;
use crate::slider::ClusterSlider;
use crate::stats::CoverageStats;

/// Result of a generate call as seen by the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum MapOutcome {
    /// Image is available at `image` (a URL path).
    Ready {
        image: String,
        stats: Option<CoverageStats>,
    },
    /// Generation failed; `error` is the server's message.
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct SidebarState {
    pub selection: ProfessionSelection,
    pub slider: ClusterSlider,
    visible: bool,
    loading: bool,
    current_image: Option<String>,
    stats: Option<CoverageStats>,
    last_error: Option<String>,
}

impl SidebarState {
    pub fn new(catalog: &ProfessionCatalog) -> Self {
        SidebarState {
            selection: ProfessionSelection::from_catalog(catalog),
            slider: ClusterSlider::default(),
            visible: true,
            loading: false,
            current_image: None,
            stats: None,
            last_error: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_image(&self) -> Option<&str> {
        self.current_image.as_deref()
    }

    pub fn stats(&self) -> Option<&CoverageStats> {
        self.stats.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts a request for the current selection and radius.
    ///
    /// Returns `Ok(None)` while a request is already in flight or when nothing
    /// is selected; the state is left untouched in both cases. Catalog codes
    /// that are not filename-safe are an error.
    pub fn confirm(&mut self) -> Result<Option<MapRequest>, RequestError> {
        if self.loading || self.selection.selected_count() == 0 {
            return Ok(None);
        }
        let request = MapRequest::new(self.selection.selected_codes(), Some(self.slider.radius()))?;
        self.loading = true;
        self.last_error = None;
        Ok(Some(request))
    }

    /// Applies the outcome of the in-flight request.
    pub fn complete(&mut self, outcome: MapOutcome) {
        self.loading = false;
        match outcome {
            MapOutcome::Ready { image, stats } => {
                self.current_image = Some(image);
                self.stats = stats;
                self.last_error = None;
            }
            MapOutcome::Failed { error } => {
                self.last_error = Some(error);
            }
        }
    }
}
