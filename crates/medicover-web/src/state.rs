//! Shared application state and global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use axum::extract::State;
use tokio::sync::Mutex;

use medicover_core::catalog::ProfessionCatalog;
use medicover_core::render::{ImageCache, MapRenderer};

pub(crate) struct WebAppInner {
    pub(crate) catalog: ProfessionCatalog,
    pub(crate) cache: ImageCache,
    pub(crate) renderer: Arc<dyn MapRenderer>,
    /// Held across cache re-check and render. The renderer writes through
    /// fixed output paths, so renders never overlap.
    pub(crate) render_lock: Mutex<()>,
}

impl WebAppInner {
    pub(crate) fn new(
        catalog: ProfessionCatalog,
        cache: ImageCache,
        renderer: Arc<dyn MapRenderer>,
    ) -> Self {
        WebAppInner {
            catalog,
            cache,
            renderer,
            render_lock: Mutex::new(()),
        }
    }
}

pub(crate) type SharedState = Arc<WebAppInner>;

pub(crate) type AppState = State<SharedState>;
