//! medicover-core: shared library for the Medicover coverage dashboard.
//!
//! Provides:
//! - `catalog`: profession list loaded from `professions.txt`
//! - `selection`: multi-select filter state over the catalog
//! - `slider`: non-linear slider to cluster radius mapping
//! - `viewport`: pan/zoom model for the generated map image
//! - `sidebar`: sidebar UI state and the confirm/complete flow
//! - `stats`: coverage area summary (biggest, median, mean)
//! - `render`: map requests, image cache, external script renderer
//! - `fmt`: shared formatting helpers (distances, areas)
//!
//! With `api` feature:
//! - `api`: JSON-serializable API types with OpenAPI schemas
//!
//! `selection` and `sidebar` model the front-end flow for library users;
//! `medicover-web` does not hold them and its page keeps that state itself.

pub mod catalog;
pub mod fmt;
pub mod render;
pub mod selection;
pub mod sidebar;
pub mod slider;
pub mod stats;
pub mod viewport;

#[cfg(feature = "api")]
pub mod api;

/// Crate version, reported by the web server.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
