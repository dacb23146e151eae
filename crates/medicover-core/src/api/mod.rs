//! API types for medicover-web JSON serialization.
//!
//! Field names follow what the embedded front end reads; optional fields are
//! omitted rather than sent as `null`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::Profession;
use crate::slider::ClusterSlider;
use crate::stats::CoverageStats;
use crate::viewport::{Contain, Transform, ZoomLimits};

/// Body of `POST /api/generateMap`.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct GenerateMapResponse {
    pub success: bool,
    /// `true` when the image already existed and the script was not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    /// URL path of the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CoverageStats>,
    /// Script stdout (fresh renders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    /// Script stderr (fresh renders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateMapResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        GenerateMapResponse {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Body of `GET /api/v1/professions`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfessionList {
    /// Catalog size before filtering.
    pub total: usize,
    pub professions: Vec<Profession>,
}

/// Body of `GET /api/v1/cluster`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClusterRange {
    pub position: u8,
    pub radius_m: f64,
    /// e.g. `"Cluster range: 2.5 km"`.
    pub label: String,
}

impl From<ClusterSlider> for ClusterRange {
    fn from(slider: ClusterSlider) -> Self {
        ClusterRange {
            position: slider.position(),
            radius_m: slider.radius(),
            label: slider.label(),
        }
    }
}

/// Body of `GET /api/v1/maps`: a cached image and how to display it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapInfo {
    pub image: String,
    /// Natural image size, when the file is a PNG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CoverageStats>,
    pub limits: ZoomLimits,
    pub contain: Contain,
    /// Start transform for the requested viewport size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Transform>,
}
