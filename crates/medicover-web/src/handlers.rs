//! HTTP request handlers: API endpoints, map generation, and frontend serving.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use rust_embed::Embed;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use medicover_core::api::{ClusterRange, GenerateMapResponse, MapInfo, ProfessionList};
use medicover_core::render::{MapRequest, RenderOutput};
use medicover_core::slider::{ClusterSlider, MAX_POSITION, radius_to_position};
use medicover_core::viewport::{Contain, Viewport, ZoomLimits};

use crate::state::AppState;

// ============================================================
// Embedded frontend assets
// ============================================================

#[derive(Embed)]
#[folder = "frontend/dist"]
struct FrontendAssets;

// ============================================================
// Health
// ============================================================

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Professions
// ============================================================

#[derive(Deserialize, utoipa::IntoParams)]
pub(crate) struct ProfessionsQuery {
    /// Case-insensitive substring matched against label and code.
    filter: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/professions",
    params(ProfessionsQuery),
    responses(
        (status = 200, description = "Professions matching the filter, in catalog order", body = ProfessionList)
    )
)]
pub(crate) async fn handle_professions(
    State(state): AppState,
    Query(query): Query<ProfessionsQuery>,
) -> Json<ProfessionList> {
    let filter = query.filter.unwrap_or_default();
    let professions = state
        .catalog
        .filter(&filter)
        .into_iter()
        .cloned()
        .collect();
    Json(ProfessionList {
        total: state.catalog.len(),
        professions,
    })
}

/// Raw catalog, one `code|label` per line.
pub(crate) async fn handle_professions_txt(State(state): AppState) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.catalog.to_text(),
    )
        .into_response()
}

// ============================================================
// Cluster slider
// ============================================================

#[derive(Deserialize, utoipa::IntoParams)]
pub(crate) struct ClusterQuery {
    /// Slider position (0..=100). Out-of-range values are clamped.
    position: Option<i64>,
    /// Radius in meters; converted to the nearest slider position.
    radius: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/cluster",
    params(ClusterQuery),
    responses(
        (status = 200, description = "Cluster radius for a slider position", body = ClusterRange)
    )
)]
pub(crate) async fn handle_cluster(Query(query): Query<ClusterQuery>) -> Json<ClusterRange> {
    let position = match (query.position, query.radius) {
        (Some(p), _) => p.clamp(0, i64::from(MAX_POSITION)) as u8,
        (None, Some(r)) => radius_to_position(r),
        (None, None) => 0,
    };
    Json(ClusterRange::from(ClusterSlider::new(position)))
}

// ============================================================
// Map generation
// ============================================================

#[derive(Deserialize, utoipa::IntoParams)]
pub(crate) struct MapQuery {
    /// Comma-separated profession codes.
    professions: Option<String>,
    /// Cluster radius in meters (0..=10000).
    radius: Option<f64>,
}

type Failure = (StatusCode, Json<GenerateMapResponse>);

fn bad_request(msg: String) -> Failure {
    (
        StatusCode::BAD_REQUEST,
        Json(GenerateMapResponse::failure(msg)),
    )
}

/// Parses and validates the query against the catalog.
fn parse_request(state: &AppState, query: &MapQuery) -> Result<MapRequest, Failure> {
    let request = MapRequest::parse(query.professions.as_deref().unwrap_or(""), query.radius)
        .map_err(|e| {
            warn!(error = %e, "rejected map request");
            bad_request(e.to_string())
        })?;
    if let Some(unknown) = request
        .professions()
        .iter()
        .find(|c| !state.0.catalog.contains(c))
    {
        warn!(code = %unknown, "unknown profession code");
        return Err(bad_request(format!("unknown profession code: {}", unknown)));
    }
    Ok(request)
}

#[utoipa::path(
    post,
    path = "/api/generateMap",
    params(MapQuery),
    responses(
        (status = 200, description = "Image generated or already cached", body = GenerateMapResponse),
        (status = 400, description = "Invalid or unknown profession codes, or invalid radius", body = GenerateMapResponse),
        (status = 500, description = "Region script failed; error is passed through verbatim", body = GenerateMapResponse)
    )
)]
pub(crate) async fn handle_generate_map(
    state: AppState,
    Query(query): Query<MapQuery>,
) -> Result<Json<GenerateMapResponse>, Failure> {
    let request = parse_request(&state, &query)?;
    let State(state) = state;
    let image = state.cache.url_for(&request);

    if state.cache.lookup(&request).is_some() {
        return Ok(Json(GenerateMapResponse {
            success: true,
            cached: Some(true),
            stats: state.cache.stats_for(&request),
            image: Some(image),
            ..Default::default()
        }));
    }

    // Waiters queue here on the async side; only the running render holds a
    // blocking-pool thread.
    let _render = state.render_lock.lock().await;
    let rendered = if state.cache.lookup(&request).is_some() {
        debug!(image = %image, "rendered by concurrent request");
        Ok(None)
    } else {
        // The script blocks for a long time; keep it off the async workers.
        let worker_state = state.clone();
        let worker_request = request.clone();
        tokio::task::spawn_blocking(move || {
            let dest = worker_state.cache.path_for(&worker_request);
            worker_state
                .renderer
                .render(&worker_request, &dest)
                .map(Some)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "render task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateMapResponse::failure(e.to_string())),
            )
        })?
    };

    match rendered {
        Ok(output) => {
            let cached = output.is_none();
            info!(image = %image, cached, "map ready");
            let (stdout, stderr) = match output {
                Some(RenderOutput { stdout, stderr }) => (Some(stdout), Some(stderr)),
                None => (None, None),
            };
            Ok(Json(GenerateMapResponse {
                success: true,
                cached: Some(cached),
                stats: state.cache.stats_for(&request),
                image: Some(image),
                stdout,
                stderr,
                error: None,
            }))
        }
        Err(e) => {
            error!(image = %image, error = %e, "map generation failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateMapResponse::failure(e.to_string())),
            ))
        }
    }
}

// ============================================================
// Map info (display parameters for a cached image)
// ============================================================

#[derive(Deserialize, utoipa::IntoParams)]
pub(crate) struct MapInfoQuery {
    /// Comma-separated profession codes.
    professions: Option<String>,
    /// Cluster radius in meters.
    radius: Option<f64>,
    /// Viewport width in CSS pixels.
    vw: Option<f64>,
    /// Viewport height in CSS pixels.
    vh: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/maps",
    params(MapInfoQuery),
    responses(
        (status = 200, description = "Cached image with pan/zoom parameters", body = MapInfo),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Image not generated yet")
    )
)]
pub(crate) async fn handle_map_info(
    State(state): AppState,
    Query(query): Query<MapInfoQuery>,
) -> Result<Json<MapInfo>, StatusCode> {
    let request = MapRequest::parse(query.professions.as_deref().unwrap_or(""), query.radius)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    if state.cache.lookup(&request).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }

    let size = state.cache.image_size(&request);
    let limits = ZoomLimits::default();
    let contain = Contain::Outside;
    let start = match (size, query.vw, query.vh) {
        (Some((w, h)), Some(vw), Some(vh)) => Some(
            Viewport::new(
                (f64::from(w), f64::from(h)),
                (vw, vh),
                limits,
                contain,
            )
            .start_transform(),
        ),
        _ => None,
    };

    Ok(Json(MapInfo {
        image: state.cache.url_for(&request),
        width: size.map(|s| s.0),
        height: size.map(|s| s.1),
        stats: state.cache.stats_for(&request),
        limits,
        contain,
        start,
    }))
}

// ============================================================
// Frontend static files
// ============================================================

pub(crate) async fn serve_frontend(uri: Uri) -> Response<Body> {
    let path = uri.path().trim_start_matches('/');

    // Try exact file match first
    if let Some(file) = FrontendAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return ([(header::CONTENT_TYPE, mime.to_string())], file.data.into_owned())
            .into_response();
    }

    // SPA fallback: serve index.html for non-file paths
    if let Some(index) = FrontendAssets::get("index.html") {
        return (
            [(header::CONTENT_TYPE, "text/html".to_string())],
            index.data.into_owned(),
        )
            .into_response();
    }

    (StatusCode::NOT_FOUND, "not found").into_response()
}
