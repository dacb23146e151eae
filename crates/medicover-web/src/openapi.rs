//! OpenAPI documentation definition.

use medicover_core::api::{ClusterRange, GenerateMapResponse, MapInfo, ProfessionList};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::handle_health,
        crate::handlers::handle_professions,
        crate::handlers::handle_cluster,
        crate::handlers::handle_generate_map,
        crate::handlers::handle_map_info,
    ),
    components(schemas(
        GenerateMapResponse,
        ProfessionList,
        ClusterRange,
        MapInfo,
        medicover_core::catalog::Profession,
        medicover_core::stats::CoverageStats,
        medicover_core::viewport::Contain,
        medicover_core::viewport::ZoomLimits,
        medicover_core::viewport::Transform,
    )),
    info(
        title = "Medicover API",
        version = "1.0",
        description = "Healthcare coverage maps: profession catalog, cluster radius and map generation"
    )
)]
pub(crate) struct ApiDoc;
