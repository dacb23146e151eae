mod access_log;
mod handlers;
mod openapi;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

use medicover_core::catalog::ProfessionCatalog;
use medicover_core::render::{IMAGE_URL_PREFIX, ImageCache, ScriptConfig, ScriptRenderer};

use access_log::AccessLogLayer;
use openapi::ApiDoc;
use state::{SharedState, WebAppInner};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(name = "medicover-web", about = "Medicover coverage map server", version = medicover_core::VERSION)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080", env = "MEDICOVER_LISTEN")]
    listen: String,

    /// Profession catalog, one `code|label` per line.
    #[arg(long, default_value = "public/professions.txt", env = "MEDICOVER_PROFESSIONS")]
    professions: PathBuf,

    /// Directory holding generated map images (the cache).
    #[arg(long, default_value = "public/generatedImages", env = "MEDICOVER_IMAGE_DIR")]
    image_dir: PathBuf,

    /// Interpreter used to run the region script.
    #[arg(long, default_value = "python3", env = "MEDICOVER_PYTHON")]
    python: PathBuf,

    /// Region computation script.
    #[arg(long, default_value = "backend/compute_regions.py", env = "MEDICOVER_SCRIPT")]
    script: PathBuf,

    /// Practitioner database passed to the script.
    #[arg(long, default_value = "data_extraction/GrandEst.db", env = "MEDICOVER_DB")]
    db: PathBuf,

    /// Zipped regions shapefile passed to the script.
    #[arg(long, default_value = "data/regions.zip", env = "MEDICOVER_REGIONS")]
    regions: PathBuf,

    /// GeoPackage the script writes clipped polygons to.
    #[arg(long, default_value = "data/voronoi_clipped.gpkg", env = "MEDICOVER_GPKG_OUT")]
    gpkg_out: PathBuf,

    /// Plot image the script leaves behind.
    #[arg(long, default_value = "data/voronoi_plot.png", env = "MEDICOVER_PLOT_PATH")]
    plot_path: PathBuf,

    /// Region areas JSON the script leaves behind, if any.
    #[arg(long, env = "MEDICOVER_AREAS_PATH")]
    areas_path: Option<PathBuf>,

    /// Working directory for the script.
    #[arg(long, value_name = "PATH", env = "MEDICOVER_WORKDIR")]
    workdir: Option<PathBuf>,
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("medicover_web=info,medicover_core=info")
            }),
        )
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(async_main(args));
}

async fn async_main(args: Args) {
    info!(version = medicover_core::VERSION, "starting");

    let catalog = match ProfessionCatalog::load(&args.professions) {
        Ok(c) => c,
        Err(e) => {
            error!(path = %args.professions.display(), error = %e, "failed to load profession catalog");
            process::exit(1);
        }
    };
    info!(professions = catalog.len(), "profession catalog loaded");

    if let Err(e) = std::fs::create_dir_all(&args.image_dir) {
        error!(path = %args.image_dir.display(), error = %e, "failed to create image directory");
        process::exit(1);
    }

    let renderer = ScriptRenderer::new(ScriptConfig {
        python: args.python,
        script: args.script,
        db: args.db,
        regions: args.regions,
        gpkg_out: args.gpkg_out,
        plot_path: args.plot_path,
        areas_path: args.areas_path,
        workdir: args.workdir,
    });
    info!(
        script = %renderer.config().script.display(),
        image_dir = %args.image_dir.display(),
        "region script configured"
    );

    let state: SharedState = Arc::new(WebAppInner::new(
        catalog,
        ImageCache::new(&args.image_dir),
        Arc::new(renderer),
    ));

    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    let addr: SocketAddr = match args.listen.parse() {
        Ok(a) => a,
        Err(e) => {
            error!(listen = %args.listen, error = %e, "invalid listen address");
            process::exit(1);
        }
    };
    info!(%addr, "listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        process::exit(1);
    }
}

/// All routes plus access logging. Transport layers (CORS, compression)
/// are added by `async_main`.
pub(crate) fn build_router(state: SharedState) -> Router {
    let images = ServeDir::new(state.cache.dir());
    Router::new()
        .route("/api/v1/health", get(handlers::handle_health))
        .route("/api/v1/professions", get(handlers::handle_professions))
        .route("/professions.txt", get(handlers::handle_professions_txt))
        .route("/api/v1/cluster", get(handlers::handle_cluster))
        .route("/api/v1/maps", get(handlers::handle_map_info))
        .route("/api/generateMap", post(handlers::handle_generate_map))
        .nest_service(IMAGE_URL_PREFIX, images)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(get(handlers::serve_frontend))
        .with_state(state)
        .layer(AccessLogLayer)
}
