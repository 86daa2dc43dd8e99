use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use catalog::{build_catalog, dirs_without_coords, Catalog, TourConfig};
use formats::{list_asset_dirs, load_coordinate_table};
use parking_lot::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    // Swapped wholesale on reload; readers clone the inner Arc and never
    // observe a partially built catalog.
    catalog: Arc<RwLock<Arc<Catalog>>>,
    sources: Arc<TourSources>,
}

#[derive(Clone, Debug)]
struct TourSources {
    coords_path: PathBuf,
    assets_root: PathBuf,
    web_root: PathBuf,
    config: TourConfig,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("PANO_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
        .parse()
        .expect("invalid PANO_ADDR");

    let coords_path = env::var("PANO_COORDS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data_base_filtered.csv"));
    let assets_root = env::var("PANO_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("assets"));
    let web_root = env::var("PANO_WEB_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    let config = TourConfig {
        link_radius_m: env_var_f64("PANO_LINK_RADIUS_M", 30.0),
        yaw_offset_rad: env_var_f64("PANO_YAW_OFFSET_RAD", -std::f64::consts::PI),
        hotspot_pitch_rad: env_var_f64("PANO_HOTSPOT_PITCH_RAD", 0.0),
        asset_url_prefix: env::var("PANO_ASSET_URL_PREFIX")
            .unwrap_or_else(|_| "./assets".to_string()),
    };

    let sources = Arc::new(TourSources {
        coords_path,
        assets_root,
        web_root,
        config,
    });

    // One-shot build before binding. A missing coordinate table or asset
    // root is fatal: no partial catalog is served.
    let catalog = match load_catalog(&sources) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("catalog build failed: {err}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        catalog: Arc::new(RwLock::new(Arc::new(catalog))),
        sources,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/panoramas", get(get_panoramas))
        .route("/api/panoramas/reload", post(reload_panoramas))
        .route("/360/web", get(get_viewer_page))
        .route("/360/assets/:pano/:z/:face/:tile", get(get_asset_tile))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("panorama server listening on http://{addr}/360/web");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

/// Builds the catalog from the configured sources, logging dropped inputs.
fn load_catalog(sources: &TourSources) -> Result<Catalog, String> {
    let table = load_coordinate_table(&sources.coords_path).map_err(|e| e.to_string())?;
    if table.dropped_rows > 0 {
        warn!(
            "dropped {} malformed row(s) from {}",
            table.dropped_rows,
            sources.coords_path.display()
        );
    }

    let assets = list_asset_dirs(&sources.assets_root).map_err(|e| e.to_string())?;

    let catalog = build_catalog(&table.points, &assets, &sources.config);
    let skipped = dirs_without_coords(&catalog, &assets);
    if !skipped.is_empty() {
        warn!(
            "{} asset director(ies) have no coordinates and were skipped: {}",
            skipped.len(),
            skipped.join(", ")
        );
    }

    info!(
        "catalog built: {} panorama(s) from {} coordinate record(s), {} asset dir(s)",
        catalog.len(),
        table.points.len(),
        assets.len()
    );
    Ok(catalog)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_panoramas(State(state): State<AppState>) -> Response {
    let catalog = state.catalog.read().clone();

    let body = match serde_json::to_string(&*catalog) {
        Ok(v) => v,
        Err(err) => {
            error!("catalog serialization failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "catalog error").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (StatusCode::OK, headers, Body::from(body)).into_response()
}

async fn reload_panoramas(State(state): State<AppState>) -> Response {
    let sources = state.sources.clone();
    let rebuilt = tokio::task::spawn_blocking(move || load_catalog(&sources)).await;

    match rebuilt {
        Ok(Ok(catalog)) => {
            let count = catalog.len();
            *state.catalog.write() = Arc::new(catalog);
            info!("catalog reloaded: {count} panorama(s)");
            (StatusCode::OK, format!("reloaded {count} panoramas")).into_response()
        }
        Ok(Err(err)) => {
            // Keep serving the previous catalog.
            warn!("catalog reload failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "reload failed").into_response()
        }
        Err(err) => {
            error!("catalog reload task panicked: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "reload failed").into_response()
        }
    }
}

async fn get_viewer_page(State(state): State<AppState>) -> Response {
    serve_file(&state.sources.web_root.join("index.html"), "text/html").await
}

async fn get_asset_tile(
    State(state): State<AppState>,
    AxumPath((pano, z, face, tile)): AxumPath<(String, String, String, String)>,
) -> Response {
    for segment in [&pano, &z, &face, &tile] {
        if !is_safe_component(segment) {
            return (StatusCode::BAD_REQUEST, "invalid tile path").into_response();
        }
    }

    let path = state
        .sources
        .assets_root
        .join(&pano)
        .join(&z)
        .join(&face)
        .join(&tile);
    serve_file(&path, "image/jpeg").await
}

fn is_safe_component(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

async fn serve_file(path: &Path, content_type: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
            );
            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(err) => {
            warn!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use catalog::TourConfig;

    use super::{is_safe_component, load_catalog, TourSources};

    fn sources_in(dir: &std::path::Path) -> TourSources {
        TourSources {
            coords_path: dir.join("data_base_filtered.csv"),
            assets_root: dir.join("assets"),
            web_root: dir.to_path_buf(),
            config: TourConfig::default(),
        }
    }

    #[test]
    fn load_catalog_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("data_base_filtered.csv"),
            "name image,coordinates Lat,coordinates Long\n\
             V2001528,-12.04550,-77.03110\n\
             V2001533,-12.04572,-77.03110\n\
             broken,,\n",
        )
        .unwrap();
        let assets = dir.path().join("assets");
        fs::create_dir_all(assets.join("V2001528")).unwrap();
        fs::create_dir_all(assets.join("V2001533")).unwrap();
        fs::create_dir_all(assets.join("V_NO_COORDS")).unwrap();

        let catalog = load_catalog(&sources_in(dir.path())).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.contains("V_NO_COORDS"));
        // ~24 m apart, inside the default 30 m link radius.
        assert_eq!(catalog.get("V2001528").unwrap().hotspots.len(), 1);
    }

    #[test]
    fn load_catalog_missing_csv_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        assert!(load_catalog(&sources_in(dir.path())).is_err());
    }

    #[test]
    fn load_catalog_missing_assets_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("data_base_filtered.csv"),
            "name image,coordinates Lat,coordinates Long\n",
        )
        .unwrap();
        let mut sources = sources_in(dir.path());
        sources.assets_root = PathBuf::from("/nonexistent/assets");
        assert!(load_catalog(&sources).is_err());
    }

    #[test]
    fn rejects_traversal_components() {
        assert!(is_safe_component("V2001528"));
        assert!(is_safe_component("0_1.jpg"));
        assert!(!is_safe_component(".."));
        assert!(!is_safe_component("."));
        assert!(!is_safe_component(""));
        assert!(!is_safe_component("a/b"));
        assert!(!is_safe_component("a\\b"));
    }
}
