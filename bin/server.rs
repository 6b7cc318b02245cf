// Region Atlas - Web Server
// Read-only query API over the current snapshot

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use region_atlas::{AtlasConfig, AtlasError, AtlasStore, Order};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<AtlasStore>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

fn atlas_error(e: AtlasError) -> Response {
    let status = match &e {
        AtlasError::NotFound(_) => StatusCode::NOT_FOUND,
        AtlasError::InvalidQuery(_) | AtlasError::Config(_) => StatusCode::BAD_REQUEST,
        AtlasError::MandatorySourceMissing { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(status, e.to_string())
}

/// Region list entry with a link to its detail endpoint
#[derive(Serialize)]
struct RegionLink {
    name: String,
    href: String,
}

#[derive(Serialize)]
struct ReloadResponse {
    reloaded: bool,
    snapshot_id: String,
    regions: usize,
}

#[derive(Deserialize)]
struct TopParams {
    n: Option<usize>,
    order: Option<String>,
    /// Only rank regions that also have a value in this field
    require: Option<String>,
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/summary - Snapshot overview and load report
async fn get_summary(State(state): State<AppState>) -> Response {
    let snapshot = state.store.snapshot();
    ApiResponse::ok(snapshot.overview())
}

/// GET /api/regions - All region keys, sorted
async fn get_regions(State(state): State<AppState>) -> Response {
    let snapshot = state.store.snapshot();
    let regions: Vec<RegionLink> = snapshot
        .keys()
        .into_iter()
        .map(|name| RegionLink {
            href: format!("/api/regions/{}", urlencoding::encode(name)),
            name: name.to_string(),
        })
        .collect();
    ApiResponse::ok(regions)
}

/// GET /api/regions/:name - One region with classifications
async fn get_region(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let snapshot = state.store.snapshot();
    match snapshot.describe(&name) {
        Ok(view) => ApiResponse::ok(view),
        Err(e) => atlas_error(e),
    }
}

/// GET /api/regions/:name/growth - Growth summary (data is null when no series)
async fn get_region_growth(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let snapshot = state.store.snapshot();
    match snapshot.growth_summary(&name) {
        Ok(summary) => ApiResponse::ok(summary),
        Err(e) => atlas_error(e),
    }
}

/// GET /api/regions/:name/history - Quarterly price history
async fn get_region_history(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let snapshot = state.store.snapshot();
    match snapshot.quarterly_series(&name) {
        Ok(history) => ApiResponse::ok(history),
        Err(e) => atlas_error(e),
    }
}

/// GET /api/top/:field?n=&order=&require= - Leaderboard
async fn get_top(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Query(params): Query<TopParams>,
) -> Response {
    let snapshot = state.store.snapshot();
    if !snapshot.table().has_column(&field) {
        return error_response(StatusCode::NOT_FOUND, format!("unknown field: {}", field));
    }

    let order = match params.order.as_deref().map(str::parse::<Order>) {
        None => Order::Desc,
        Some(Ok(order)) => order,
        Some(Err(e)) => return atlas_error(e),
    };
    let n = params.n.unwrap_or(10);

    let ranked = match params.require.as_deref() {
        Some(required) => snapshot.top_n_requiring(&field, n, order, required),
        None => snapshot.top_n(&field, n, order),
    };
    ApiResponse::ok(ranked)
}

/// GET /api/search?q= - Case-insensitive name search
async fn search_regions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let snapshot = state.store.snapshot();
    let q = params.q.unwrap_or_default();
    ApiResponse::ok(snapshot.search(&q))
}

/// POST /api/reload - Rebuild from sources when they changed
async fn reload(State(state): State<AppState>) -> Response {
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || store.reload_if_changed()).await;

    match result {
        Ok(Ok(fresh)) => {
            let reloaded = fresh.is_some();
            let snapshot = fresh.unwrap_or_else(|| state.store.snapshot());
            ApiResponse::ok(ReloadResponse {
                reloaded,
                snapshot_id: snapshot.id().to_string(),
                regions: snapshot.len(),
            })
        }
        Ok(Err(e)) => {
            error!("Reload failed: {}", e);
            atlas_error(e)
        }
        Err(e) => {
            error!("Reload task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", get(get_summary))
        .route("/regions", get(get_regions))
        .route("/regions/:name", get(get_region))
        .route("/regions/:name/growth", get(get_region_growth))
        .route("/regions/:name/history", get(get_region_history))
        .route("/top/:field", get(get_top))
        .route("/search", get(search_regions))
        .route("/reload", post(reload))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🌐 Region Atlas - Web Server {}", region_atlas::VERSION);

    let config = match std::env::var("ATLAS_CONFIG") {
        Ok(path) => AtlasConfig::from_file(path)?,
        Err(_) => {
            let data_dir = std::env::var("ATLAS_DATA_DIR").unwrap_or_else(|_| ".".to_string());
            AtlasConfig::with_data_dir(data_dir)
        }
    };

    let store = AtlasStore::load(config)?;
    let snapshot = store.snapshot();
    info!("✓ Loaded {} regions (snapshot {})", snapshot.len(), snapshot.id());

    let state = AppState {
        store: Arc::new(store),
    };
    let app = router(state);

    let addr = std::env::var("ATLAS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server running on http://{}", addr);
    info!("   API: http://{}/api/regions", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use region_atlas::SourceSpec;
    use serde_json::Value as Json;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn app() -> (TempDir, Router) {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("master.csv"),
            "Suburb,Current_Price_2025,Total_Risk_Category\n\
             ADELAIDE,650000,Low\n\
             NORTH ADELAIDE,1100000,High\n\
             GLENELG,,\n\
             ZED%41,,\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ts.csv"),
            "Suburb,Period,Median_Price\n\
             ADELAIDE,2019 Q1,500000\n\
             ADELAIDE,2025 Q4,650000\n",
        )
        .unwrap();

        let mut config = AtlasConfig::with_data_dir(dir.path());
        config.master = SourceSpec::all_columns("master.csv");
        config.timeseries = Some(region_atlas::TimeseriesSpec {
            path: "ts.csv".into(),
            period_column: "Period".into(),
            value_column: "Median_Price".into(),
        });

        let store = AtlasStore::load(config).unwrap();
        let state = AppState {
            store: Arc::new(store),
        };
        (dir, router(state))
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Json) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = app();
        let (status, body) = call(app, "GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_regions_sorted_with_links() {
        let (_dir, app) = app();
        let (_, body) = call(app, "GET", "/api/regions").await;

        let regions = body["data"].as_array().unwrap();
        assert_eq!(regions[0]["name"], "ADELAIDE");
        assert_eq!(regions[2]["name"], "NORTH ADELAIDE");
        assert_eq!(regions[2]["href"], "/api/regions/NORTH%20ADELAIDE");
    }

    #[tokio::test]
    async fn test_region_detail_and_not_found() {
        let (_dir, app) = app();
        let (status, body) = call(app.clone(), "GET", "/api/regions/NORTH%20ADELAIDE").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["price_tier"], "Premium");
        assert_eq!(body["data"]["risk_level"], "High");

        let (status, body) = call(app, "GET", "/api/regions/NOWHERE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_region_name_with_percent_sequence() {
        let (_dir, app) = app();
        let (status, body) = call(app, "GET", "/api/regions/ZED%2541").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["record"]["name"], "ZED%41");
    }

    #[tokio::test]
    async fn test_growth() {
        let (_dir, app) = app();
        let (status, body) = call(app.clone(), "GET", "/api/regions/ADELAIDE/growth").await;
        assert_eq!(status, StatusCode::OK);
        let rate = body["data"]["cagr"]["rate_pct"].as_f64().unwrap();
        assert!((rate - 4.46).abs() < 0.01);

        // known region, no series
        let (status, body) = call(app, "GET", "/api/regions/GLENELG/growth").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_top() {
        let (_dir, app) = app();
        let (_, body) = call(app.clone(), "GET", "/api/top/Current_Price_2025?n=1").await;
        let top = body["data"].as_array().unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0]["region"], "NORTH ADELAIDE");

        let (_, body) = call(app.clone(), "GET", "/api/top/Current_Price_2025?order=asc").await;
        assert_eq!(body["data"][0]["region"], "ADELAIDE");

        let (status, _) = call(app.clone(), "GET", "/api/top/Nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(app, "GET", "/api/top/Current_Price_2025?order=sideways").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search() {
        let (_dir, app) = app();
        let (_, body) = call(app, "GET", "/api/search?q=adel").await;
        assert_eq!(body["data"], serde_json::json!(["ADELAIDE", "NORTH ADELAIDE"]));
    }

    #[tokio::test]
    async fn test_reload_unchanged() {
        let (_dir, app) = app();
        let (status, body) = call(app, "POST", "/api/reload").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reloaded"], false);
        assert_eq!(body["data"]["regions"], 4);
    }
}
