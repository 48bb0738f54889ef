// 🌐 HTTP API - Axum router for the demo server
//
// Routes mirror the card-network API the demo stands in for:
//   GET  /         demo page
//   POST /lookup   { "bin_number": "545454" }
//   GET  /ranges   ?page&size&sort
//   GET  /search   ?issuer_name&country_code&product_type&page
//   GET  /health

use crate::catalog::{AccountRange, BinCatalog, BinRecord};
use crate::config::{DemoConfig, LatencyRange};
use crate::error::LookupError;
use crate::render::Alert;
use crate::resolver::{RecordSource, Resolver};
use crate::search::{clamp_paging, list_ranges, search_ranges_page, Page, RangeSort, SearchCriteria};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const DEMO_MESSAGE: &str = "This is demo data for demonstration purposes";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<BinCatalog>,
    config: Arc<DemoConfig>,
}

impl AppState {
    pub fn new(catalog: BinCatalog, config: DemoConfig) -> Self {
        AppState {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.catalog, self.config.unknown_bins)
    }

    /// Sleep for a random slice of `window` unless latency is switched off
    async fn simulate_latency(&self, window: LatencyRange) {
        // ThreadRng is !Send, so it must be gone before the await
        let delay = {
            let mut rng = rand::thread_rng();
            self.config.latency.delay_for(window, &mut rng)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Error body: `{ "error": "..." }`
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        let status = match &err {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            LookupError::BinNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

// Malformed or non-JSON bodies get the same `{ error }` shape as everything else
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "request rejected");
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub bin_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    success: bool,
    data: BinRecord,
    bin_number: String,
    demo_mode: bool,
    source: RecordSource,
    message: &'static str,
    alert: Alert,
}

#[derive(Debug, Serialize)]
pub struct PageData {
    #[serde(flatten)]
    page: Page<AccountRange>,
    demo_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    success: bool,
    data: PageData,
    alert: Alert,
}

impl PageResponse {
    fn new(page: Page<AccountRange>, alert: Alert) -> Self {
        PageResponse {
            success: true,
            data: PageData { page, demo_mode: true },
            alert,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    message: &'static str,
    demo_mode: bool,
    available_sample_bins: Vec<String>,
}

// Paging values arrive as free text; junk falls back to defaults instead of a 400
#[derive(Debug, Default, Deserialize)]
pub struct RangesQuery {
    page: Option<String>,
    size: Option<String>,
    sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    issuer_name: Option<String>,
    country_code: Option<String>,
    product_type: Option<String>,
    /// 1-based; the page size is fixed
    page: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Serve the demo page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

/// GET /health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        message: "Demo API is ready",
        demo_mode: true,
        available_sample_bins: state.catalog.sample_bins().to_vec(),
    })
}

/// POST /lookup - Resolve one BIN
async fn lookup_bin(
    State(state): State<AppState>,
    payload: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<LookupResponse>, ApiError> {
    let Json(request) = payload?;
    state.simulate_latency(state.config.latency.lookup).await;

    let input = request.bin_number.unwrap_or_default();
    if input.trim().is_empty() {
        return Err(ApiError::bad_request("BIN number is required"));
    }

    let resolution = state.resolver().lookup(&input)?;
    tracing::info!(bin = %resolution.bin, source = ?resolution.source, "BIN lookup");

    Ok(Json(LookupResponse {
        success: true,
        data: resolution.record,
        bin_number: resolution.bin,
        demo_mode: true,
        source: resolution.source,
        message: DEMO_MESSAGE,
        alert: Alert::lookup_completed(),
    }))
}

/// GET /ranges - Paginated account range listing
async fn get_ranges(
    State(state): State<AppState>,
    Query(query): Query<RangesQuery>,
) -> Json<PageResponse> {
    state.simulate_latency(state.config.latency.ranges).await;

    let (page, size) = clamp_paging(parse_number(&query.page), parse_number(&query.size));
    let sort = RangeSort::from_param(query.sort.as_deref());
    let result = list_ranges(&state.catalog, page, size, sort);

    tracing::info!(page, size, total = result.total_elements, "account ranges listed");
    Json(PageResponse::new(result, Alert::ranges_loaded()))
}

/// GET /search - Filter account ranges
async fn search_bins(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PageResponse>, ApiError> {
    state.simulate_latency(state.config.latency.search).await;

    let criteria = SearchCriteria::new(
        query.issuer_name.as_deref(),
        query.country_code.as_deref(),
        query.product_type.as_deref(),
    );
    let (page, _) = clamp_paging(parse_number(&query.page), None);
    let result = search_ranges_page(&state.catalog, &criteria, page)?;

    tracing::info!(?criteria, page, total = result.total_elements, "BIN search");
    let alert = Alert::search_finished(result.total_elements);
    Ok(Json(PageResponse::new(result, alert)))
}

fn parse_number(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health_check))
        .route("/lookup", post(lookup_bin))
        .route("/ranges", get(get_ranges))
        .route("/search", get(search_bins))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::catalog_with_ranges;
    use crate::config::SimulatedLatency;
    use crate::resolver::UnknownBinPolicy;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app(policy: UnknownBinPolicy) -> Router {
        app_with_catalog(BinCatalog::new(), policy)
    }

    fn app_with_catalog(catalog: BinCatalog, policy: UnknownBinPolicy) -> Router {
        let config = DemoConfig {
            latency: SimulatedLatency::disabled(),
            unknown_bins: policy,
            ..DemoConfig::default()
        };
        router(AppState::new(catalog, config))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn lookup_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/lookup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(test_app(UnknownBinPolicy::Synthesize), get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["demo_mode"], true);
        assert_eq!(body["available_sample_bins"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_lookup_known_bin() {
        let app = test_app(UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, lookup_request(r#"{"bin_number": "5454541234"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["bin_number"], "545454");
        assert_eq!(body["source"], "catalog");
        assert_eq!(body["data"]["issuerName"], "Chase Bank");
        assert_eq!(body["data"]["highAccountRange"], "5454549999999999");
        assert_eq!(body["alert"]["level"], "success");
    }

    #[tokio::test]
    async fn test_lookup_unknown_bin_synthesized() {
        let app = test_app(UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, lookup_request(r#"{"bin_number": "123456"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "synthesized");
        assert_eq!(body["data"]["issuerName"], "Demo Bank 123");
        assert_eq!(body["data"]["lowAccountRange"], "1234560000000000");
    }

    #[tokio::test]
    async fn test_lookup_unknown_bin_not_found() {
        let app = test_app(UnknownBinPolicy::NotFound);
        let (status, body) = send(app, lookup_request(r#"{"bin_number": "123456"}"#)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("123456"));
    }

    #[tokio::test]
    async fn test_lookup_validation() {
        let (status, body) =
            send(test_app(UnknownBinPolicy::Synthesize), lookup_request(r#"{"bin_number": "1234"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please enter a valid BIN number (6-8 digits)");

        let (status, body) = send(test_app(UnknownBinPolicy::Synthesize), lookup_request("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BIN number is required");
    }

    #[tokio::test]
    async fn test_lookup_malformed_body() {
        let (status, body) =
            send(test_app(UnknownBinPolicy::Synthesize), lookup_request(r#"{"bin_number": "#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["error"].as_str().unwrap().is_empty());

        let request = Request::builder()
            .method("POST")
            .uri("/lookup")
            .body(Body::from(r#"{"bin_number": "545454"}"#))
            .unwrap();
        let (status, body) = send(test_app(UnknownBinPolicy::Synthesize), request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_ranges_pagination() {
        let app = test_app(UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, get_request("/ranges?page=2&size=3")).await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["totalElements"], 8);
        assert_eq!(data["totalPages"], 3);
        assert_eq!(data["number"], 1);
        assert_eq!(data["numberOfElements"], 3);
        assert_eq!(data["first"], false);
        assert_eq!(data["demo_mode"], true);
        assert_eq!(data["content"][0]["issuerName"], "HSBC Bank");
    }

    #[tokio::test]
    async fn test_ranges_bad_params_fall_back() {
        let app = test_app(UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, get_request("/ranges?page=zero&size=500")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["number"], 0);
        assert_eq!(body["data"]["numberOfElements"], 8);
        assert_eq!(body["data"]["last"], true);
    }

    #[tokio::test]
    async fn test_search() {
        let app = test_app(UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, get_request("/search?country_code=us&product_type=credit")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalElements"], 7);
        let issuers: Vec<&str> = body["data"]["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["issuerName"].as_str().unwrap())
            .collect();
        assert!(issuers.contains(&"Discover Bank"));
        assert!(!issuers.contains(&"HSBC Bank"));
        assert_eq!(body["alert"]["message"], "Found 7 matching results!");
    }

    #[tokio::test]
    async fn test_search_truncates_and_pages() {
        let app = app_with_catalog(catalog_with_ranges(14), UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, get_request("/search?country_code=US")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalElements"], 14);
        assert_eq!(body["data"]["numberOfElements"], 10);
        assert_eq!(body["data"]["content"].as_array().unwrap().len(), 10);
        assert_eq!(body["data"]["last"], false);

        // size is not adjustable on search
        let app = app_with_catalog(catalog_with_ranges(14), UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, get_request("/search?country_code=US&page=2&size=50")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["number"], 1);
        assert_eq!(body["data"]["numberOfElements"], 4);
        assert_eq!(body["data"]["content"][0]["issuerName"], "Demo Issuer 11");
    }

    #[tokio::test]
    async fn test_search_without_criteria() {
        let app = test_app(UnknownBinPolicy::Synthesize);
        let (status, body) = send(app, get_request("/search?issuer_name=")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please enter at least one search criteria");
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = test_app(UnknownBinPolicy::Synthesize);
        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
