use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Json, State},
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::frequency::{FrequencyTable, Histogram};
use crate::report::{ChartData, Curve, TestReport};
use crate::stat_tests::{TestDetails, TestResult, UniformityTest};
use crate::test_definitions::{get_all_tests, SkippedTest};
use crate::{evaluate_request, UniformityRequest, UniformityResponse};

#[derive(Debug, Clone)]
pub struct AppState {
    /// Significance level applied when a request omits `alpha`
    pub default_alpha: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestInfo {
    pub id: String,
    pub name: String,
    pub min_samples: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub git_date: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(validate_handler, list_tests_handler, version_handler),
    components(schemas(
        UniformityRequest,
        UniformityResponse,
        UniformityTest,
        TestReport,
        TestResult,
        TestDetails,
        ChartData,
        Curve,
        Histogram,
        FrequencyTable,
        SkippedTest,
        TestInfo,
        VersionInfo
    )),
    tags((name = "uniformity", description = "Uniformity tests for pseudorandom sequences"))
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/validate", post(validate_handler))
        .route("/api/tests", get(list_tests_handler))
        .route("/api/version", get(version_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run one uniformity test, or all of them, on `#`-separated numbers
#[utoipa::path(
    post,
    path = "/api/validate",
    tag = "uniformity",
    request_body = UniformityRequest,
    responses(
        (status = 200, description = "Test reports, or valid = false with the input error", body = UniformityResponse)
    )
)]
async fn validate_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(payload): Json<UniformityRequest>,
) -> Json<UniformityResponse> {
    let start_time = Instant::now();
    let query_id = uuid::Uuid::new_v4();
    let client_ip = extract_client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let alpha = payload.alpha.unwrap_or(state.default_alpha);

    info!(
        "Validation request received: query_id={}, ip={}, test={:?}, alpha={}, {} bytes",
        query_id,
        client_ip,
        payload.test,
        alpha,
        payload.numbers.len()
    );

    let response = evaluate_request(&payload, state.default_alpha);
    let processing_time_ms = start_time.elapsed().as_millis();

    if response.valid {
        info!(
            "Validation passed: query_id={}, n={}, time={}ms",
            query_id, response.sample_size, processing_time_ms
        );
    } else {
        warn!(
            "Validation failed: query_id={}, reason={}, time={}ms",
            query_id, response.message, processing_time_ms
        );
    }

    Json(response)
}

/// List the available tests
#[utoipa::path(
    get,
    path = "/api/tests",
    tag = "uniformity",
    responses((status = 200, description = "Available tests", body = [TestInfo]))
)]
async fn list_tests_handler() -> Json<Vec<TestInfo>> {
    Json(
        get_all_tests()
            .into_iter()
            .map(|definition| TestInfo {
                id: definition.kind.id().to_string(),
                name: definition.name.to_string(),
                min_samples: definition.min_samples,
            })
            .collect(),
    )
}

/// Build version
#[utoipa::path(
    get,
    path = "/api/version",
    tag = "uniformity",
    responses((status = 200, description = "Build information", body = VersionInfo))
)]
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        git_date: env!("GIT_DATE").to_string(),
    })
}

/// Extract real client IP from headers (considering proxies) or fallback to socket address
fn extract_client_ip(headers: &HeaderMap, addr: Option<SocketAddr>) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded_for.to_str() {
            // X-Forwarded-For can contain multiple IPs, take the first one
            if let Some(ip) = value.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            return value.to_string();
        }
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
