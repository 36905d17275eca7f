mod map;
mod pharmacies;
mod ratings;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use pharma9_core::{AppConfig, Catalog, PharmacyId, RatingBook};
use pharma9_store::RatingPersistence;
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Shared handler state.
///
/// The rating book lives behind one async mutex so a read-modify-write plus
/// its save is atomic across concurrent submissions.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub ratings: Arc<Mutex<RatingBook>>,
    pub store: Arc<dyn RatingPersistence>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Load the persisted book once and wrap everything for sharing.
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<dyn RatingPersistence>,
        config: Arc<AppConfig>,
    ) -> Self {
        let book = store.load();
        tracing::info!(
            pharmacies = catalog.len(),
            rated = book.len(),
            "catalog and rating book ready"
        );
        Self {
            catalog,
            ratings: Arc::new(Mutex::new(book)),
            store,
            config,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    pharmacies: usize,
    rated: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn not_found(request_id: String, id: PharmacyId) -> ApiError {
    ApiError::new(request_id, "not_found", format!("pharmacy {id} not found"))
}

pub(super) fn validation_error(request_id: String, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn rating_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/pharmacies/{id}/ratings",
            post(ratings::submit_rating),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let read_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/pharmacies", get(pharmacies::list_pharmacies))
        .route("/api/v1/pharmacies/{id}", get(pharmacies::get_pharmacy))
        .route("/api/v1/neighborhoods", get(pharmacies::list_neighborhoods))
        .route("/api/v1/map/markers", get(map::list_markers));

    Router::new()
        .merge(read_routes)
        .merge(rating_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let rated = state.ratings.lock().await.len();
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            pharmacies: state.catalog.len(),
            rated,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
