use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use pharma9_core::{apply_rating, PharmacyId, RatedPharmacy, Stars};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::pharmacies::parse_id;
use super::{not_found, validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RatingRequest {
    pub stars: i64,
}

fn parse_stars(req_id: &str, stars: i64) -> Result<Stars, ApiError> {
    u8::try_from(stars)
        .ok()
        .and_then(|v| Stars::new(v).ok())
        .ok_or_else(|| {
            validation_error(
                req_id.to_string(),
                format!("stars must be between 1 and 5, got {stars}"),
            )
        })
}

/// Record one star submission and return the post-update aggregate.
///
/// The book stays locked from read to save, so concurrent submissions for the
/// same pharmacy are all counted. The save itself runs on the blocking pool.
pub(super) async fn submit_rating(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    id: Result<Path<PharmacyId>, PathRejection>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RatedPharmacy>>), ApiError> {
    let id = parse_id(&req_id.0, id)?;
    let Json(body) = payload.map_err(|e| validation_error(req_id.0.clone(), e.body_text()))?;
    let record = state
        .catalog
        .get(id)
        .ok_or_else(|| not_found(req_id.0.clone(), id))?;
    let stars = parse_stars(&req_id.0, body.stars)?;

    let data = {
        let mut book = state.ratings.lock().await;
        let next = apply_rating(&book, id, stars);
        let store = Arc::clone(&state.store);
        let snapshot = next.clone();
        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(pharmacy_id = id, error = %e, "failed to persist rating book");
            }
            Err(e) => {
                tracing::warn!(pharmacy_id = id, error = %e, "rating save task failed");
            }
        }
        *book = next;
        RatedPharmacy::new(record.clone(), &book)
    };

    tracing::info!(
        request_id = %req_id.0,
        pharmacy_id = id,
        stars = stars.get(),
        count = data.rating_count.unwrap_or(0),
        "rating recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
