use axum::{
    extract::{Query, State},
    Extension, Json,
};
use pharma9_core::{
    cluster_markers, BoundsProjection, FocusedIds, MapItem, PharmacyId, ProjectedPharmacy,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::pharmacies::{run_pipeline, ListQuery};
use super::{validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Map-only parameters, read alongside [`ListQuery`] from the same query string.
#[derive(Debug, Default, Deserialize)]
pub(super) struct FocusQuery {
    pub selected: Option<String>,
    pub highlighted: Option<String>,
    pub grid: Option<String>,
}

fn parse_optional_id(
    req_id: &str,
    field: &str,
    raw: Option<&str>,
) -> Result<Option<PharmacyId>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<PharmacyId>().map(Some).map_err(|e| {
            validation_error(req_id.to_string(), format!("invalid {field} '{raw}': {e}"))
        }),
    }
}

pub(super) async fn list_markers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
    Query(focus): Query<FocusQuery>,
) -> Result<Json<ApiResponse<Vec<MapItem>>>, ApiError> {
    let pipeline = params.into_pipeline(&req_id.0, state.config.default_origin)?;
    let focused = FocusedIds {
        selected: parse_optional_id(&req_id.0, "selected", focus.selected.as_deref())?,
        highlighted: parse_optional_id(&req_id.0, "highlighted", focus.highlighted.as_deref())?,
    };
    let grid_size = match focus.grid.as_deref() {
        None | Some("") => state.config.cluster_grid_size,
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => v,
            _ => {
                return Err(validation_error(
                    req_id.0,
                    format!("grid must be a positive number, got '{raw}'"),
                ))
            }
        },
    };

    let results = run_pipeline(&state, &pipeline).await;
    let projected = ProjectedPharmacy::project(&results, &BoundsProjection::dakar());
    let data = cluster_markers(&projected, &focused, grid_size);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
