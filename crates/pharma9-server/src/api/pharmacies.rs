use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    Extension, Json,
};
use pharma9_core::{
    clipboard_text, decorate, neighborhood_options, query, share_payload, Coordinates, DutyFilter,
    Filters, NeighborhoodFilter, PharmacyId, RatedPharmacy, ReviewRecord, SharePayload, SortMode,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{not_found, validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Filter, sort, and origin parameters shared by the list and map routes.
///
/// Everything arrives as text so a bad value yields an enveloped
/// `validation_error` instead of a bare extractor rejection. Without
/// `lat`/`lng` the configured default origin is used.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ListQuery {
    pub q: Option<String>,
    pub duty: Option<String>,
    pub neighborhood: Option<String>,
    pub sort: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug)]
pub(super) struct Pipeline {
    pub filters: Filters,
    pub sort: SortMode,
    pub origin: Coordinates,
}

impl ListQuery {
    pub(super) fn into_pipeline(
        self,
        req_id: &str,
        default_origin: Coordinates,
    ) -> Result<Pipeline, ApiError> {
        let duty = match self.duty.as_deref() {
            None | Some("") => DutyFilter::default(),
            Some(raw) => raw
                .parse::<DutyFilter>()
                .map_err(|e| validation_error(req_id.to_string(), e.to_string()))?,
        };
        let sort = match self.sort.as_deref() {
            None | Some("") => SortMode::default(),
            Some(raw) => raw
                .parse::<SortMode>()
                .map_err(|e| validation_error(req_id.to_string(), e.to_string()))?,
        };
        let neighborhood = self
            .neighborhood
            .as_deref()
            .filter(|label| !label.is_empty())
            .map(NeighborhoodFilter::from_label)
            .unwrap_or_default();

        let origin = match (self.lat.as_deref(), self.lng.as_deref()) {
            (None, None) => default_origin,
            (Some(lat), Some(lng)) => format!("{lat},{lng}")
                .parse::<Coordinates>()
                .map_err(|e| validation_error(req_id.to_string(), e))?,
            _ => {
                return Err(validation_error(
                    req_id.to_string(),
                    "lat and lng must be given together",
                ))
            }
        };

        Ok(Pipeline {
            filters: Filters {
                search: self.q.unwrap_or_default(),
                duty,
                neighborhood,
            },
            sort,
            origin,
        })
    }
}

/// Run the filter-sort pipeline over the catalog and the current book.
pub(super) async fn run_pipeline(state: &AppState, pipeline: &Pipeline) -> Vec<RatedPharmacy> {
    let rated = {
        let book = state.ratings.lock().await;
        decorate(&state.catalog.pharmacies, &book)
    };
    query(&rated, &pipeline.filters, pipeline.sort, Some(pipeline.origin))
}

pub(super) fn parse_id(
    req_id: &str,
    id: Result<Path<PharmacyId>, PathRejection>,
) -> Result<PharmacyId, ApiError> {
    id.map(|Path(id)| id).map_err(|e| {
        validation_error(req_id.to_string(), format!("invalid pharmacy id: {e}"))
    })
}

pub(super) async fn list_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<RatedPharmacy>>>, ApiError> {
    let pipeline = params.into_pipeline(&req_id.0, state.config.default_origin)?;
    let data = run_pipeline(&state, &pipeline).await;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct PharmacyDetail {
    #[serde(flatten)]
    pub pharmacy: RatedPharmacy,
    pub status: &'static str,
    pub current_hours: String,
    pub directions_url: String,
    pub reviews: Vec<ReviewRecord>,
    pub share: SharePayload,
    pub clipboard_text: String,
}

pub(super) async fn get_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    id: Result<Path<PharmacyId>, PathRejection>,
) -> Result<Json<ApiResponse<PharmacyDetail>>, ApiError> {
    let id = parse_id(&req_id.0, id)?;
    let record = state
        .catalog
        .get(id)
        .ok_or_else(|| not_found(req_id.0.clone(), id))?;

    let pharmacy = {
        let book = state.ratings.lock().await;
        RatedPharmacy::new(record.clone(), &book)
    };
    let url = format!(
        "{}/pharmacies/{id}",
        state.config.public_url.trim_end_matches('/')
    );

    let data = PharmacyDetail {
        status: record.status_label(),
        current_hours: record.current_hours().to_string(),
        directions_url: record.directions_url(),
        reviews: state.catalog.reviews_for(id).into_iter().cloned().collect(),
        share: share_payload(record, &url),
        clipboard_text: clipboard_text(record),
        pharmacy,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_neighborhoods(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse {
        data: neighborhood_options(&state.catalog.pharmacies),
        meta: ResponseMeta::new(req_id.0),
    })
}
