//! Venue endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{DeleteResponse, FormResponse, VenueShow, VenueSummary};
use crate::models::VenueForm;
use crate::services::venues;
use crate::AppState;

/// GET /venues/new
pub async fn new_form() -> Json<FormResponse<VenueForm>> {
    Json(venues::new_form())
}

/// POST /venues
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<VenueForm>,
) -> ApiResult<Json<FormResponse<VenueForm>>> {
    Ok(Json(venues::create(&state.db, state.ids.as_ref(), form).await?))
}

/// GET /venues/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<VenueForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(venues::edit(&state.db, uuid).await?))
}

/// PUT /venues/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<VenueForm>,
) -> ApiResult<Json<FormResponse<VenueForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(venues::update(&state.db, state.ids.as_ref(), uuid, form).await?))
}

/// GET /venues/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<VenueShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(venues::show(&state.db, uuid).await?))
}

/// GET /venues
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<VenueSummary>>> {
    Ok(Json(venues::list(&state.db).await?))
}

/// DELETE /venues/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(venues::delete(&state.db, uuid).await?))
}

/// Build venue routes
pub fn venue_routes() -> Router<AppState> {
    Router::new()
        .route("/venues", get(list).post(create))
        .route("/venues/new", get(new_form))
        .route("/venues/:uuid", get(show).put(update).delete(delete))
        .route("/venues/:uuid/edit", get(edit))
}
