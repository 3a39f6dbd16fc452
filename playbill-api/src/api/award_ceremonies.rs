//! Award ceremony endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{AwardCeremonyShow, CeremonySummary, DeleteResponse, FormResponse};
use crate::models::AwardCeremonyForm;
use crate::services::award_ceremonies;
use crate::AppState;

/// GET /awards/ceremonies/new
pub async fn new_form() -> Json<FormResponse<AwardCeremonyForm>> {
    Json(award_ceremonies::new_form())
}

/// POST /awards/ceremonies
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<AwardCeremonyForm>,
) -> ApiResult<Json<FormResponse<AwardCeremonyForm>>> {
    Ok(Json(award_ceremonies::create(&state.db, state.ids.as_ref(), form).await?))
}

/// GET /awards/ceremonies/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<AwardCeremonyForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(award_ceremonies::edit(&state.db, uuid).await?))
}

/// PUT /awards/ceremonies/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<AwardCeremonyForm>,
) -> ApiResult<Json<FormResponse<AwardCeremonyForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(award_ceremonies::update(&state.db, state.ids.as_ref(), uuid, form).await?))
}

/// GET /awards/ceremonies/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<AwardCeremonyShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(award_ceremonies::show(&state.db, uuid).await?))
}

/// GET /awards/ceremonies
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<CeremonySummary>>> {
    Ok(Json(award_ceremonies::list(&state.db).await?))
}

/// DELETE /awards/ceremonies/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(award_ceremonies::delete(&state.db, uuid).await?))
}

/// Build award ceremony routes
pub fn award_ceremony_routes() -> Router<AppState> {
    Router::new()
        .route("/awards/ceremonies", get(list).post(create))
        .route("/awards/ceremonies/new", get(new_form))
        .route("/awards/ceremonies/:uuid", get(show).put(update).delete(delete))
        .route("/awards/ceremonies/:uuid/edit", get(edit))
}
