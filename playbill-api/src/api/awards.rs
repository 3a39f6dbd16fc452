//! Award endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{AwardShow, DeleteResponse, EntityRef, FormResponse};
use crate::models::AwardForm;
use crate::services::awards;
use crate::AppState;

/// GET /awards/new
pub async fn new_form() -> Json<FormResponse<AwardForm>> {
    Json(awards::new_form())
}

/// POST /awards
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<AwardForm>,
) -> ApiResult<Json<FormResponse<AwardForm>>> {
    Ok(Json(awards::create(&state.db, state.ids.as_ref(), form).await?))
}

/// GET /awards/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<AwardForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(awards::edit(&state.db, uuid).await?))
}

/// PUT /awards/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<AwardForm>,
) -> ApiResult<Json<FormResponse<AwardForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(awards::update(&state.db, state.ids.as_ref(), uuid, form).await?))
}

/// GET /awards/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<AwardShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(awards::show(&state.db, uuid).await?))
}

/// GET /awards
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EntityRef>>> {
    Ok(Json(awards::list(&state.db).await?))
}

/// DELETE /awards/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(awards::delete(&state.db, uuid).await?))
}

/// Build award routes
pub fn award_routes() -> Router<AppState> {
    Router::new()
        .route("/awards", get(list).post(create))
        .route("/awards/new", get(new_form))
        .route("/awards/:uuid", get(show).put(update).delete(delete))
        .route("/awards/:uuid/edit", get(edit))
}
