//! Production endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{DeleteResponse, FormResponse, ProductionShow, ProductionSummary};
use crate::models::ProductionForm;
use crate::services::productions;
use crate::AppState;

/// GET /productions/new
pub async fn new_form() -> Json<FormResponse<ProductionForm>> {
    Json(productions::new_form())
}

/// POST /productions
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<ProductionForm>,
) -> ApiResult<Json<FormResponse<ProductionForm>>> {
    Ok(Json(productions::create(&state.db, state.ids.as_ref(), form).await?))
}

/// GET /productions/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<ProductionForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(productions::edit(&state.db, uuid).await?))
}

/// PUT /productions/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<ProductionForm>,
) -> ApiResult<Json<FormResponse<ProductionForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(productions::update(&state.db, state.ids.as_ref(), uuid, form).await?))
}

/// GET /productions/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<ProductionShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(productions::show(&state.db, uuid).await?))
}

/// GET /productions
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductionSummary>>> {
    Ok(Json(productions::list(&state.db).await?))
}

/// DELETE /productions/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(productions::delete(&state.db, uuid).await?))
}

/// Build production routes
pub fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/productions", get(list).post(create))
        .route("/productions/new", get(new_form))
        .route("/productions/:uuid", get(show).put(update).delete(delete))
        .route("/productions/:uuid/edit", get(edit))
}
