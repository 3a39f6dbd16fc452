//! Material endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{DeleteResponse, FormResponse, MaterialShow, MaterialSummary};
use crate::models::MaterialForm;
use crate::services::materials;
use crate::AppState;

/// GET /materials/new
pub async fn new_form() -> Json<FormResponse<MaterialForm>> {
    Json(materials::new_form())
}

/// POST /materials
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<MaterialForm>,
) -> ApiResult<Json<FormResponse<MaterialForm>>> {
    Ok(Json(materials::create(&state.db, state.ids.as_ref(), form).await?))
}

/// GET /materials/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<MaterialForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(materials::edit(&state.db, uuid).await?))
}

/// PUT /materials/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<MaterialForm>,
) -> ApiResult<Json<FormResponse<MaterialForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(materials::update(&state.db, state.ids.as_ref(), uuid, form).await?))
}

/// GET /materials/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<MaterialShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(materials::show(&state.db, uuid).await?))
}

/// GET /materials
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<MaterialSummary>>> {
    Ok(Json(materials::list(&state.db).await?))
}

/// DELETE /materials/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(materials::delete(&state.db, uuid).await?))
}

/// Build material routes
pub fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/materials", get(list).post(create))
        .route("/materials/new", get(new_form))
        .route("/materials/:uuid", get(show).put(update).delete(delete))
        .route("/materials/:uuid/edit", get(edit))
}
