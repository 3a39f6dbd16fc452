//! Character endpoints
//!
//! Characters are created through material character groups, so this
//! collection has no `new` or create route.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{CharacterShow, DeleteResponse, EntityRef, FormResponse};
use crate::models::CharacterForm;
use crate::services::characters;
use crate::AppState;

/// GET /characters/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<CharacterForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(characters::edit(&state.db, uuid).await?))
}

/// PUT /characters/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<CharacterForm>,
) -> ApiResult<Json<FormResponse<CharacterForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(characters::update(&state.db, uuid, form).await?))
}

/// GET /characters/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<CharacterShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(characters::show(&state.db, uuid).await?))
}

/// GET /characters
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EntityRef>>> {
    Ok(Json(characters::list(&state.db).await?))
}

/// DELETE /characters/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(characters::delete(&state.db, uuid).await?))
}

/// Build character routes
pub fn character_routes() -> Router<AppState> {
    Router::new()
        .route("/characters", get(list))
        .route("/characters/:uuid", get(show).put(update).delete(delete))
        .route("/characters/:uuid/edit", get(edit))
}
