//! Person endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{DeleteResponse, EntityRef, FormResponse, PersonShow};
use crate::models::PersonForm;
use crate::services::people;
use crate::AppState;

/// GET /people/new
pub async fn new_form() -> Json<FormResponse<PersonForm>> {
    Json(people::new_form())
}

/// POST /people
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<PersonForm>,
) -> ApiResult<Json<FormResponse<PersonForm>>> {
    Ok(Json(people::create(&state.db, state.ids.as_ref(), form).await?))
}

/// GET /people/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<PersonForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(people::edit(&state.db, uuid).await?))
}

/// PUT /people/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<PersonForm>,
) -> ApiResult<Json<FormResponse<PersonForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(people::update(&state.db, state.ids.as_ref(), uuid, form).await?))
}

/// GET /people/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<PersonShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(people::show(&state.db, uuid).await?))
}

/// GET /people
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EntityRef>>> {
    Ok(Json(people::list(&state.db).await?))
}

/// DELETE /people/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(people::delete(&state.db, uuid).await?))
}

/// Build person routes
pub fn person_routes() -> Router<AppState> {
    Router::new()
        .route("/people", get(list).post(create))
        .route("/people/new", get(new_form))
        .route("/people/:uuid", get(show).put(update).delete(delete))
        .route("/people/:uuid/edit", get(edit))
}
