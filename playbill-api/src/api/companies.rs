//! Company endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::uuid_param;
use crate::error::ApiResult;
use crate::models::views::{CompanyShow, DeleteResponse, EntityRef, FormResponse};
use crate::models::CompanyForm;
use crate::services::companies;
use crate::AppState;

/// GET /companies/new
pub async fn new_form() -> Json<FormResponse<CompanyForm>> {
    Json(companies::new_form())
}

/// POST /companies
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<CompanyForm>,
) -> ApiResult<Json<FormResponse<CompanyForm>>> {
    Ok(Json(companies::create(&state.db, state.ids.as_ref(), form).await?))
}

/// GET /companies/:uuid/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<FormResponse<CompanyForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(companies::edit(&state.db, uuid).await?))
}

/// PUT /companies/:uuid
pub async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(form): Json<CompanyForm>,
) -> ApiResult<Json<FormResponse<CompanyForm>>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(companies::update(&state.db, state.ids.as_ref(), uuid, form).await?))
}

/// GET /companies/:uuid
pub async fn show(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<CompanyShow>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(companies::show(&state.db, uuid).await?))
}

/// GET /companies
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EntityRef>>> {
    Ok(Json(companies::list(&state.db).await?))
}

/// DELETE /companies/:uuid
pub async fn delete(State(state): State<AppState>, Path(uuid): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    let uuid = uuid_param(&uuid)?;
    Ok(Json(companies::delete(&state.db, uuid).await?))
}

/// Build company routes
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list).post(create))
        .route("/companies/new", get(new_form))
        .route("/companies/:uuid", get(show).put(update).delete(delete))
        .route("/companies/:uuid/edit", get(edit))
}
