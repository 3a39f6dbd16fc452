//! Award service

use super::{check_identity, deleted};
use crate::db::{entities, nominations, EntityRow, ReplaceDriver};
use crate::models::views::{AwardShow, CeremonyView, DeleteResponse, EntityRef, FormResponse};
use crate::models::AwardForm;
use playbill_common::{IdGenerator, Label, Result};
use sqlx::SqlitePool;
use tracing::info;

pub fn new_form() -> FormResponse<AwardForm> {
    FormResponse::valid(Label::Award, AwardForm::default())
}

pub async fn create(pool: &SqlitePool, ids: &dyn IdGenerator, form: AwardForm) -> Result<FormResponse<AwardForm>> {
    save(pool, ids, None, form).await
}

pub async fn update(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    uuid: &str,
    form: AwardForm,
) -> Result<FormResponse<AwardForm>> {
    save(pool, ids, Some(uuid), form).await
}

async fn save(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    existing: Option<&str>,
    mut form: AwardForm,
) -> Result<FormResponse<AwardForm>> {
    form.normalize();
    form.uuid = existing.map(str::to_string);
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    if let Some(uuid) = existing {
        entities::require(driver.conn(), Label::Award, uuid).await?;
    }
    check_identity(driver.conn(), Label::Award, "", &form.name, &form.differentiator, existing, &mut errors).await?;

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::Award, form, errors));
    }

    let uuid = existing.map_or_else(|| ids.generate().to_string(), str::to_string);
    let mut driver = driver.build();
    if existing.is_some() {
        entities::update_identity(driver.conn(), &uuid, "", &form.name, &form.differentiator).await?;
    } else {
        entities::insert(driver.conn(), &uuid, Label::Award, "", &form.name, &form.differentiator).await?;
    }
    driver.commit().await?;

    info!(uuid = %uuid, label = %Label::Award, created = existing.is_none(), "Saved award");
    edit(pool, &uuid).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<AwardForm>> {
    let mut conn = pool.acquire().await?;
    let award = entities::require(&mut conn, Label::Award, uuid).await?;

    Ok(FormResponse::valid(
        Label::Award,
        AwardForm {
            uuid: Some(award.uuid),
            name: award.name,
            differentiator: award.differentiator,
        },
    ))
}

/// Award with its ceremonies (latest name first) and their full categories
pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<AwardShow> {
    let mut conn = pool.acquire().await?;
    let award = entities::require(&mut conn, Label::Award, uuid).await?;

    let mut ceremonies = Vec::new();
    for ceremony in entities::list_in_scope(&mut conn, Label::AwardCeremony, uuid).await? {
        ceremonies.push(CeremonyView {
            model: Label::AwardCeremony,
            categories: nominations::read(&mut conn, &ceremony.uuid).await?,
            uuid: ceremony.uuid,
            name: ceremony.name,
        });
    }

    Ok(AwardShow {
        model: Label::Award,
        uuid: award.uuid,
        name: award.name,
        differentiator: award.differentiator,
        ceremonies,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<EntityRef>> {
    let mut conn = pool.acquire().await?;
    Ok(entities::list(&mut conn, Label::Award).await?.iter().map(EntityRow::to_ref).collect())
}

/// Delete the award together with its ceremonies and their categories
pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let award = entities::require(driver.conn(), Label::Award, uuid).await?;
    for ceremony in entities::list_in_scope(driver.conn(), Label::AwardCeremony, uuid).await? {
        entities::delete_in_scope(driver.conn(), Label::AwardCeremonyCategory, &ceremony.uuid).await?;
    }
    let ceremonies = entities::delete_in_scope(driver.conn(), Label::AwardCeremony, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::Award, ceremonies, "Deleted award");
    Ok(deleted(&award))
}
