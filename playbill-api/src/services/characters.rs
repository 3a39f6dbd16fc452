//! Character service
//!
//! Characters come into existence through the character groups of their
//! material, so there is no create operation here. Portrayals are found by
//! matching cast roles against the character at read time.

use super::{check_identity, deleted, production_summary};
use crate::db::cast::{self, CastFilter, CastRow};
use crate::db::{characters, credits, entities, EntityRow, ReplaceDriver};
use crate::models::views::{
    dedup_names, CharacterMaterial, CharacterProduction, CharacterShow, DeleteResponse, EntityRef, FormResponse,
    Performer,
};
use crate::models::CharacterForm;
use playbill_common::{Label, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

pub async fn update(pool: &SqlitePool, uuid: &str, mut form: CharacterForm) -> Result<FormResponse<CharacterForm>> {
    form.normalize();
    form.uuid = Some(uuid.to_string());
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    let character = entities::require(driver.conn(), Label::Character, uuid).await?;
    check_identity(
        driver.conn(),
        Label::Character,
        &character.scope_uuid,
        &form.name,
        &form.differentiator,
        Some(uuid),
        &mut errors,
    )
    .await?;

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::Character, form, errors));
    }

    let mut driver = driver.build();
    entities::update_identity(driver.conn(), uuid, &character.scope_uuid, &form.name, &form.differentiator).await?;
    driver.commit().await?;

    info!(uuid, label = %Label::Character, "Saved character");
    edit(pool, uuid).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<CharacterForm>> {
    let mut conn = pool.acquire().await?;
    let character = entities::require(&mut conn, Label::Character, uuid).await?;

    Ok(FormResponse::valid(
        Label::Character,
        CharacterForm {
            uuid: Some(character.uuid),
            name: character.name,
            differentiator: character.differentiator,
        },
    ))
}

/// Productions portraying the character, each with its performers
async fn portrayals(conn: &mut SqliteConnection, character: &str) -> Result<Vec<CharacterProduction>> {
    let rows = cast::rows(conn, CastFilter::Character(character)).await?;

    let mut productions: Vec<CharacterProduction> = Vec::new();
    let mut production_cast: Vec<CastRow> = Vec::new();
    for row in rows {
        if productions.last().map(|p| p.production.uuid.as_str()) != Some(row.production_uuid.as_str()) {
            let production = entities::require(conn, Label::Production, &row.production_uuid).await?;
            production_cast = cast::rows(conn, CastFilter::Production(&row.production_uuid)).await?;
            productions.push(CharacterProduction {
                production: production_summary(conn, &production).await?,
                performers: Vec::new(),
            });
        }

        let other_roles = production_cast
            .iter()
            .filter(|other| other.position == row.position && other.role_position != row.role_position)
            .filter_map(CastRow::role_view)
            .collect();

        if let Some(entry) = productions.last_mut() {
            entry.performers.push(Performer {
                model: Label::Person,
                uuid: row.person_uuid,
                name: row.person_name,
                role_name: row.role_name.unwrap_or_default(),
                qualifier: row.qualifier,
                is_alternate: row.is_alternate,
                other_roles,
            });
        }
    }
    Ok(productions)
}

pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<CharacterShow> {
    let mut conn = pool.acquire().await?;
    let character = entities::require(&mut conn, Label::Character, uuid).await?;

    let material = match entities::fetch(&mut conn, &character.scope_uuid).await? {
        Some(material) if material.label == Label::Material => Some(CharacterMaterial {
            material: credits::material_summary(&mut conn, &material, None).await?,
            depictions: characters::depictions(&mut conn, &material.uuid, uuid).await?,
        }),
        _ => None,
    };

    let variant_named_depictions = dedup_names(
        material
            .iter()
            .flat_map(|m| &m.depictions)
            .filter_map(|d| d.display_name.clone())
            .filter(|name| *name != character.name),
    );

    let productions = portrayals(&mut conn, uuid).await?;
    let variant_named_portrayals = dedup_names(
        productions
            .iter()
            .flat_map(|p| &p.performers)
            .map(|performer| performer.role_name.clone())
            .filter(|name| *name != character.name),
    );

    Ok(CharacterShow {
        model: Label::Character,
        uuid: character.uuid,
        name: character.name,
        differentiator: character.differentiator,
        material,
        variant_named_depictions,
        productions,
        variant_named_portrayals,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<EntityRef>> {
    let mut conn = pool.acquire().await?;
    Ok(entities::list(&mut conn, Label::Character).await?.iter().map(EntityRow::to_ref).collect())
}

pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let character = entities::require(driver.conn(), Label::Character, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::Character, "Deleted character");
    Ok(deleted(&character))
}
