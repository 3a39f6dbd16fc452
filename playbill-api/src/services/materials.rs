//! Material service

use super::{check_identity, deleted, production_summary};
use crate::db::{characters, credits, entities, graph, hierarchy, CreditKind, ReplaceDriver};
use crate::models::views::{DeleteResponse, FormResponse, MaterialShow, MaterialSummary};
use crate::models::MaterialForm;
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::SqlitePool;
use tracing::info;

pub fn new_form() -> FormResponse<MaterialForm> {
    let mut form = MaterialForm::default();
    form.add_placeholders();
    FormResponse::valid(Label::Material, form)
}

pub async fn create(pool: &SqlitePool, ids: &dyn IdGenerator, form: MaterialForm) -> Result<FormResponse<MaterialForm>> {
    save(pool, ids, None, form).await
}

pub async fn update(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    uuid: &str,
    form: MaterialForm,
) -> Result<FormResponse<MaterialForm>> {
    save(pool, ids, Some(uuid), form).await
}

async fn save(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    existing: Option<&str>,
    mut form: MaterialForm,
) -> Result<FormResponse<MaterialForm>> {
    form.normalize();
    form.uuid = existing.map(str::to_string);
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    if let Some(uuid) = existing {
        entities::require(driver.conn(), Label::Material, uuid).await?;
    }
    check_identity(driver.conn(), Label::Material, "", &form.name, &form.differentiator, existing, &mut errors).await?;
    hierarchy::validate_sub_items(driver.conn(), Label::Material, existing, &form.sub_materials, &mut errors).await?;

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::Material, form, errors));
    }

    let uuid = existing.map_or_else(|| ids.generate().to_string(), str::to_string);
    credits::clear(&mut driver, CreditKind::Writing, &uuid).await?;
    characters::clear(&mut driver, &uuid).await?;
    hierarchy::clear(&mut driver, &uuid, &form.sub_materials).await?;

    let mut driver = driver.build();
    if existing.is_some() {
        entities::update_identity(driver.conn(), &uuid, "", &form.name, &form.differentiator).await?;
    } else {
        entities::insert(driver.conn(), &uuid, Label::Material, "", &form.name, &form.differentiator).await?;
    }
    let format = (!form.format.is_empty()).then_some(form.format.as_str());
    entities::set_material_attributes(driver.conn(), &uuid, format, form.year).await?;
    hierarchy::attach(&mut driver, &uuid, &form.sub_materials).await?;
    credits::write_groups(&mut driver, ids, CreditKind::Writing, &uuid, &form.writing_credits).await?;
    characters::write_groups(&mut driver, ids, &uuid, &form.character_groups).await?;
    characters::prune_unlisted(&mut driver, &uuid).await?;
    driver.commit().await?;

    info!(uuid = %uuid, label = %Label::Material, created = existing.is_none(), "Saved material");
    edit(pool, &uuid).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<MaterialForm>> {
    let mut conn = pool.acquire().await?;
    let material = entities::require(&mut conn, Label::Material, uuid).await?;

    let mut form = MaterialForm {
        uuid: Some(material.uuid.clone()),
        name: material.name,
        differentiator: material.differentiator,
        format: material.format.unwrap_or_default(),
        year: material.year,
        sub_materials: hierarchy::form_children(&mut conn, uuid).await?,
        writing_credits: credits::read_form_groups(&mut conn, CreditKind::Writing, uuid).await?,
        character_groups: characters::read_form_groups(&mut conn, uuid).await?,
    };
    form.add_placeholders();

    Ok(FormResponse::valid(Label::Material, form))
}

pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<MaterialShow> {
    let mut conn = pool.acquire().await?;
    let material = entities::require(&mut conn, Label::Material, uuid).await?;

    let mut productions = Vec::new();
    for production in graph::sources(&mut conn, RelationshipKind::ProductionOf, uuid).await? {
        productions.push(production_summary(&mut conn, &production).await?);
    }

    let mut sourcing_materials = Vec::new();
    for sourcing in credits::credited_owners(&mut conn, CreditKind::Writing, uuid).await? {
        sourcing_materials.push(credits::material_summary(&mut conn, &sourcing, Some(uuid)).await?);
    }

    Ok(MaterialShow {
        model: Label::Material,
        uuid: material.uuid.clone(),
        sur_material: hierarchy::ancestor_chain(&mut conn, Label::Material, uuid, None).await?,
        sub_materials: hierarchy::children(&mut conn, uuid).await?.iter().map(|c| c.to_ref()).collect(),
        writing_credits: credits::read_groups(&mut conn, CreditKind::Writing, uuid, Some(uuid)).await?,
        character_groups: characters::read_groups(&mut conn, uuid).await?,
        name: material.name,
        differentiator: material.differentiator,
        format: material.format,
        year: material.year,
        productions,
        sourcing_materials,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<MaterialSummary>> {
    let mut conn = pool.acquire().await?;
    let mut materials = Vec::new();
    for material in entities::list(&mut conn, Label::Material).await? {
        materials.push(credits::material_summary(&mut conn, &material, None).await?);
    }
    Ok(materials)
}

/// Delete the material and the characters scoped to it
pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let material = entities::require(driver.conn(), Label::Material, uuid).await?;
    entities::delete_in_scope(driver.conn(), Label::Character, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::Material, "Deleted material");
    Ok(deleted(&material))
}
