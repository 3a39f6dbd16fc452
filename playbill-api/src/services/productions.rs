//! Production service

use super::{deleted, named, production_summary, venue_summary};
use crate::db::graph::{self, EdgeProps};
use crate::db::{cast, credits, entities, hierarchy, resolver, CreditKind, EntityRow, ReplaceDriver};
use crate::models::views::{DeleteResponse, FormResponse, ProductionShow, ProductionSummary};
use crate::models::{non_blank, CreditGroup, ProductionForm};
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::SqlitePool;
use tracing::info;

const CREDIT_KINDS: [CreditKind; 3] = [CreditKind::Producer, CreditKind::Creative, CreditKind::Crew];

pub fn new_form() -> FormResponse<ProductionForm> {
    let mut form = ProductionForm::default();
    form.add_placeholders();
    FormResponse::valid(Label::Production, form)
}

pub async fn create(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    form: ProductionForm,
) -> Result<FormResponse<ProductionForm>> {
    save(pool, ids, None, form).await
}

pub async fn update(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    uuid: &str,
    form: ProductionForm,
) -> Result<FormResponse<ProductionForm>> {
    save(pool, ids, Some(uuid), form).await
}

fn credits_of(form: &ProductionForm, kind: CreditKind) -> &[CreditGroup] {
    match kind {
        CreditKind::Producer => &form.producer_credits,
        CreditKind::Creative => &form.creative_credits,
        CreditKind::Crew => &form.crew_credits,
        CreditKind::Writing => &[],
    }
}

async fn save(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    existing: Option<&str>,
    mut form: ProductionForm,
) -> Result<FormResponse<ProductionForm>> {
    form.normalize();
    form.uuid = existing.map(str::to_string);
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    if let Some(uuid) = existing {
        entities::require(driver.conn(), Label::Production, uuid).await?;
    }
    hierarchy::validate_sub_items(driver.conn(), Label::Production, existing, &form.sub_productions, &mut errors)
        .await?;

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::Production, form, errors));
    }

    let uuid = existing.map_or_else(|| ids.generate().to_string(), str::to_string);
    graph::detach(&mut driver, &[RelationshipKind::ProductionOf, RelationshipKind::PlaysAt], &uuid).await?;
    for kind in CREDIT_KINDS {
        credits::clear(&mut driver, kind, &uuid).await?;
    }
    cast::clear(&mut driver, &uuid).await?;
    hierarchy::clear(&mut driver, &uuid, &form.sub_productions).await?;

    let mut driver = driver.build();
    if existing.is_some() {
        entities::update_identity(driver.conn(), &uuid, "", &form.name, "").await?;
    } else {
        entities::insert(driver.conn(), &uuid, Label::Production, "", &form.name, "").await?;
    }
    entities::set_production_dates(
        driver.conn(),
        &uuid,
        non_blank(&form.start_date),
        non_blank(&form.press_date),
        non_blank(&form.end_date),
    )
    .await?;

    for (kind, label, reference) in [
        (RelationshipKind::ProductionOf, Label::Material, &form.material),
        (RelationshipKind::PlaysAt, Label::Venue, &form.venue),
    ] {
        if reference.name.is_empty() {
            continue;
        }
        let target =
            resolver::resolve(driver.conn(), ids, label, "", &reference.name, &reference.differentiator).await?;
        graph::link(driver.conn(), kind, &uuid, &target.uuid, &EdgeProps::default()).await?;
    }

    hierarchy::attach(&mut driver, &uuid, &form.sub_productions).await?;
    for kind in CREDIT_KINDS {
        credits::write_groups(&mut driver, ids, kind, &uuid, credits_of(&form, kind)).await?;
    }
    cast::write(&mut driver, ids, &uuid, &form.cast).await?;
    driver.commit().await?;

    info!(uuid = %uuid, label = %Label::Production, created = existing.is_none(), "Saved production");
    edit(pool, &uuid).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<ProductionForm>> {
    let mut conn = pool.acquire().await?;
    let production = entities::require(&mut conn, Label::Production, uuid).await?;

    let mut form = ProductionForm {
        uuid: Some(production.uuid.clone()),
        name: production.name,
        start_date: production.start_date.unwrap_or_default(),
        press_date: production.press_date.unwrap_or_default(),
        end_date: production.end_date.unwrap_or_default(),
        material: named(graph::single_target(&mut conn, RelationshipKind::ProductionOf, uuid).await?),
        venue: named(graph::single_target(&mut conn, RelationshipKind::PlaysAt, uuid).await?),
        sub_productions: hierarchy::form_children(&mut conn, uuid).await?,
        producer_credits: credits::read_form_groups(&mut conn, CreditKind::Producer, uuid).await?,
        cast: cast::read_form(&mut conn, uuid).await?,
        creative_credits: credits::read_form_groups(&mut conn, CreditKind::Creative, uuid).await?,
        crew_credits: credits::read_form_groups(&mut conn, CreditKind::Crew, uuid).await?,
    };
    form.add_placeholders();

    Ok(FormResponse::valid(Label::Production, form))
}

pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<ProductionShow> {
    let mut conn = pool.acquire().await?;
    let production = entities::require(&mut conn, Label::Production, uuid).await?;

    let material = match graph::single_target(&mut conn, RelationshipKind::ProductionOf, uuid).await? {
        Some(material) => Some(credits::material_summary(&mut conn, &material, None).await?),
        None => None,
    };
    let venue = match graph::single_target(&mut conn, RelationshipKind::PlaysAt, uuid).await? {
        Some(venue) => Some(venue_summary(&mut conn, &venue).await?),
        None => None,
    };

    Ok(ProductionShow {
        model: Label::Production,
        uuid: production.uuid.clone(),
        material,
        venue,
        sur_production: hierarchy::ancestor_chain(&mut conn, Label::Production, uuid, None).await?,
        sub_productions: hierarchy::children(&mut conn, uuid).await?.iter().map(EntityRow::to_ref).collect(),
        producer_credits: credits::read_groups(&mut conn, CreditKind::Producer, uuid, None).await?,
        cast: cast::read(&mut conn, uuid, None).await?,
        creative_credits: credits::read_groups(&mut conn, CreditKind::Creative, uuid, None).await?,
        crew_credits: credits::read_groups(&mut conn, CreditKind::Crew, uuid, None).await?,
        name: production.name,
        start_date: production.start_date,
        press_date: production.press_date,
        end_date: production.end_date,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<ProductionSummary>> {
    let mut conn = pool.acquire().await?;
    let mut productions = Vec::new();
    for production in entities::list(&mut conn, Label::Production).await? {
        productions.push(production_summary(&mut conn, &production).await?);
    }
    Ok(productions)
}

pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let production = entities::require(driver.conn(), Label::Production, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::Production, "Deleted production");
    Ok(deleted(&production))
}
