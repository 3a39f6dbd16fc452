//! Venue service

use super::{check_identity, deleted, production_summary, venue_summary};
use crate::db::{entities, hierarchy, EntityRow, ReplaceDriver};
use crate::models::views::{DeleteResponse, EntityRef, FormResponse, VenueProduction, VenueShow, VenueSummary};
use crate::models::VenueForm;
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::SqlitePool;
use tracing::info;

pub fn new_form() -> FormResponse<VenueForm> {
    let mut form = VenueForm::default();
    form.add_placeholders();
    FormResponse::valid(Label::Venue, form)
}

pub async fn create(pool: &SqlitePool, ids: &dyn IdGenerator, form: VenueForm) -> Result<FormResponse<VenueForm>> {
    save(pool, ids, None, form).await
}

pub async fn update(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    uuid: &str,
    form: VenueForm,
) -> Result<FormResponse<VenueForm>> {
    save(pool, ids, Some(uuid), form).await
}

async fn save(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    existing: Option<&str>,
    mut form: VenueForm,
) -> Result<FormResponse<VenueForm>> {
    form.normalize();
    form.uuid = existing.map(str::to_string);
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    if let Some(uuid) = existing {
        entities::require(driver.conn(), Label::Venue, uuid).await?;
    }
    check_identity(driver.conn(), Label::Venue, "", &form.name, &form.differentiator, existing, &mut errors).await?;
    hierarchy::validate_sub_items(driver.conn(), Label::Venue, existing, &form.sub_venues, &mut errors).await?;

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::Venue, form, errors));
    }

    let uuid = existing.map_or_else(|| ids.generate().to_string(), str::to_string);
    hierarchy::clear(&mut driver, &uuid, &form.sub_venues).await?;

    let mut driver = driver.build();
    if existing.is_some() {
        entities::update_identity(driver.conn(), &uuid, "", &form.name, &form.differentiator).await?;
    } else {
        entities::insert(driver.conn(), &uuid, Label::Venue, "", &form.name, &form.differentiator).await?;
    }
    hierarchy::attach(&mut driver, &uuid, &form.sub_venues).await?;
    driver.commit().await?;

    info!(uuid = %uuid, label = %Label::Venue, created = existing.is_none(), "Saved venue");
    edit(pool, &uuid).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<VenueForm>> {
    let mut conn = pool.acquire().await?;
    let venue = entities::require(&mut conn, Label::Venue, uuid).await?;

    let mut form = VenueForm {
        uuid: Some(venue.uuid),
        name: venue.name,
        differentiator: venue.differentiator,
        sub_venues: hierarchy::form_children(&mut conn, uuid).await?,
    };
    form.add_placeholders();

    Ok(FormResponse::valid(Label::Venue, form))
}

/// Venue with its productions, including those at its direct sub-venues
pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<VenueShow> {
    let mut conn = pool.acquire().await?;
    let venue = entities::require(&mut conn, Label::Venue, uuid).await?;
    let sub_venues: Vec<EntityRef> = hierarchy::children(&mut conn, uuid).await?.iter().map(EntityRow::to_ref).collect();

    let mut productions = Vec::new();
    for (production, target) in hierarchy::sources_within(&mut conn, RelationshipKind::PlaysAt, uuid).await? {
        let sub_venue = sub_venues
            .iter()
            .find(|sub| target != uuid && sub.uuid.as_deref() == Some(target.as_str()))
            .cloned();
        productions.push(VenueProduction {
            production: production_summary(&mut conn, &production).await?,
            sub_venue,
        });
    }

    Ok(VenueShow {
        model: Label::Venue,
        uuid: venue.uuid,
        name: venue.name,
        differentiator: venue.differentiator,
        sur_venue: hierarchy::ancestor_chain(&mut conn, Label::Venue, uuid, None).await?,
        sub_venues,
        productions,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<VenueSummary>> {
    let mut conn = pool.acquire().await?;
    let mut venues = Vec::new();
    for venue in entities::list(&mut conn, Label::Venue).await? {
        venues.push(venue_summary(&mut conn, &venue).await?);
    }
    Ok(venues)
}

pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let venue = entities::require(driver.conn(), Label::Venue, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::Venue, "Deleted venue");
    Ok(deleted(&venue))
}
