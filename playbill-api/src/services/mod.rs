//! Entity services
//!
//! One module per collection. Writes follow the same sequence: normalize
//! and validate the payload, run the store-backed checks inside a
//! [`ReplaceDriver`], detach the previous state, rebuild, commit and answer
//! with the freshly read edit form. Reads assemble show and list views from
//! the `db` composers.

pub mod award_ceremonies;
pub mod awards;
pub mod characters;
pub mod companies;
pub mod materials;
pub mod people;
pub mod productions;
pub mod venues;

use crate::db::{cast, credits, entities, graph, hierarchy, resolver, CreditKind, EntityRow};
use crate::models::validation::DUPLICATE_IDENTITY;
use crate::models::views::{
    CastMemberProduction, CreditedProduction, DeleteResponse, MaterialSummary, ProductionSummary,
    VenueSummary,
};
use crate::models::{NamedEntity, ValidationErrors};
use playbill_common::{Label, RelationshipKind, Result};
use sqlx::SqliteConnection;

/// Add identity errors when another entity already holds this identity
pub(crate) async fn check_identity(
    conn: &mut SqliteConnection,
    label: Label,
    scope_uuid: &str,
    name: &str,
    differentiator: &str,
    excluding: Option<&str>,
    errors: &mut ValidationErrors,
) -> Result<()> {
    if name.is_empty() {
        return Ok(());
    }
    if resolver::find_conflict(conn, label, scope_uuid, name, differentiator, excluding)
        .await?
        .is_some()
    {
        errors.add("name", DUPLICATE_IDENTITY);
        errors.add("differentiator", DUPLICATE_IDENTITY);
    }
    Ok(())
}

/// Name and differentiator of a referenced entity, blank when absent
pub(crate) fn named(entity: Option<EntityRow>) -> NamedEntity {
    entity
        .map(|e| NamedEntity::new(e.name, e.differentiator))
        .unwrap_or_default()
}

pub(crate) fn deleted(entity: &EntityRow) -> DeleteResponse {
    DeleteResponse {
        model: entity.label,
        name: entity.name.clone(),
        differentiator: entity.differentiator.clone(),
        errors: ValidationErrors::new(),
        has_errors: false,
    }
}

pub(crate) async fn venue_summary(conn: &mut SqliteConnection, venue: &EntityRow) -> Result<VenueSummary> {
    Ok(VenueSummary {
        model: Label::Venue,
        uuid: venue.uuid.clone(),
        name: venue.name.clone(),
        sur_venue: hierarchy::ancestor_chain(conn, Label::Venue, &venue.uuid, Some(2)).await?,
    })
}

pub(crate) async fn production_summary(
    conn: &mut SqliteConnection,
    production: &EntityRow,
) -> Result<ProductionSummary> {
    let venue = match graph::single_target(conn, RelationshipKind::PlaysAt, &production.uuid).await? {
        Some(venue) => Some(venue_summary(conn, &venue).await?),
        None => None,
    };

    Ok(ProductionSummary {
        model: Label::Production,
        uuid: production.uuid.clone(),
        name: production.name.clone(),
        start_date: production.start_date.clone(),
        press_date: production.press_date.clone(),
        end_date: production.end_date.clone(),
        venue,
        sur_production: hierarchy::ancestor_chain(conn, Label::Production, &production.uuid, Some(2)).await?,
    })
}

/// Materials crediting `subject` as a writer, with `subject` nullified
pub(crate) async fn credited_materials(conn: &mut SqliteConnection, subject: &str) -> Result<Vec<MaterialSummary>> {
    let mut materials = Vec::new();
    for material in credits::credited_owners(conn, CreditKind::Writing, subject).await? {
        materials.push(credits::material_summary(conn, &material, Some(subject)).await?);
    }
    Ok(materials)
}

/// Productions crediting `subject`, each with the groups it appears in
pub(crate) async fn credited_productions(
    conn: &mut SqliteConnection,
    kind: CreditKind,
    subject: &str,
) -> Result<Vec<CreditedProduction>> {
    let mut productions = Vec::new();
    for production in credits::credited_owners(conn, kind, subject).await? {
        productions.push(CreditedProduction {
            production: production_summary(conn, &production).await?,
            credits: credits::read_groups_involving(conn, kind, &production.uuid, subject).await?,
        });
    }
    Ok(productions)
}

/// Productions in which `person` is a cast member, with their roles
pub(crate) async fn cast_member_productions(
    conn: &mut SqliteConnection,
    person: &str,
) -> Result<Vec<CastMemberProduction>> {
    let rows = cast::rows(conn, cast::CastFilter::Person(person)).await?;

    let mut productions: Vec<CastMemberProduction> = Vec::new();
    for row in rows {
        if productions.last().map(|p| p.production.uuid.as_str()) != Some(row.production_uuid.as_str()) {
            let production = entities::require(conn, Label::Production, &row.production_uuid).await?;
            productions.push(CastMemberProduction {
                production: production_summary(conn, &production).await?,
                roles: Vec::new(),
            });
        }
        if let (Some(entry), Some(role)) = (productions.last_mut(), row.role_view()) {
            entry.roles.push(role);
        }
    }
    Ok(productions)
}
