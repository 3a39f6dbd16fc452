//! Credit-group composer
//!
//! A credit is one edge from the credited owner (material or production) to
//! each credited entity, carrying the group name and the group/entity
//! positions. A company's members are further edges of the same kind from
//! the owner to each member person, tagged with the company's uuid and the
//! company's group/entity positions, so the same company can be credited
//! with different members in different places.
//!
//! Nominations reuse the same layout under `HAS_NOMINEE`, see
//! [`super::nominations`].

use super::entities::{EntityRow, ENTITY_COLUMNS};
use super::graph::{self, EdgeProps};
use super::hierarchy;
use super::replace::{BuildPhase, DeletePhase, ReplaceDriver};
use super::resolver;
use crate::models::views::{CompanyCredit, CreditGroupView, CreditedEntityView, MaterialSummary};
use crate::models::{non_blank, CompanyEntity, CreditGroup, CreditedEntity, NamedEntity};
use futures::future::BoxFuture;
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::{Row, SqliteConnection};

/// Credit family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditKind {
    Writing,
    Producer,
    Creative,
    Crew,
}

impl CreditKind {
    pub fn relationship(self) -> RelationshipKind {
        match self {
            CreditKind::Writing => RelationshipKind::WritingCredit,
            CreditKind::Producer => RelationshipKind::ProducerCredit,
            CreditKind::Creative => RelationshipKind::CreativeCredit,
            CreditKind::Crew => RelationshipKind::CrewCredit,
        }
    }

    /// Name given to a group submitted without one
    pub fn default_group_name(self) -> Option<&'static str> {
        match self {
            CreditKind::Writing => Some("by"),
            CreditKind::Producer => Some("produced by"),
            CreditKind::Creative | CreditKind::Crew => None,
        }
    }
}

/// Credited entity with the members recorded for this credit
#[derive(Debug, Clone)]
pub(crate) struct RowEntity {
    pub entity: EntityRow,
    pub members: Vec<EntityRow>,
}

impl RowEntity {
    fn involves(&self, uuid: &str) -> bool {
        self.entity.uuid == uuid || self.members.iter().any(|m| m.uuid == uuid)
    }
}

/// One credit group (or one nomination) read back from the store
#[derive(Debug, Clone)]
pub(crate) struct RowGroup {
    pub name: Option<String>,
    pub position: i64,
    pub is_winner: bool,
    pub entities: Vec<RowEntity>,
}

impl RowGroup {
    pub fn involves(&self, uuid: &str) -> bool {
        self.entities.iter().any(|e| e.involves(uuid))
    }
}

/// Read and assemble the credit-shaped edges of one kind from `source_uuid`
pub(crate) async fn read_rows(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    source_uuid: &str,
) -> Result<Vec<RowGroup>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT r.group_name, r.group_position, r.credited_company_uuid, r.is_winner, {}
        FROM relationships r JOIN entities e ON e.uuid = r.target_uuid
        WHERE r.kind = ? AND r.source_uuid = ?
        ORDER BY r.group_position, r.entity_position,
                 r.credited_company_uuid IS NOT NULL, r.member_position, r.id
        "#,
        ENTITY_COLUMNS
    ))
    .bind(kind.as_str())
    .bind(source_uuid)
    .fetch_all(&mut *conn)
    .await?;

    let mut groups: Vec<RowGroup> = Vec::new();
    for row in &rows {
        let group_position: i64 = row.get::<Option<i64>, _>("group_position").unwrap_or_default();
        let credited_company: Option<String> = row.get("credited_company_uuid");
        let entity = EntityRow::from_row(row)?;

        if groups.last().map(|g| g.position) != Some(group_position) {
            groups.push(RowGroup {
                name: row.get("group_name"),
                position: group_position,
                is_winner: row.get::<Option<bool>, _>("is_winner").unwrap_or(false),
                entities: Vec::new(),
            });
        }
        let Some(group) = groups.last_mut() else { continue };

        match credited_company {
            None => group.entities.push(RowEntity {
                entity,
                members: Vec::new(),
            }),
            Some(company_uuid) => {
                let owner = group.entities.iter_mut().rev().find(|e| e.entity.uuid == company_uuid);
                if let Some(owner) = owner {
                    owner.members.push(entity);
                }
            }
        }
    }

    // A group can be left holding only member rows whose company row is gone
    groups.retain(|g| !g.entities.is_empty());
    Ok(groups)
}

/// Link the writable entities of one group, with dense entity positions
///
/// `base` carries the group-level properties (name, position, winner flag).
pub(crate) async fn write_entities(
    conn: &mut SqliteConnection,
    ids: &dyn IdGenerator,
    kind: RelationshipKind,
    source_uuid: &str,
    entities: &[CreditedEntity],
    base: &EdgeProps,
) -> Result<()> {
    for (entity_position, entity) in entities.iter().filter(|e| e.is_writable()).enumerate() {
        let resolved =
            resolver::resolve(conn, ids, entity.label(), "", entity.name(), entity.differentiator()).await?;

        let props = EdgeProps {
            entity_position: Some(entity_position as i64),
            ..base.clone()
        };
        graph::link(conn, kind, source_uuid, &resolved.uuid, &props).await?;

        let members = entity.members().iter().filter(|m| !m.name.is_empty());
        for (member_position, member) in members.enumerate() {
            let person =
                resolver::resolve(conn, ids, Label::Person, "", &member.name, &member.differentiator).await?;
            let member_props = EdgeProps {
                member_position: Some(member_position as i64),
                credited_company_uuid: Some(resolved.uuid.clone()),
                ..props.clone()
            };
            graph::link(conn, kind, source_uuid, &person.uuid, &member_props).await?;
        }
    }
    Ok(())
}

/// Remove all credits of a kind from `owner`
pub async fn clear(driver: &mut ReplaceDriver<DeletePhase>, kind: CreditKind, owner: &str) -> Result<()> {
    graph::unlink_outgoing(driver.conn(), kind.relationship(), owner).await?;
    Ok(())
}

/// Write credit groups for `owner`
///
/// Groups without a named entity are skipped and positions stay dense.
pub async fn write_groups(
    driver: &mut ReplaceDriver<BuildPhase>,
    ids: &dyn IdGenerator,
    kind: CreditKind,
    owner: &str,
    groups: &[CreditGroup],
) -> Result<()> {
    for (group_position, group) in groups.iter().filter(|g| g.is_writable()).enumerate() {
        let name = non_blank(&group.name).or(kind.default_group_name());
        let base = EdgeProps {
            group_name: name.map(str::to_string),
            group_position: Some(group_position as i64),
            ..Default::default()
        };
        write_entities(driver.conn(), ids, kind.relationship(), owner, &group.entities, &base).await?;
    }
    Ok(())
}

/// Credit groups as submitted on an edit form
pub async fn read_form_groups(
    conn: &mut SqliteConnection,
    kind: CreditKind,
    owner: &str,
) -> Result<Vec<CreditGroup>> {
    Ok(read_rows(conn, kind.relationship(), owner)
        .await?
        .iter()
        .map(|group| CreditGroup {
            name: group.name.clone().unwrap_or_default(),
            entities: group.entities.iter().map(form_entity).collect(),
        })
        .collect())
}

pub(crate) fn form_entity(item: &RowEntity) -> CreditedEntity {
    let entity = &item.entity;
    match entity.label {
        Label::Company => CreditedEntity::Company(CompanyEntity {
            name: entity.name.clone(),
            differentiator: entity.differentiator.clone(),
            members: item
                .members
                .iter()
                .map(|m| NamedEntity::new(&m.name, &m.differentiator))
                .collect(),
        }),
        Label::Material => CreditedEntity::Material(NamedEntity::new(&entity.name, &entity.differentiator)),
        _ => CreditedEntity::Person(NamedEntity::new(&entity.name, &entity.differentiator)),
    }
}

/// View of a credited person or company; the subject renders with a null
/// uuid
pub(crate) fn entity_view(item: &RowEntity, subject: Option<&str>) -> CreditedEntityView {
    let entity = &item.entity;
    match entity.label {
        Label::Company => CreditedEntityView::Company(CompanyCredit {
            model: Label::Company,
            uuid: Some(entity.uuid.clone()).filter(|uuid| Some(uuid.as_str()) != subject),
            name: entity.name.clone(),
            members: item.members.iter().map(|m| m.to_ref().nullify(subject)).collect(),
        }),
        Label::Material => CreditedEntityView::Material(MaterialSummary {
            model: Label::Material,
            uuid: Some(entity.uuid.clone()).filter(|uuid| Some(uuid.as_str()) != subject),
            name: entity.name.clone(),
            format: entity.format.clone(),
            year: entity.year,
            sur_material: None,
            writing_credits: Vec::new(),
        }),
        _ => CreditedEntityView::Person(entity.to_ref().nullify(subject)),
    }
}

/// Credit groups of `owner` with nested source materials resolved
pub async fn read_groups(
    conn: &mut SqliteConnection,
    kind: CreditKind,
    owner: &str,
    subject: Option<&str>,
) -> Result<Vec<CreditGroupView>> {
    read_groups_on_path(conn, kind, owner, subject, false, vec![owner.to_string()]).await
}

/// Like [`read_groups`], keeping only the groups in which `subject` is
/// credited directly or as a company member
pub async fn read_groups_involving(
    conn: &mut SqliteConnection,
    kind: CreditKind,
    owner: &str,
    subject: &str,
) -> Result<Vec<CreditGroupView>> {
    read_groups_on_path(conn, kind, owner, Some(subject), true, vec![owner.to_string()]).await
}

fn read_groups_on_path<'a>(
    conn: &'a mut SqliteConnection,
    kind: CreditKind,
    owner: &'a str,
    subject: Option<&'a str>,
    only_involving: bool,
    path: Vec<String>,
) -> BoxFuture<'a, Result<Vec<CreditGroupView>>> {
    Box::pin(async move {
        let groups = read_rows(conn, kind.relationship(), owner).await?;

        let mut views = Vec::with_capacity(groups.len());
        for group in groups {
            if only_involving && !subject.is_some_and(|s| group.involves(s)) {
                continue;
            }

            let mut entities = Vec::with_capacity(group.entities.len());
            for item in &group.entities {
                let view = if item.entity.label == Label::Material {
                    let summary = material_on_path(conn, &item.entity, subject, &path).await?;
                    CreditedEntityView::Material(summary)
                } else {
                    entity_view(item, subject)
                };
                entities.push(view);
            }

            views.push(CreditGroupView {
                name: group.name.unwrap_or_default(),
                entities,
            });
        }
        Ok(views)
    })
}

fn material_on_path<'a>(
    conn: &'a mut SqliteConnection,
    material: &'a EntityRow,
    subject: Option<&'a str>,
    path: &'a [String],
) -> BoxFuture<'a, Result<MaterialSummary>> {
    Box::pin(async move {
        let sur_material = hierarchy::ancestor_chain(conn, Label::Material, &material.uuid, Some(2)).await?;

        let writing_credits = if path.contains(&material.uuid) {
            Vec::new()
        } else {
            let mut nested = path.to_vec();
            nested.push(material.uuid.clone());
            read_groups_on_path(conn, CreditKind::Writing, &material.uuid, subject, false, nested).await?
        };

        Ok(MaterialSummary {
            model: Label::Material,
            uuid: Some(material.uuid.clone()).filter(|uuid| Some(uuid.as_str()) != subject),
            name: material.name.clone(),
            format: material.format.clone(),
            year: material.year,
            sur_material,
            writing_credits,
        })
    })
}

/// Material with two-level sur-material and recursively resolved writing
/// credits
pub async fn material_summary(
    conn: &mut SqliteConnection,
    material: &EntityRow,
    subject: Option<&str>,
) -> Result<MaterialSummary> {
    material_on_path(conn, material, subject, &[]).await
}

/// Owners crediting `uuid` (directly or as a company member), ordered by
/// start date then name
pub async fn credited_owners(conn: &mut SqliteConnection, kind: CreditKind, uuid: &str) -> Result<Vec<EntityRow>> {
    graph::sources(conn, kind.relationship(), uuid).await
}
