//! Character groups of a material
//!
//! Characters are scoped to the material that declares them: the same name
//! and differentiator in two materials are two characters.

use super::entities::{EntityRow, ENTITY_COLUMNS};
use super::graph::{self, EdgeProps};
use super::replace::{BuildPhase, DeletePhase, ReplaceDriver};
use super::resolver;
use crate::models::views::{CharacterGroupView, CharacterView, Depiction};
use crate::models::{non_blank, CharacterEntry, CharacterGroup};
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::{Row, SqliteConnection};
use tracing::debug;

/// One `HAS_CHARACTER` edge with its character
#[derive(Debug, Clone)]
struct CharacterLink {
    group_name: Option<String>,
    group_position: i64,
    qualifier: Option<String>,
    display_name: Option<String>,
    character: EntityRow,
}

impl CharacterLink {
    fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.character.name)
    }
}

async fn links(conn: &mut SqliteConnection, material: &str) -> Result<Vec<CharacterLink>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT r.group_name, r.group_position, r.qualifier, r.role_name, {}
        FROM relationships r JOIN entities e ON e.uuid = r.target_uuid
        WHERE r.kind = ? AND r.source_uuid = ?
        ORDER BY r.group_position, r.position, r.id
        "#,
        ENTITY_COLUMNS
    ))
    .bind(RelationshipKind::HasCharacter.as_str())
    .bind(material)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(CharacterLink {
                group_name: row.get("group_name"),
                group_position: row.get::<Option<i64>, _>("group_position").unwrap_or_default(),
                qualifier: row.get("qualifier"),
                display_name: row.get("role_name"),
                character: EntityRow::from_row(row)?,
            })
        })
        .collect()
}

/// Split links into runs sharing a group position
fn grouped(links: Vec<CharacterLink>) -> Vec<(Option<String>, Vec<CharacterLink>)> {
    let mut groups: Vec<(i64, Option<String>, Vec<CharacterLink>)> = Vec::new();
    for link in links {
        match groups.last_mut() {
            Some((position, _, members)) if *position == link.group_position => members.push(link),
            _ => groups.push((link.group_position, link.group_name.clone(), vec![link])),
        }
    }
    groups.into_iter().map(|(_, name, links)| (name, links)).collect()
}

pub async fn clear(driver: &mut ReplaceDriver<DeletePhase>, material: &str) -> Result<()> {
    graph::unlink_outgoing(driver.conn(), RelationshipKind::HasCharacter, material).await?;
    Ok(())
}

/// Write character groups; each character resolves within the material
pub async fn write_groups(
    driver: &mut ReplaceDriver<BuildPhase>,
    ids: &dyn IdGenerator,
    material: &str,
    groups: &[CharacterGroup],
) -> Result<()> {
    for (group_position, group) in groups.iter().filter(|g| g.is_writable()).enumerate() {
        let named = group.characters.iter().filter(|c| !c.name.is_empty());
        for (position, entry) in named.enumerate() {
            let character = resolver::resolve(
                driver.conn(),
                ids,
                Label::Character,
                material,
                entry.character_name(),
                &entry.differentiator,
            )
            .await?;

            let props = EdgeProps {
                position: Some(position as i64),
                group_position: Some(group_position as i64),
                group_name: non_blank(&group.name).map(str::to_string),
                qualifier: non_blank(&entry.qualifier).map(str::to_string),
                role_name: entry.display_name().map(str::to_string),
                ..Default::default()
            };
            graph::link(driver.conn(), RelationshipKind::HasCharacter, material, &character.uuid, &props).await?;
        }
    }
    Ok(())
}

/// Delete characters of `material` that its groups no longer list
pub async fn prune_unlisted(driver: &mut ReplaceDriver<BuildPhase>, material: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM entities
        WHERE label = ? AND scope_uuid = ? AND uuid NOT IN (
            SELECT target_uuid FROM relationships WHERE kind = ? AND source_uuid = ?
        )
        "#,
    )
    .bind(Label::Character.as_str())
    .bind(material)
    .bind(RelationshipKind::HasCharacter.as_str())
    .bind(material)
    .execute(driver.conn())
    .await?;

    let pruned = result.rows_affected();
    if pruned > 0 {
        debug!(material, pruned, "Deleted characters dropped from material");
    }
    Ok(pruned)
}

pub async fn read_groups(conn: &mut SqliteConnection, material: &str) -> Result<Vec<CharacterGroupView>> {
    Ok(grouped(links(conn, material).await?)
        .into_iter()
        .map(|(name, links)| CharacterGroupView {
            name,
            characters: links
                .iter()
                .map(|link| CharacterView {
                    model: Label::Character,
                    uuid: link.character.uuid.clone(),
                    name: link.name().to_string(),
                    underlying_name: link.display_name.as_ref().map(|_| link.character.name.clone()),
                    differentiator: link.character.differentiator.clone(),
                    qualifier: link.qualifier.clone(),
                })
                .collect(),
        })
        .collect())
}

pub async fn read_form_groups(conn: &mut SqliteConnection, material: &str) -> Result<Vec<CharacterGroup>> {
    Ok(grouped(links(conn, material).await?)
        .into_iter()
        .map(|(name, links)| CharacterGroup {
            name: name.unwrap_or_default(),
            characters: links
                .iter()
                .map(|link| CharacterEntry {
                    name: link.name().to_string(),
                    underlying_name: link
                        .display_name
                        .as_ref()
                        .map(|_| link.character.name.clone())
                        .unwrap_or_default(),
                    differentiator: link.character.differentiator.clone(),
                    qualifier: link.qualifier.clone().unwrap_or_default(),
                })
                .collect(),
        })
        .collect())
}

/// How `material` presents the character, in group order
pub async fn depictions(conn: &mut SqliteConnection, material: &str, character: &str) -> Result<Vec<Depiction>> {
    Ok(links(conn, material)
        .await?
        .into_iter()
        .filter(|link| link.character.uuid == character)
        .map(|link| Depiction {
            display_name: link.display_name,
            qualifier: link.qualifier,
            group: link.group_name,
        })
        .collect())
}
