//! Relationship (edge) persistence

use super::entities::{self, EntityRow, ENTITY_COLUMNS};
use super::replace::{DeletePhase, ReplaceDriver};
use playbill_common::{RelationshipKind, Result};
use sqlx::SqliteConnection;

/// Properties stored on an edge; unset properties are NULL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeProps {
    pub position: Option<i64>,
    pub group_position: Option<i64>,
    pub entity_position: Option<i64>,
    pub member_position: Option<i64>,
    pub group_name: Option<String>,
    pub credited_company_uuid: Option<String>,
    pub qualifier: Option<String>,
    pub is_alternate: Option<bool>,
    pub is_winner: Option<bool>,
    pub role_name: Option<String>,
    pub role_position: Option<i64>,
    pub character_name: Option<String>,
    pub character_differentiator: Option<String>,
}

impl EdgeProps {
    pub fn at(position: usize) -> Self {
        Self {
            position: Some(position as i64),
            ..Default::default()
        }
    }
}

pub async fn link(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    source_uuid: &str,
    target_uuid: &str,
    props: &EdgeProps,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO relationships (
            kind, source_uuid, target_uuid, position, group_position, entity_position,
            member_position, group_name, credited_company_uuid, qualifier, is_alternate,
            is_winner, role_name, role_position, character_name, character_differentiator
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(kind.as_str())
    .bind(source_uuid)
    .bind(target_uuid)
    .bind(props.position)
    .bind(props.group_position)
    .bind(props.entity_position)
    .bind(props.member_position)
    .bind(&props.group_name)
    .bind(&props.credited_company_uuid)
    .bind(&props.qualifier)
    .bind(props.is_alternate)
    .bind(props.is_winner)
    .bind(&props.role_name)
    .bind(props.role_position)
    .bind(&props.character_name)
    .bind(&props.character_differentiator)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Remove all outgoing edges of a kind
pub async fn unlink_outgoing(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    source_uuid: &str,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM relationships WHERE kind = ? AND source_uuid = ?")
        .bind(kind.as_str())
        .bind(source_uuid)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Drop the outgoing to-one links of `source_uuid` ahead of a rebuild
pub async fn detach(
    driver: &mut ReplaceDriver<DeletePhase>,
    kinds: &[RelationshipKind],
    source_uuid: &str,
) -> Result<()> {
    for &kind in kinds {
        unlink_outgoing(driver.conn(), kind, source_uuid).await?;
    }
    Ok(())
}

/// Remove all incoming edges of a kind
pub async fn unlink_incoming(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    target_uuid: &str,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM relationships WHERE kind = ? AND target_uuid = ?")
        .bind(kind.as_str())
        .bind(target_uuid)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Target of a to-one relationship (production → material, child → parent)
pub async fn single_target(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    source_uuid: &str,
) -> Result<Option<EntityRow>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM relationships r JOIN entities e ON e.uuid = r.target_uuid
        WHERE r.kind = ? AND r.source_uuid = ?
        ORDER BY r.id
        LIMIT 1
        "#,
        ENTITY_COLUMNS
    ))
    .bind(kind.as_str())
    .bind(source_uuid)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(EntityRow::from_row).transpose()
}

/// Targets of outgoing edges in position order
pub async fn targets(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    source_uuid: &str,
) -> Result<Vec<EntityRow>> {
    let result = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM relationships r JOIN entities e ON e.uuid = r.target_uuid
        WHERE r.kind = ? AND r.source_uuid = ?
        ORDER BY r.position, r.id
        "#,
        ENTITY_COLUMNS
    ))
    .bind(kind.as_str())
    .bind(source_uuid)
    .fetch_all(&mut *conn)
    .await?;

    entities::rows(result)
}

/// Distinct sources of incoming edges, ordered as listed entities
pub async fn sources(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    target_uuid: &str,
) -> Result<Vec<EntityRow>> {
    let result = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM entities e
        WHERE e.uuid IN (
            SELECT source_uuid FROM relationships WHERE kind = ? AND target_uuid = ?
        )
        ORDER BY e.start_date, e.name, e.differentiator, e.uuid
        "#,
        ENTITY_COLUMNS
    ))
    .bind(kind.as_str())
    .bind(target_uuid)
    .fetch_all(&mut *conn)
    .await?;

    entities::rows(result)
}

/// Sources of incoming edges in edge position order (sub-items of a parent)
pub async fn sources_by_position(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    target_uuid: &str,
) -> Result<Vec<EntityRow>> {
    let result = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM relationships r JOIN entities e ON e.uuid = r.source_uuid
        WHERE r.kind = ? AND r.target_uuid = ?
        ORDER BY r.position, r.id
        "#,
        ENTITY_COLUMNS
    ))
    .bind(kind.as_str())
    .bind(target_uuid)
    .fetch_all(&mut *conn)
    .await?;

    entities::rows(result)
}
