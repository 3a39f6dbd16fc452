//! Sur-/sub-item hierarchies for materials, productions and venues
//!
//! `SUB_OF` edges point child → parent and form a forest: every node has at
//! most one parent. Walks upward are iterative and stop at a node already
//! visited, so a corrupted store cannot loop them.

use super::entities::{self, EntityRow, ENTITY_COLUMNS};
use super::graph::{self, EdgeProps};
use super::replace::{BuildPhase, DeletePhase, ReplaceDriver};
use crate::models::validation::{
    DuplicateTracker, ValidationErrors, ANCESTOR_SUB_ITEM, DUPLICATE_IN_GROUP, SELF_SUB_ITEM,
    UNKNOWN_SUB_ITEM,
};
use crate::models::views::{sub_key, Ancestor};
use crate::models::SubItemRef;
use playbill_common::{Label, RelationshipKind, Result};
use sqlx::{Row, SqliteConnection};
use std::collections::HashSet;
use tracing::{debug, warn};

pub async fn parent(conn: &mut SqliteConnection, uuid: &str) -> Result<Option<EntityRow>> {
    graph::single_target(conn, RelationshipKind::SubOf, uuid).await
}

/// Ancestors of `uuid`, nearest first
pub async fn ancestors(conn: &mut SqliteConnection, uuid: &str) -> Result<Vec<EntityRow>> {
    let mut visited = HashSet::from([uuid.to_string()]);
    let mut chain = Vec::new();
    let mut current = uuid.to_string();

    while let Some(next) = parent(conn, &current).await? {
        if !visited.insert(next.uuid.clone()) {
            warn!(uuid, "SUB_OF cycle found while walking ancestors");
            break;
        }
        current = next.uuid.clone();
        chain.push(next);
    }

    Ok(chain)
}

/// Nested sur-item chain; `depth` limits the levels rendered
pub async fn ancestor_chain(
    conn: &mut SqliteConnection,
    label: Label,
    uuid: &str,
    depth: Option<usize>,
) -> Result<Option<Ancestor>> {
    let links: Vec<_> = ancestors(conn, uuid).await?.iter().map(EntityRow::to_ref).collect();
    Ok(Ancestor::chain(label, &links, depth))
}

/// Sub-items in position order
pub async fn children(conn: &mut SqliteConnection, uuid: &str) -> Result<Vec<EntityRow>> {
    graph::sources_by_position(conn, RelationshipKind::SubOf, uuid).await
}

/// Sources of `kind` edges pointing at `parent` or one of its direct
/// sub-items, with the uuid each edge points at
pub async fn sources_within(
    conn: &mut SqliteConnection,
    kind: RelationshipKind,
    parent: &str,
) -> Result<Vec<(EntityRow, String)>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}, r.target_uuid
        FROM relationships r JOIN entities e ON e.uuid = r.source_uuid
        WHERE r.kind = ? AND (
            r.target_uuid = ?
            OR r.target_uuid IN (SELECT source_uuid FROM relationships WHERE kind = 'SUB_OF' AND target_uuid = ?)
        )
        ORDER BY e.start_date, e.name, e.uuid
        "#,
        ENTITY_COLUMNS
    ))
    .bind(kind.as_str())
    .bind(parent)
    .bind(parent)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| Ok((EntityRow::from_row(row)?, row.get("target_uuid"))))
        .collect()
}

/// Check submitted sub-items of `subject` (`None` while creating)
///
/// Each reference must name an existing entity of the same label that is
/// neither the subject, a repeat within the list, nor an ancestor of the
/// subject.
pub async fn validate_sub_items(
    conn: &mut SqliteConnection,
    label: Label,
    subject: Option<&str>,
    items: &[SubItemRef],
    errors: &mut ValidationErrors,
) -> Result<()> {
    let ancestor_uuids: HashSet<String> = match subject {
        Some(uuid) => ancestors(conn, uuid).await?.into_iter().map(|a| a.uuid).collect(),
        None => HashSet::new(),
    };

    let mut seen = DuplicateTracker::default();
    for (index, item) in items.iter().enumerate() {
        if item.is_blank() {
            continue;
        }
        let field = format!("{}[{}].uuid", sub_key(label), index);

        if Some(item.uuid.as_str()) == subject {
            errors.add(field, SELF_SUB_ITEM);
            continue;
        }

        match entities::fetch(conn, &item.uuid).await? {
            Some(entity) if entity.label == label => {}
            _ => {
                errors.add(field, UNKNOWN_SUB_ITEM);
                continue;
            }
        }

        if seen.check([&item.uuid]) {
            errors.add(field, DUPLICATE_IN_GROUP);
        } else if ancestor_uuids.contains(&item.uuid) {
            warn!(%label, uuid = %item.uuid, subject = ?subject, "Rejected sub-item that is an ancestor of its parent");
            errors.add(field, ANCESTOR_SUB_ITEM);
        }
    }

    Ok(())
}

/// Detach `parent` from its current children and `children` from their
/// current parents
pub async fn clear(driver: &mut ReplaceDriver<DeletePhase>, parent: &str, children: &[SubItemRef]) -> Result<()> {
    graph::unlink_incoming(driver.conn(), RelationshipKind::SubOf, parent).await?;
    for child in children.iter().filter(|c| !c.is_blank()) {
        graph::unlink_outgoing(driver.conn(), RelationshipKind::SubOf, &child.uuid).await?;
    }
    Ok(())
}

/// Attach children to `parent` with dense positions
pub async fn attach(driver: &mut ReplaceDriver<BuildPhase>, parent: &str, children: &[SubItemRef]) -> Result<()> {
    for (position, child) in children.iter().filter(|c| !c.is_blank()).enumerate() {
        graph::link(driver.conn(), RelationshipKind::SubOf, &child.uuid, parent, &EdgeProps::at(position)).await?;
        debug!(parent, child = %child.uuid, position, "Attached sub-item");
    }
    Ok(())
}

/// Sub-item references for an edit form
pub async fn form_children(conn: &mut SqliteConnection, parent: &str) -> Result<Vec<SubItemRef>> {
    Ok(children(conn, parent)
        .await?
        .into_iter()
        .map(|child| SubItemRef {
            uuid: child.uuid,
            name: child.name,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbill_common::db::connect_in_memory;
    use sqlx::SqlitePool;

    async fn seed(pool: &SqlitePool, uuids: &[&str]) {
        let mut conn = pool.acquire().await.unwrap();
        for uuid in uuids {
            entities::insert(&mut conn, uuid, Label::Material, "", &format!("Material {}", uuid), "")
                .await
                .unwrap();
        }
    }

    async fn set_children(pool: &SqlitePool, parent: &str, children: &[&str]) {
        let items: Vec<SubItemRef> = children.iter().map(|c| SubItemRef::new(*c)).collect();
        let mut driver = ReplaceDriver::begin(pool).await.unwrap();
        clear(&mut driver, parent, &items).await.unwrap();
        let mut driver = driver.build();
        attach(&mut driver, parent, &items).await.unwrap();
        driver.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_children_keep_submitted_order() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool, &["p", "a", "b", "c"]).await;
        set_children(&pool, "p", &["c", "a", "b"]).await;

        let mut conn = pool.acquire().await.unwrap();
        let order: Vec<String> = children(&mut conn, "p").await.unwrap().into_iter().map(|c| c.uuid).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_reassigning_child_moves_it() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool, &["p1", "p2", "c"]).await;
        set_children(&pool, "p1", &["c"]).await;
        set_children(&pool, "p2", &["c"]).await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(children(&mut conn, "p1").await.unwrap().is_empty());
        assert_eq!(parent(&mut conn, "c").await.unwrap().unwrap().uuid, "p2");
    }

    #[tokio::test]
    async fn test_ancestors_nearest_first() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool, &["root", "mid", "leaf"]).await;
        set_children(&pool, "root", &["mid"]).await;
        set_children(&pool, "mid", &["leaf"]).await;

        let mut conn = pool.acquire().await.unwrap();
        let chain: Vec<String> = ancestors(&mut conn, "leaf").await.unwrap().into_iter().map(|a| a.uuid).collect();
        assert_eq!(chain, vec!["mid", "root"]);
    }

    #[tokio::test]
    async fn test_validation_rejects_cycles_and_unknowns() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool, &["root", "mid", "leaf"]).await;
        set_children(&pool, "root", &["mid"]).await;
        set_children(&pool, "mid", &["leaf"]).await;

        let mut conn = pool.acquire().await.unwrap();
        let items = vec![
            SubItemRef::new("root"),
            SubItemRef::new("leaf"),
            SubItemRef::new("missing"),
            SubItemRef::new("leaf"),
        ];
        let mut errors = ValidationErrors::new();
        validate_sub_items(&mut conn, Label::Material, Some("leaf"), &items, &mut errors)
            .await
            .unwrap();

        assert_eq!(errors.get("subMaterials[0].uuid").unwrap(), [ANCESTOR_SUB_ITEM.to_string()]);
        assert_eq!(errors.get("subMaterials[1].uuid").unwrap(), [SELF_SUB_ITEM.to_string()]);
        assert_eq!(errors.get("subMaterials[2].uuid").unwrap(), [UNKNOWN_SUB_ITEM.to_string()]);
        assert_eq!(errors.get("subMaterials[3].uuid").unwrap(), [SELF_SUB_ITEM.to_string()]);
    }

    #[tokio::test]
    async fn test_validation_rejects_other_labels_and_duplicates() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool, &["m1", "m2"]).await;
        let mut conn = pool.acquire().await.unwrap();
        entities::insert(&mut conn, "v1", Label::Venue, "", "Old Vic", "").await.unwrap();

        let items = vec![SubItemRef::new("m2"), SubItemRef::new("v1"), SubItemRef::new("m2")];
        let mut errors = ValidationErrors::new();
        validate_sub_items(&mut conn, Label::Material, Some("m1"), &items, &mut errors)
            .await
            .unwrap();

        assert!(errors.get("subMaterials[0].uuid").is_none());
        assert_eq!(errors.get("subMaterials[1].uuid").unwrap(), [UNKNOWN_SUB_ITEM.to_string()]);
        assert_eq!(errors.get("subMaterials[2].uuid").unwrap(), [DUPLICATE_IN_GROUP.to_string()]);
    }

    #[tokio::test]
    async fn test_sources_within_include_direct_children() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        for (uuid, label, name) in [
            ("nt", Label::Venue, "National Theatre"),
            ("olivier", Label::Venue, "Olivier Theatre"),
            ("pr1", Label::Production, "Hamlet"),
            ("pr2", Label::Production, "Macbeth"),
        ] {
            entities::insert(&mut conn, uuid, label, "", name, "").await.unwrap();
        }
        graph::link(&mut conn, RelationshipKind::SubOf, "olivier", "nt", &EdgeProps::at(0)).await.unwrap();
        graph::link(&mut conn, RelationshipKind::PlaysAt, "pr1", "olivier", &EdgeProps::default()).await.unwrap();
        graph::link(&mut conn, RelationshipKind::PlaysAt, "pr2", "nt", &EdgeProps::default()).await.unwrap();

        let found = sources_within(&mut conn, RelationshipKind::PlaysAt, "nt").await.unwrap();
        let pairs: Vec<(&str, &str)> = found.iter().map(|(p, v)| (p.uuid.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("pr1", "olivier"), ("pr2", "nt")]);
    }

    #[tokio::test]
    async fn test_ancestor_chain_depths() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool, &["root", "mid", "leaf"]).await;
        set_children(&pool, "root", &["mid"]).await;
        set_children(&pool, "mid", &["leaf"]).await;

        let mut conn = pool.acquire().await.unwrap();
        let full = ancestor_chain(&mut conn, Label::Material, "leaf", None).await.unwrap().unwrap();
        assert_eq!(full.uuid, "mid");
        let root = full.sur.unwrap();
        assert_eq!(root.uuid, "root");
        assert!(root.sur.is_none() && root.include_sur);

        assert_eq!(ancestor_chain(&mut conn, Label::Material, "root", None).await.unwrap(), None);
    }
}
