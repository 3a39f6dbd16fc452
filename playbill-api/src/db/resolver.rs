//! Uniqueness resolver
//!
//! Maps a `(label, scope, name, differentiator)` candidate onto an existing
//! node or allocates a new one. A match is returned untouched: merging into
//! an existing node never rewrites its attributes.

use super::entities;
use playbill_common::{IdGenerator, Label, Result};
use sqlx::SqliteConnection;
use tracing::debug;

/// Outcome of resolving a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub uuid: String,
    pub is_new: bool,
}

/// Existing node with this identity
pub async fn find(
    conn: &mut SqliteConnection,
    label: Label,
    scope_uuid: &str,
    name: &str,
    differentiator: &str,
) -> Result<Option<String>> {
    let uuid = sqlx::query_scalar(
        r#"
        SELECT uuid FROM entities
        WHERE label = ? AND scope_uuid = ? AND name = ? AND differentiator = ?
        ORDER BY created_at, uuid
        LIMIT 1
        "#,
    )
    .bind(label.as_str())
    .bind(scope_uuid)
    .bind(name)
    .bind(differentiator.trim())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(uuid)
}

/// Find or create the node for a candidate
///
/// Labels without an identity constraint (productions, ceremony categories)
/// always get a new node.
pub async fn resolve(
    conn: &mut SqliteConnection,
    ids: &dyn IdGenerator,
    label: Label,
    scope_uuid: &str,
    name: &str,
    differentiator: &str,
) -> Result<Resolved> {
    let differentiator = differentiator.trim();

    if label.is_identity_constrained() {
        if let Some(uuid) = find(conn, label, scope_uuid, name, differentiator).await? {
            return Ok(Resolved { uuid, is_new: false });
        }
    }

    let uuid = ids.generate().to_string();
    entities::insert(conn, &uuid, label, scope_uuid, name, differentiator).await?;
    debug!(%label, %uuid, name, "Allocated entity");

    Ok(Resolved { uuid, is_new: true })
}

/// Entity other than `excluding` that already holds this identity
pub async fn find_conflict(
    conn: &mut SqliteConnection,
    label: Label,
    scope_uuid: &str,
    name: &str,
    differentiator: &str,
    excluding: Option<&str>,
) -> Result<Option<String>> {
    if !label.is_identity_constrained() {
        return Ok(None);
    }

    let existing = find(conn, label, scope_uuid, name, differentiator).await?;
    Ok(existing.filter(|uuid| Some(uuid.as_str()) != excluding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbill_common::db::connect_in_memory;
    use playbill_common::SequentialIds;

    #[tokio::test]
    async fn test_resolve_merges_on_identity() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ids = SequentialIds::new();

        let first = resolve(&mut conn, &ids, Label::Person, "", "Paul Hunter", "").await.unwrap();
        let second = resolve(&mut conn, &ids, Label::Person, "", "Paul Hunter", " ").await.unwrap();
        let other = resolve(&mut conn, &ids, Label::Person, "", "Paul Hunter", "1").await.unwrap();

        assert!(first.is_new);
        assert_eq!(second, Resolved { uuid: first.uuid.clone(), is_new: false });
        assert!(other.is_new);
        assert_ne!(other.uuid, first.uuid);
    }

    #[tokio::test]
    async fn test_scope_separates_identities() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ids = SequentialIds::new();

        let in_first = resolve(&mut conn, &ids, Label::Character, "m1", "Demetrius", "").await.unwrap();
        let in_second = resolve(&mut conn, &ids, Label::Character, "m2", "Demetrius", "").await.unwrap();
        assert_ne!(in_first.uuid, in_second.uuid);
    }

    #[tokio::test]
    async fn test_productions_are_never_merged() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ids = SequentialIds::new();

        let first = resolve(&mut conn, &ids, Label::Production, "", "Hamlet", "").await.unwrap();
        let second = resolve(&mut conn, &ids, Label::Production, "", "Hamlet", "").await.unwrap();
        assert_ne!(first.uuid, second.uuid);
    }

    #[tokio::test]
    async fn test_find_conflict_excludes_subject() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ids = SequentialIds::new();
        let venue = resolve(&mut conn, &ids, Label::Venue, "", "Almeida Theatre", "").await.unwrap();

        let conflict = find_conflict(&mut conn, Label::Venue, "", "Almeida Theatre", "", None).await.unwrap();
        assert_eq!(conflict.as_deref(), Some(venue.uuid.as_str()));

        let conflict = find_conflict(&mut conn, Label::Venue, "", "Almeida Theatre", "", Some(&venue.uuid))
            .await
            .unwrap();
        assert_eq!(conflict, None);
    }
}
