//! Entity (node) persistence

use crate::models::views::EntityRef;
use playbill_common::{Error, Label, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

/// Stored node
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub uuid: String,
    pub label: Label,
    pub name: String,
    pub differentiator: String,
    pub scope_uuid: String,
    pub format: Option<String>,
    pub year: Option<i64>,
    pub start_date: Option<String>,
    pub press_date: Option<String>,
    pub end_date: Option<String>,
}

pub(crate) const ENTITY_COLUMNS: &str = "e.uuid, e.label, e.name, e.differentiator, e.scope_uuid, \
     e.format, e.year, e.start_date, e.press_date, e.end_date";

impl EntityRow {
    /// Read the columns selected by [`ENTITY_COLUMNS`]
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let label: String = row.get("label");
        Ok(Self {
            uuid: row.get("uuid"),
            label: label.parse()?,
            name: row.get("name"),
            differentiator: row.get("differentiator"),
            scope_uuid: row.get("scope_uuid"),
            format: row.get("format"),
            year: row.get("year"),
            start_date: row.get("start_date"),
            press_date: row.get("press_date"),
            end_date: row.get("end_date"),
        })
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef::new(self.label, &self.uuid, &self.name)
    }
}

pub(crate) fn rows(rows: Vec<SqliteRow>) -> Result<Vec<EntityRow>> {
    rows.iter().map(EntityRow::from_row).collect()
}

/// Load an entity of any label
pub async fn fetch(conn: &mut SqliteConnection, uuid: &str) -> Result<Option<EntityRow>> {
    let row = sqlx::query(&format!("SELECT {} FROM entities e WHERE e.uuid = ?", ENTITY_COLUMNS))
        .bind(uuid)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(EntityRow::from_row).transpose()
}

/// Load an entity, failing with not-found when missing or of another label
pub async fn require(conn: &mut SqliteConnection, label: Label, uuid: &str) -> Result<EntityRow> {
    match fetch(conn, uuid).await? {
        Some(entity) if entity.label == label => Ok(entity),
        _ => Err(Error::not_found(label, uuid)),
    }
}

pub async fn insert(
    conn: &mut SqliteConnection,
    uuid: &str,
    label: Label,
    scope_uuid: &str,
    name: &str,
    differentiator: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO entities (uuid, label, name, differentiator, scope_uuid)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid)
    .bind(label.as_str())
    .bind(name)
    .bind(differentiator)
    .bind(scope_uuid)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Rename an entity, optionally moving it to another scope
pub async fn update_identity(
    conn: &mut SqliteConnection,
    uuid: &str,
    scope_uuid: &str,
    name: &str,
    differentiator: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE entities
        SET name = ?, differentiator = ?, scope_uuid = ?, updated_at = CURRENT_TIMESTAMP
        WHERE uuid = ?
        "#,
    )
    .bind(name)
    .bind(differentiator)
    .bind(scope_uuid)
    .bind(uuid)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn set_material_attributes(
    conn: &mut SqliteConnection,
    uuid: &str,
    format: Option<&str>,
    year: Option<i64>,
) -> Result<()> {
    sqlx::query("UPDATE entities SET format = ?, year = ? WHERE uuid = ?")
        .bind(format)
        .bind(year)
        .bind(uuid)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn set_production_dates(
    conn: &mut SqliteConnection,
    uuid: &str,
    start_date: Option<&str>,
    press_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE entities SET start_date = ?, press_date = ?, end_date = ? WHERE uuid = ?")
        .bind(start_date)
        .bind(press_date)
        .bind(end_date)
        .bind(uuid)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// All entities of a label in list order
///
/// Productions order by start date, ceremonies by name descending, all
/// others by name and differentiator.
pub async fn list(conn: &mut SqliteConnection, label: Label) -> Result<Vec<EntityRow>> {
    let order = match label {
        Label::Production => "e.start_date, e.name, e.uuid",
        Label::AwardCeremony => "e.name DESC, e.uuid",
        _ => "e.name, e.differentiator, e.uuid",
    };

    let result = sqlx::query(&format!(
        "SELECT {} FROM entities e WHERE e.label = ? ORDER BY {}",
        ENTITY_COLUMNS, order
    ))
    .bind(label.as_str())
    .fetch_all(&mut *conn)
    .await?;

    rows(result)
}

/// Entities of a label within a scope (characters of a material, ceremonies
/// of an award)
pub async fn list_in_scope(
    conn: &mut SqliteConnection,
    label: Label,
    scope_uuid: &str,
) -> Result<Vec<EntityRow>> {
    let result = sqlx::query(&format!(
        "SELECT {} FROM entities e WHERE e.label = ? AND e.scope_uuid = ? ORDER BY e.name DESC, e.uuid",
        ENTITY_COLUMNS
    ))
    .bind(label.as_str())
    .bind(scope_uuid)
    .fetch_all(&mut *conn)
    .await?;

    rows(result)
}

/// Delete a node; its relationships cascade
pub async fn delete(conn: &mut SqliteConnection, uuid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM entities WHERE uuid = ?")
        .bind(uuid)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every node of a label within a scope
pub async fn delete_in_scope(conn: &mut SqliteConnection, label: Label, scope_uuid: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM entities WHERE label = ? AND scope_uuid = ?")
        .bind(label.as_str())
        .bind(scope_uuid)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbill_common::db::connect_in_memory;

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        insert(&mut conn, "m1", Label::Material, "", "Hamlet", "").await.unwrap();
        set_material_attributes(&mut conn, "m1", Some("play"), Some(1603)).await.unwrap();

        let entity = fetch(&mut conn, "m1").await.unwrap().unwrap();
        assert_eq!(entity.label, Label::Material);
        assert_eq!(entity.format.as_deref(), Some("play"));
        assert_eq!(entity.year, Some(1603));
        assert_eq!(fetch(&mut conn, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_require_checks_label() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        insert(&mut conn, "p1", Label::Person, "", "Judi Dench", "").await.unwrap();

        assert!(require(&mut conn, Label::Person, "p1").await.is_ok());
        assert!(matches!(
            require(&mut conn, Label::Venue, "p1").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            require(&mut conn, Label::Person, "not-a-uuid").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_by_name_then_differentiator() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        insert(&mut conn, "a", Label::Person, "", "Ian McKellen", "1").await.unwrap();
        insert(&mut conn, "b", Label::Person, "", "Ian McKellen", "").await.unwrap();
        insert(&mut conn, "c", Label::Person, "", "Helen Mirren", "").await.unwrap();
        insert(&mut conn, "d", Label::Venue, "", "Almeida Theatre", "").await.unwrap();

        let uuids: Vec<String> = list(&mut conn, Label::Person)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.uuid)
            .collect();
        assert_eq!(uuids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_delete_in_scope() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        insert(&mut conn, "m1", Label::Material, "", "Hamlet", "").await.unwrap();
        insert(&mut conn, "c1", Label::Character, "m1", "Ophelia", "").await.unwrap();
        insert(&mut conn, "c2", Label::Character, "m2", "Ophelia", "").await.unwrap();

        assert_eq!(delete_in_scope(&mut conn, Label::Character, "m1").await.unwrap(), 1);
        assert!(fetch(&mut conn, "c2").await.unwrap().is_some());
    }
}
