//! Database initialization
//!
//! Creates the property-graph tables: `entities` holds labelled nodes,
//! `relationships` holds typed, directed edges carrying position and role
//! properties. Every statement is idempotent so startup can run it against an
//! existing database.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys and busy timeout are per-connection settings, so they go
    // on the connect options rather than through PRAGMA on one connection.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
///
/// One connection only: every SQLite `:memory:` connection is its own
/// database, and the connection must never be recycled.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_entities_table(pool).await?;
    create_relationships_table(pool).await?;
    Ok(())
}

/// Create the entities (node) table
///
/// `differentiator` and `scope_uuid` are NOT NULL with `''` defaults so they
/// can take part in the identity index: SQLite treats NULLs as distinct in
/// unique indexes.
pub async fn create_entities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entities (
            uuid TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            name TEXT NOT NULL,
            differentiator TEXT NOT NULL DEFAULT '',
            scope_uuid TEXT NOT NULL DEFAULT '',
            format TEXT,
            year INTEGER,
            start_date TEXT,
            press_date TEXT,
            end_date TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_entities_identity
        ON entities (label, scope_uuid, name, differentiator)
        WHERE label NOT IN ('PRODUCTION', 'AWARD_CEREMONY_CATEGORY')
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entities_label ON entities (label, name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the relationships (edge) table
///
/// Company member rows of a credit point at the member person and name the
/// credited company in `credited_company_uuid`; they go with the company.
pub async fn create_relationships_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS relationships (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            source_uuid TEXT NOT NULL REFERENCES entities(uuid) ON DELETE CASCADE,
            target_uuid TEXT NOT NULL REFERENCES entities(uuid) ON DELETE CASCADE,
            position INTEGER,
            group_position INTEGER,
            entity_position INTEGER,
            member_position INTEGER,
            group_name TEXT,
            credited_company_uuid TEXT REFERENCES entities(uuid) ON DELETE CASCADE,
            qualifier TEXT,
            is_alternate INTEGER,
            is_winner INTEGER,
            role_name TEXT,
            role_position INTEGER,
            character_name TEXT,
            character_differentiator TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships (source_uuid, kind)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships (target_uuid, kind)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_names(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_schema() {
        let pool = connect_in_memory().await.expect("in-memory database");
        assert_eq!(table_names(&pool).await, vec!["entities", "relationships"]);
    }

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        create_schema(&pool).await.expect("second run must succeed");
    }

    #[tokio::test]
    async fn test_identity_index_rejects_duplicates() {
        let pool = connect_in_memory().await.unwrap();

        sqlx::query("INSERT INTO entities (uuid, label, name) VALUES ('a', 'PERSON', 'Ian McKellen')")
            .execute(&pool)
            .await
            .unwrap();

        let duplicate = sqlx::query(
            "INSERT INTO entities (uuid, label, name) VALUES ('b', 'PERSON', 'Ian McKellen')",
        )
        .execute(&pool)
        .await;
        assert!(duplicate.is_err());

        sqlx::query(
            "INSERT INTO entities (uuid, label, name, differentiator) VALUES ('c', 'PERSON', 'Ian McKellen', '1')",
        )
        .execute(&pool)
        .await
        .expect("differentiated duplicate is allowed");

        // Productions are exempt from the identity index
        for uuid in ["p1", "p2"] {
            sqlx::query("INSERT INTO entities (uuid, label, name) VALUES (?, 'PRODUCTION', 'Hamlet')")
                .bind(uuid)
                .execute(&pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_relationships_cascade_on_entity_delete() {
        let pool = connect_in_memory().await.unwrap();

        sqlx::query("INSERT INTO entities (uuid, label, name) VALUES ('v1', 'VENUE', 'National Theatre')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO entities (uuid, label, name) VALUES ('v2', 'VENUE', 'Olivier Theatre')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO relationships (kind, source_uuid, target_uuid, position) VALUES ('SUB_OF', 'v2', 'v1', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM entities WHERE uuid = 'v1'")
            .execute(&pool)
            .await
            .unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM relationships")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_member_credits_cascade_on_company_delete() {
        let pool = connect_in_memory().await.unwrap();

        for (uuid, label, name) in [
            ("m", "MATERIAL", "A Disappearing Number"),
            ("c", "COMPANY", "Complicité"),
            ("p", "PERSON", "Simon McBurney"),
        ] {
            sqlx::query("INSERT INTO entities (uuid, label, name) VALUES (?, ?, ?)")
                .bind(uuid)
                .bind(label)
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }
        sqlx::query(
            "INSERT INTO relationships (kind, source_uuid, target_uuid, group_position, entity_position) \
             VALUES ('WRITING_CREDIT', 'm', 'c', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO relationships \
             (kind, source_uuid, target_uuid, group_position, entity_position, member_position, credited_company_uuid) \
             VALUES ('WRITING_CREDIT', 'm', 'p', 0, 0, 0, 'c')",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM entities WHERE uuid = 'c'")
            .execute(&pool)
            .await
            .unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM relationships")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_file_database_bootstrap() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("playbill.db");

        let pool = init_database(&db_path).await.expect("file database");
        assert!(db_path.exists());
        assert_eq!(table_names(&pool).await, vec!["entities", "relationships"]);
        pool.close().await;

        // Reopening an existing database runs the idempotent schema again
        let pool = init_database(&db_path).await.expect("reopen");
        pool.close().await;
    }
}
