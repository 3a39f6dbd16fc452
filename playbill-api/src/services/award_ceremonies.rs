//! Award ceremony service
//!
//! A ceremony belongs to exactly one award, named on the form and resolved
//! by name and differentiator. Ceremony names are unique per award.

use super::{deleted, named};
use crate::db::graph::{self, EdgeProps};
use crate::db::{entities, nominations, resolver, EntityRow, ReplaceDriver};
use crate::models::validation::DUPLICATE_CEREMONY;
use crate::models::views::{AwardCeremonyShow, CeremonySummary, DeleteResponse, FormResponse};
use crate::models::AwardCeremonyForm;
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

pub fn new_form() -> FormResponse<AwardCeremonyForm> {
    let mut form = AwardCeremonyForm::default();
    form.add_placeholders();
    FormResponse::valid(Label::AwardCeremony, form)
}

pub async fn create(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    form: AwardCeremonyForm,
) -> Result<FormResponse<AwardCeremonyForm>> {
    save(pool, ids, None, form).await
}

pub async fn update(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    uuid: &str,
    form: AwardCeremonyForm,
) -> Result<FormResponse<AwardCeremonyForm>> {
    save(pool, ids, Some(uuid), form).await
}

async fn save(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    existing: Option<&str>,
    mut form: AwardCeremonyForm,
) -> Result<FormResponse<AwardCeremonyForm>> {
    form.normalize();
    form.uuid = existing.map(str::to_string);
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    if let Some(uuid) = existing {
        entities::require(driver.conn(), Label::AwardCeremony, uuid).await?;
    }
    if !form.name.is_empty() && !form.award.name.is_empty() {
        let award = resolver::find(driver.conn(), Label::Award, "", &form.award.name, &form.award.differentiator).await?;
        if let Some(award) = award {
            let conflict =
                resolver::find_conflict(driver.conn(), Label::AwardCeremony, &award, &form.name, "", existing).await?;
            if conflict.is_some() {
                errors.add("name", DUPLICATE_CEREMONY);
            }
        }
    }

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::AwardCeremony, form, errors));
    }

    let uuid = existing.map_or_else(|| ids.generate().to_string(), str::to_string);
    nominations::clear(&mut driver, &uuid).await?;
    graph::detach(&mut driver, &[RelationshipKind::CeremonyOf], &uuid).await?;

    let mut driver = driver.build();
    let award =
        resolver::resolve(driver.conn(), ids, Label::Award, "", &form.award.name, &form.award.differentiator).await?;
    if existing.is_some() {
        entities::update_identity(driver.conn(), &uuid, &award.uuid, &form.name, "").await?;
    } else {
        entities::insert(driver.conn(), &uuid, Label::AwardCeremony, &award.uuid, &form.name, "").await?;
    }
    graph::link(driver.conn(), RelationshipKind::CeremonyOf, &uuid, &award.uuid, &EdgeProps::default()).await?;
    nominations::write(&mut driver, ids, &uuid, &form.categories).await?;
    driver.commit().await?;

    info!(uuid = %uuid, award = %award.uuid, created = existing.is_none(), "Saved award ceremony");
    edit(pool, &uuid).await
}

async fn award_of(conn: &mut SqliteConnection, ceremony: &str) -> Result<Option<EntityRow>> {
    graph::single_target(conn, RelationshipKind::CeremonyOf, ceremony).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<AwardCeremonyForm>> {
    let mut conn = pool.acquire().await?;
    let ceremony = entities::require(&mut conn, Label::AwardCeremony, uuid).await?;

    let mut form = AwardCeremonyForm {
        uuid: Some(ceremony.uuid),
        name: ceremony.name,
        award: named(award_of(&mut conn, uuid).await?),
        categories: nominations::read_form(&mut conn, uuid).await?,
    };
    form.add_placeholders();

    Ok(FormResponse::valid(Label::AwardCeremony, form))
}

pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<AwardCeremonyShow> {
    let mut conn = pool.acquire().await?;
    let ceremony = entities::require(&mut conn, Label::AwardCeremony, uuid).await?;

    Ok(AwardCeremonyShow {
        model: Label::AwardCeremony,
        award: award_of(&mut conn, uuid).await?.as_ref().map(EntityRow::to_ref),
        categories: nominations::read(&mut conn, uuid).await?,
        uuid: ceremony.uuid,
        name: ceremony.name,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<CeremonySummary>> {
    let mut conn = pool.acquire().await?;
    let mut ceremonies = Vec::new();
    for ceremony in entities::list(&mut conn, Label::AwardCeremony).await? {
        ceremonies.push(CeremonySummary {
            model: Label::AwardCeremony,
            award: award_of(&mut conn, &ceremony.uuid).await?.as_ref().map(EntityRow::to_ref),
            uuid: ceremony.uuid,
            name: ceremony.name,
        });
    }
    Ok(ceremonies)
}

pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let ceremony = entities::require(driver.conn(), Label::AwardCeremony, uuid).await?;
    entities::delete_in_scope(driver.conn(), Label::AwardCeremonyCategory, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::AwardCeremony, "Deleted award ceremony");
    Ok(deleted(&ceremony))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CreditedEntity, NamedEntity, Nomination};
    use crate::services::awards;
    use playbill_common::db::connect_in_memory;
    use playbill_common::SequentialIds;

    fn ceremony(name: &str, award: &str) -> AwardCeremonyForm {
        AwardCeremonyForm {
            name: name.to_string(),
            award: NamedEntity::new(award, ""),
            categories: vec![Category {
                name: "Best Revival".to_string(),
                nominations: vec![Nomination {
                    is_winner: true,
                    entities: vec![CreditedEntity::Person(NamedEntity::new("Marianne Elliott", ""))],
                }],
            }],
            ..Default::default()
        }
    }

    async fn count(pool: &SqlitePool, label: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM entities WHERE label = ?")
            .bind(label)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ceremony_names_unique_per_award() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();

        assert!(!create(&pool, &ids, ceremony("2019", "Laurence Olivier Awards")).await.unwrap().has_errors);
        let duplicate = create(&pool, &ids, ceremony("2019", "Laurence Olivier Awards")).await.unwrap();
        assert_eq!(duplicate.errors.get("name").unwrap(), [DUPLICATE_CEREMONY.to_string()]);
        assert!(!create(&pool, &ids, ceremony("2019", "Evening Standard Theatre Awards")).await.unwrap().has_errors);
        assert_eq!(count(&pool, "AWARD").await, 2);
    }

    #[tokio::test]
    async fn test_edit_round_trip() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();

        let response = create(&pool, &ids, ceremony("2019", "Laurence Olivier Awards")).await.unwrap();
        assert_eq!(response.form.award.name, "Laurence Olivier Awards");
        assert_eq!(response.form.categories[0].name, "Best Revival");
        assert!(response.form.categories[0].nominations[0].is_winner);
        assert_eq!(response.form.categories.len(), 2);

        let uuid = response.form.uuid.unwrap();
        let shown = show(&pool, &uuid).await.unwrap();
        assert_eq!(shown.award.unwrap().name, "Laurence Olivier Awards");
        assert_eq!(shown.categories[0].nominations.len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_award_removes_ceremonies() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();

        create(&pool, &ids, ceremony("2019", "Laurence Olivier Awards")).await.unwrap();
        create(&pool, &ids, ceremony("2020", "Laurence Olivier Awards")).await.unwrap();

        let awards = awards::list(&pool).await.unwrap();
        let award = awards[0].uuid.clone().unwrap();
        let shown = awards::show(&pool, &award).await.unwrap();
        let names: Vec<&str> = shown.ceremonies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["2020", "2019"]);

        awards::delete(&pool, &award).await.unwrap();
        assert_eq!(count(&pool, "AWARD_CEREMONY").await, 0);
        assert_eq!(count(&pool, "AWARD_CEREMONY_CATEGORY").await, 0);
        assert_eq!(count(&pool, "PERSON").await, 1);
    }
}
