//! Person service

use super::{cast_member_productions, check_identity, credited_materials, credited_productions, deleted};
use crate::db::{entities, members, nominations, CreditKind, EntityRow, ReplaceDriver};
use crate::models::views::{DeleteResponse, EntityRef, FormResponse, PersonShow};
use crate::models::PersonForm;
use playbill_common::{IdGenerator, Label, Result};
use sqlx::SqlitePool;
use tracing::info;

pub fn new_form() -> FormResponse<PersonForm> {
    FormResponse::valid(Label::Person, PersonForm::default())
}

/// Create a person directly; people are usually created implicitly by
/// credits and cast lists
pub async fn create(pool: &SqlitePool, ids: &dyn IdGenerator, form: PersonForm) -> Result<FormResponse<PersonForm>> {
    save(pool, ids, None, form).await
}

pub async fn update(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    uuid: &str,
    form: PersonForm,
) -> Result<FormResponse<PersonForm>> {
    save(pool, ids, Some(uuid), form).await
}

async fn save(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    existing: Option<&str>,
    mut form: PersonForm,
) -> Result<FormResponse<PersonForm>> {
    form.normalize();
    form.uuid = existing.map(str::to_string);
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    if let Some(uuid) = existing {
        entities::require(driver.conn(), Label::Person, uuid).await?;
    }
    check_identity(driver.conn(), Label::Person, "", &form.name, &form.differentiator, existing, &mut errors).await?;

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::Person, form, errors));
    }

    let uuid = existing.map_or_else(|| ids.generate().to_string(), str::to_string);
    let mut driver = driver.build();
    if existing.is_some() {
        entities::update_identity(driver.conn(), &uuid, "", &form.name, &form.differentiator).await?;
    } else {
        entities::insert(driver.conn(), &uuid, Label::Person, "", &form.name, &form.differentiator).await?;
    }
    driver.commit().await?;

    info!(uuid = %uuid, label = %Label::Person, created = existing.is_none(), "Saved person");
    edit(pool, &uuid).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<PersonForm>> {
    let mut conn = pool.acquire().await?;
    let person = entities::require(&mut conn, Label::Person, uuid).await?;

    Ok(FormResponse::valid(
        Label::Person,
        PersonForm {
            uuid: Some(person.uuid),
            name: person.name,
            differentiator: person.differentiator,
        },
    ))
}

pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<PersonShow> {
    let mut conn = pool.acquire().await?;
    let person = entities::require(&mut conn, Label::Person, uuid).await?;

    Ok(PersonShow {
        model: Label::Person,
        materials: credited_materials(&mut conn, uuid).await?,
        producer_productions: credited_productions(&mut conn, CreditKind::Producer, uuid).await?,
        creative_productions: credited_productions(&mut conn, CreditKind::Creative, uuid).await?,
        crew_productions: credited_productions(&mut conn, CreditKind::Crew, uuid).await?,
        cast_member_productions: cast_member_productions(&mut conn, uuid).await?,
        companies: members::companies(&mut conn, uuid).await?.iter().map(EntityRow::to_ref).collect(),
        awards: nominations::involving(&mut conn, uuid).await?,
        uuid: person.uuid,
        name: person.name,
        differentiator: person.differentiator,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<EntityRef>> {
    let mut conn = pool.acquire().await?;
    Ok(entities::list(&mut conn, Label::Person).await?.iter().map(EntityRow::to_ref).collect())
}

pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let person = entities::require(driver.conn(), Label::Person, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::Person, "Deleted person");
    Ok(deleted(&person))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::DUPLICATE_IDENTITY;
    use crate::models::{CastMember, CompanyEntity, CreditGroup, CreditedEntity, NamedEntity, ProductionForm, Role};
    use crate::services::productions;
    use playbill_common::db::connect_in_memory;
    use playbill_common::SequentialIds;
    use serde_json::json;

    fn person(name: &str) -> PersonForm {
        PersonForm {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_rename_conflict() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();
        let ian = create(&pool, &ids, person("Ian McKellen")).await.unwrap().form.uuid.unwrap();
        let judi = create(&pool, &ids, person("Judi Dench")).await.unwrap().form.uuid.unwrap();

        let response = update(&pool, &ids, &judi, person("Ian McKellen")).await.unwrap();
        assert!(response.has_errors);
        assert_eq!(response.errors.get("differentiator").unwrap(), [DUPLICATE_IDENTITY.to_string()]);

        let renamed = update(&pool, &ids, &ian, person("Sir Ian McKellen")).await.unwrap();
        assert!(!renamed.has_errors);
        assert_eq!(renamed.form.name, "Sir Ian McKellen");
    }

    #[tokio::test]
    async fn test_show_nullifies_subject() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();

        let form = ProductionForm {
            name: "The Seagull".to_string(),
            creative_credits: vec![
                CreditGroup::new(
                    "Director",
                    vec![CreditedEntity::Company(CompanyEntity {
                        name: "Complicite".to_string(),
                        differentiator: String::new(),
                        members: vec![NamedEntity::new("Katie Mitchell", "")],
                    })],
                ),
                CreditGroup::new("Designer", vec![CreditedEntity::Person(NamedEntity::new("Vicki Mortimer", ""))]),
            ],
            cast: vec![CastMember {
                name: "Katie Mitchell".to_string(),
                differentiator: String::new(),
                roles: vec![Role::new("Masha")],
            }],
            ..Default::default()
        };
        productions::create(&pool, &ids, form).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let katie = crate::db::resolver::find(&mut conn, Label::Person, "", "Katie Mitchell", "")
            .await
            .unwrap()
            .unwrap();
        drop(conn);

        let shown = serde_json::to_value(show(&pool, &katie).await.unwrap()).unwrap();
        let credits = &shown["creativeProductions"][0]["credits"];
        assert_eq!(credits.as_array().unwrap().len(), 1);
        assert_eq!(credits[0]["name"], json!("Director"));
        assert!(credits[0]["entities"][0]["uuid"].is_string());
        assert_eq!(credits[0]["entities"][0]["members"][0]["uuid"], json!(null));
        assert_eq!(shown["castMemberProductions"][0]["roles"][0]["name"], json!("Masha"));
        assert_eq!(shown["producerProductions"], json!([]));
    }
}
