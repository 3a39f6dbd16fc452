//! Company service

use super::{check_identity, credited_materials, credited_productions, deleted};
use crate::db::{entities, members, nominations, CreditKind, EntityRow, ReplaceDriver};
use crate::models::views::{CompanyShow, DeleteResponse, EntityRef, FormResponse};
use crate::models::{CompanyForm, NamedEntity};
use playbill_common::{IdGenerator, Label, Result};
use sqlx::SqlitePool;
use tracing::info;

pub fn new_form() -> FormResponse<CompanyForm> {
    let mut form = CompanyForm::default();
    form.add_placeholders();
    FormResponse::valid(Label::Company, form)
}

pub async fn create(pool: &SqlitePool, ids: &dyn IdGenerator, form: CompanyForm) -> Result<FormResponse<CompanyForm>> {
    save(pool, ids, None, form).await
}

pub async fn update(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    uuid: &str,
    form: CompanyForm,
) -> Result<FormResponse<CompanyForm>> {
    save(pool, ids, Some(uuid), form).await
}

async fn save(
    pool: &SqlitePool,
    ids: &dyn IdGenerator,
    existing: Option<&str>,
    mut form: CompanyForm,
) -> Result<FormResponse<CompanyForm>> {
    form.normalize();
    form.uuid = existing.map(str::to_string);
    let mut errors = form.validate();

    let mut driver = ReplaceDriver::begin(pool).await?;
    if let Some(uuid) = existing {
        entities::require(driver.conn(), Label::Company, uuid).await?;
    }
    check_identity(driver.conn(), Label::Company, "", &form.name, &form.differentiator, existing, &mut errors)
        .await?;

    if !errors.is_empty() {
        driver.rollback().await?;
        return Ok(FormResponse::invalid(Label::Company, form, errors));
    }

    let uuid = existing.map_or_else(|| ids.generate().to_string(), str::to_string);
    members::clear(&mut driver, &uuid).await?;

    let mut driver = driver.build();
    if existing.is_some() {
        entities::update_identity(driver.conn(), &uuid, "", &form.name, &form.differentiator).await?;
    } else {
        entities::insert(driver.conn(), &uuid, Label::Company, "", &form.name, &form.differentiator).await?;
    }
    members::write(&mut driver, ids, &uuid, &form.members).await?;
    driver.commit().await?;

    info!(uuid = %uuid, label = %Label::Company, created = existing.is_none(), "Saved company");
    edit(pool, &uuid).await
}

pub async fn edit(pool: &SqlitePool, uuid: &str) -> Result<FormResponse<CompanyForm>> {
    let mut conn = pool.acquire().await?;
    let company = entities::require(&mut conn, Label::Company, uuid).await?;

    let mut form = CompanyForm {
        uuid: Some(company.uuid),
        name: company.name,
        differentiator: company.differentiator,
        members: members::members(&mut conn, uuid)
            .await?
            .into_iter()
            .map(|m| NamedEntity::new(m.name, m.differentiator))
            .collect(),
    };
    form.add_placeholders();

    Ok(FormResponse::valid(Label::Company, form))
}

pub async fn show(pool: &SqlitePool, uuid: &str) -> Result<CompanyShow> {
    let mut conn = pool.acquire().await?;
    let company = entities::require(&mut conn, Label::Company, uuid).await?;

    Ok(CompanyShow {
        model: Label::Company,
        members: members::members(&mut conn, uuid).await?.iter().map(EntityRow::to_ref).collect(),
        materials: credited_materials(&mut conn, uuid).await?,
        producer_productions: credited_productions(&mut conn, CreditKind::Producer, uuid).await?,
        creative_productions: credited_productions(&mut conn, CreditKind::Creative, uuid).await?,
        crew_productions: credited_productions(&mut conn, CreditKind::Crew, uuid).await?,
        awards: nominations::involving(&mut conn, uuid).await?,
        uuid: company.uuid,
        name: company.name,
        differentiator: company.differentiator,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<EntityRef>> {
    let mut conn = pool.acquire().await?;
    Ok(entities::list(&mut conn, Label::Company).await?.iter().map(EntityRow::to_ref).collect())
}

pub async fn delete(pool: &SqlitePool, uuid: &str) -> Result<DeleteResponse> {
    let mut driver = ReplaceDriver::begin(pool).await?;
    let company = entities::require(driver.conn(), Label::Company, uuid).await?;
    entities::delete(driver.conn(), uuid).await?;
    driver.build().commit().await?;

    info!(uuid, label = %Label::Company, "Deleted company");
    Ok(deleted(&company))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbill_common::db::connect_in_memory;
    use playbill_common::SequentialIds;

    #[tokio::test]
    async fn test_members_round_trip_in_order() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();

        let form = CompanyForm {
            name: "Headlong".to_string(),
            members: vec![NamedEntity::new("Rupert Goold", ""), NamedEntity::new("Ben Power", "")],
            ..Default::default()
        };
        let response = create(&pool, &ids, form).await.unwrap();
        let uuid = response.form.uuid.clone().unwrap();

        let names: Vec<&str> = response.form.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Rupert Goold", "Ben Power", ""]);

        let shown = show(&pool, &uuid).await.unwrap();
        assert_eq!(shown.members.len(), 2);
        assert_eq!(shown.members[0].name, "Rupert Goold");
    }

    #[tokio::test]
    async fn test_delete_keeps_members() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();

        let form = CompanyForm {
            name: "Headlong".to_string(),
            members: vec![NamedEntity::new("Rupert Goold", "")],
            ..Default::default()
        };
        let uuid = create(&pool, &ids, form).await.unwrap().form.uuid.unwrap();
        delete(&pool, &uuid).await.unwrap();

        let people: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entities WHERE label = 'PERSON'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(people, 1);
    }
}
