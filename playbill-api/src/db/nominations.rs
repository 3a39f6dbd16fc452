//! Award ceremony categories and nominations
//!
//! Categories are nodes owned by their ceremony (`PRESENTS_CATEGORY`, with a
//! position). Nominees hang off the category as `HAS_NOMINEE` edges laid out
//! like credits: `group_position` is the nomination, `entity_position` the
//! nominee, and company members carry the company's uuid.

use super::credits::{self, RowGroup};
use super::entities::{self, EntityRow, ENTITY_COLUMNS};
use super::graph::{self, EdgeProps};
use super::replace::{BuildPhase, DeletePhase, ReplaceDriver};
use crate::models::views::{AwardView, CategoryView, CeremonyView, NominationView};
use crate::models::{Category, Nomination};
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::{Row, SqliteConnection};

/// Remove the ceremony's categories; their nominee edges cascade
pub async fn clear(driver: &mut ReplaceDriver<DeletePhase>, ceremony: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM entities
        WHERE label = ? AND uuid IN (
            SELECT target_uuid FROM relationships WHERE kind = ? AND source_uuid = ?
        )
        "#,
    )
    .bind(Label::AwardCeremonyCategory.as_str())
    .bind(RelationshipKind::PresentsCategory.as_str())
    .bind(ceremony)
    .execute(driver.conn())
    .await?;

    Ok(())
}

pub async fn write(
    driver: &mut ReplaceDriver<BuildPhase>,
    ids: &dyn IdGenerator,
    ceremony: &str,
    categories: &[Category],
) -> Result<()> {
    for (position, category) in categories.iter().filter(|c| c.is_writable()).enumerate() {
        let category_uuid = ids.generate().to_string();
        entities::insert(
            driver.conn(),
            &category_uuid,
            Label::AwardCeremonyCategory,
            ceremony,
            &category.name,
            "",
        )
        .await?;
        graph::link(
            driver.conn(),
            RelationshipKind::PresentsCategory,
            ceremony,
            &category_uuid,
            &EdgeProps::at(position),
        )
        .await?;

        let nominations = category.nominations.iter().filter(|n| n.is_writable());
        for (group_position, nomination) in nominations.enumerate() {
            let base = EdgeProps {
                group_position: Some(group_position as i64),
                is_winner: Some(nomination.is_winner),
                ..Default::default()
            };
            credits::write_entities(
                driver.conn(),
                ids,
                RelationshipKind::HasNominee,
                &category_uuid,
                &nomination.entities,
                &base,
            )
            .await?;
        }
    }
    Ok(())
}

/// Categories of a ceremony in position order
pub async fn categories(conn: &mut SqliteConnection, ceremony: &str) -> Result<Vec<EntityRow>> {
    graph::targets(conn, RelationshipKind::PresentsCategory, ceremony).await
}

fn nomination_view(group: &RowGroup, subject: Option<&str>) -> NominationView {
    NominationView {
        is_winner: group.is_winner,
        entities: group.entities.iter().map(|e| credits::entity_view(e, subject)).collect(),
    }
}

/// Categories with all their nominations
pub async fn read(conn: &mut SqliteConnection, ceremony: &str) -> Result<Vec<CategoryView>> {
    let mut views = Vec::new();
    for category in categories(conn, ceremony).await? {
        let nominations = credits::read_rows(conn, RelationshipKind::HasNominee, &category.uuid).await?;
        views.push(CategoryView {
            model: Label::AwardCeremonyCategory,
            uuid: category.uuid,
            name: category.name,
            nominations: nominations.iter().map(|n| nomination_view(n, None)).collect(),
        });
    }
    Ok(views)
}

pub async fn read_form(conn: &mut SqliteConnection, ceremony: &str) -> Result<Vec<Category>> {
    let mut form = Vec::new();
    for category in categories(conn, ceremony).await? {
        let nominations = credits::read_rows(conn, RelationshipKind::HasNominee, &category.uuid).await?;
        form.push(Category {
            name: category.name,
            nominations: nominations
                .iter()
                .map(|n| Nomination {
                    is_winner: n.is_winner,
                    entities: n.entities.iter().map(credits::form_entity).collect(),
                })
                .collect(),
        });
    }
    Ok(form)
}

/// Awards → ceremonies → categories → nominations in which `subject` is a
/// nominee or a credited company member; the subject renders with a null
/// uuid
pub async fn involving(conn: &mut SqliteConnection, subject: &str) -> Result<Vec<AwardView>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {},
               ceremony.uuid AS ceremony_uuid, ceremony.name AS ceremony_name,
               award.uuid AS award_uuid, award.name AS award_name
        FROM entities e
        JOIN relationships pc ON pc.target_uuid = e.uuid AND pc.kind = 'PRESENTS_CATEGORY'
        JOIN entities ceremony ON ceremony.uuid = pc.source_uuid
        JOIN relationships co ON co.source_uuid = ceremony.uuid AND co.kind = 'CEREMONY_OF'
        JOIN entities award ON award.uuid = co.target_uuid
        WHERE e.uuid IN (
            SELECT source_uuid FROM relationships WHERE kind = 'HAS_NOMINEE' AND target_uuid = ?
        )
        ORDER BY award.name, award.differentiator, award.uuid,
                 ceremony.name DESC, ceremony.uuid, pc.position
        "#,
        ENTITY_COLUMNS
    ))
    .bind(subject)
    .fetch_all(&mut *conn)
    .await?;

    let mut awards: Vec<AwardView> = Vec::new();
    for row in &rows {
        let category = EntityRow::from_row(row)?;
        let award_uuid: String = row.get("award_uuid");
        let ceremony_uuid: String = row.get("ceremony_uuid");

        let nominations: Vec<NominationView> = credits::read_rows(conn, RelationshipKind::HasNominee, &category.uuid)
            .await?
            .iter()
            .filter(|n| n.involves(subject))
            .map(|n| nomination_view(n, Some(subject)))
            .collect();

        if awards.last().map(|a| a.uuid.as_str()) != Some(award_uuid.as_str()) {
            awards.push(AwardView {
                model: Label::Award,
                uuid: award_uuid,
                name: row.get("award_name"),
                ceremonies: Vec::new(),
            });
        }
        let Some(award) = awards.last_mut() else { continue };

        if award.ceremonies.last().map(|c| c.uuid.as_str()) != Some(ceremony_uuid.as_str()) {
            award.ceremonies.push(CeremonyView {
                model: Label::AwardCeremony,
                uuid: ceremony_uuid,
                name: row.get("ceremony_name"),
                categories: Vec::new(),
            });
        }
        let Some(ceremony) = award.ceremonies.last_mut() else { continue };

        ceremony.categories.push(CategoryView {
            model: Label::AwardCeremonyCategory,
            uuid: category.uuid,
            name: category.name,
            nominations,
        });
    }

    Ok(awards)
}
