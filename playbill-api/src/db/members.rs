//! Company membership

use super::entities::EntityRow;
use super::graph::{self, EdgeProps};
use super::replace::{BuildPhase, DeletePhase, ReplaceDriver};
use super::resolver;
use crate::models::NamedEntity;
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::SqliteConnection;

pub async fn clear(driver: &mut ReplaceDriver<DeletePhase>, company: &str) -> Result<()> {
    graph::unlink_outgoing(driver.conn(), RelationshipKind::HasMember, company).await?;
    Ok(())
}

pub async fn write(
    driver: &mut ReplaceDriver<BuildPhase>,
    ids: &dyn IdGenerator,
    company: &str,
    members: &[NamedEntity],
) -> Result<()> {
    let named = members.iter().filter(|m| !m.name.is_empty());
    for (position, member) in named.enumerate() {
        let person =
            resolver::resolve(driver.conn(), ids, Label::Person, "", &member.name, &member.differentiator).await?;
        graph::link(driver.conn(), RelationshipKind::HasMember, company, &person.uuid, &EdgeProps::at(position))
            .await?;
    }
    Ok(())
}

/// Members in position order
pub async fn members(conn: &mut SqliteConnection, company: &str) -> Result<Vec<EntityRow>> {
    graph::targets(conn, RelationshipKind::HasMember, company).await
}

/// Companies the person is a member of, by name
pub async fn companies(conn: &mut SqliteConnection, person: &str) -> Result<Vec<EntityRow>> {
    graph::sources(conn, RelationshipKind::HasMember, person).await
}
