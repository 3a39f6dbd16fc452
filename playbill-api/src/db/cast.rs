//! Production casts
//!
//! Each role of a cast member is one `HAS_CAST_MEMBER` edge from the
//! production to the person, ordered by the member's `position` and the
//! role's `role_position`. A member without roles is a single edge with no
//! role fields.
//!
//! Roles name their character rather than linking it: at read time a role
//! resolves to the character of the production's material whose name is the
//! role's `character_name` (or the role name when that is blank) and whose
//! differentiator matches. Characters of other materials never match.

use super::graph::EdgeProps;
use super::replace::{BuildPhase, DeletePhase, ReplaceDriver};
use super::{graph, resolver};
use crate::models::views::{CastMemberView, RoleView};
use crate::models::{non_blank, CastMember, Role};
use playbill_common::{IdGenerator, Label, RelationshipKind, Result};
use sqlx::{Row, SqliteConnection};

/// Character of the production's material matched by a cast edge `r`
const RESOLVED_CHARACTER: &str = r#"
    SELECT c.uuid
    FROM relationships po
    JOIN relationships hc ON hc.source_uuid = po.target_uuid AND hc.kind = 'HAS_CHARACTER'
    JOIN entities c ON c.uuid = hc.target_uuid
    WHERE po.kind = 'PRODUCTION_OF' AND po.source_uuid = r.source_uuid
      AND c.name = COALESCE(NULLIF(r.character_name, ''), r.role_name)
      AND c.differentiator = COALESCE(r.character_differentiator, '')
    LIMIT 1
"#;

/// One stored cast edge
#[derive(Debug, Clone, PartialEq)]
pub struct CastRow {
    pub production_uuid: String,
    pub position: i64,
    pub person_uuid: String,
    pub person_name: String,
    pub person_differentiator: String,
    pub role_name: Option<String>,
    pub role_position: Option<i64>,
    pub character_name: Option<String>,
    pub character_differentiator: Option<String>,
    pub qualifier: Option<String>,
    pub is_alternate: bool,
    pub character_uuid: Option<String>,
}

impl CastRow {
    pub fn role_view(&self) -> Option<RoleView> {
        let name = self.role_name.clone()?;
        Some(RoleView {
            model: Label::Character,
            uuid: self.character_uuid.clone(),
            name,
            qualifier: self.qualifier.clone(),
            is_alternate: self.is_alternate,
        })
    }
}

/// Which cast edges to read
#[derive(Debug, Clone, Copy)]
pub enum CastFilter<'a> {
    /// The whole cast of a production
    Production(&'a str),
    /// Every role a person has played
    Person(&'a str),
    /// Every role resolving to a character
    Character(&'a str),
}

/// Cast edges ordered by production (start date, name, uuid), member
/// position and role position
pub async fn rows(conn: &mut SqliteConnection, filter: CastFilter<'_>) -> Result<Vec<CastRow>> {
    let (condition, uuid) = match filter {
        CastFilter::Production(uuid) => ("r.source_uuid = ?".to_string(), uuid),
        CastFilter::Person(uuid) => ("r.target_uuid = ?".to_string(), uuid),
        CastFilter::Character(uuid) => (format!("({}) = ?", RESOLVED_CHARACTER), uuid),
    };

    let result = sqlx::query(&format!(
        r#"
        SELECT r.source_uuid, r.position, r.role_name, r.role_position, r.character_name,
               r.character_differentiator, r.qualifier, r.is_alternate,
               p.uuid AS person_uuid, p.name AS person_name, p.differentiator AS person_differentiator,
               ({}) AS character_uuid
        FROM relationships r
        JOIN entities p ON p.uuid = r.target_uuid
        JOIN entities pr ON pr.uuid = r.source_uuid
        WHERE r.kind = 'HAS_CAST_MEMBER' AND {}
        ORDER BY pr.start_date, pr.name, pr.uuid, r.position, r.role_position, r.id
        "#,
        RESOLVED_CHARACTER, condition
    ))
    .bind(uuid)
    .fetch_all(&mut *conn)
    .await?;

    Ok(result
        .iter()
        .map(|row| CastRow {
            production_uuid: row.get("source_uuid"),
            position: row.get::<Option<i64>, _>("position").unwrap_or_default(),
            person_uuid: row.get("person_uuid"),
            person_name: row.get("person_name"),
            person_differentiator: row.get("person_differentiator"),
            role_name: row.get("role_name"),
            role_position: row.get("role_position"),
            character_name: row.get("character_name"),
            character_differentiator: row.get("character_differentiator"),
            qualifier: row.get("qualifier"),
            is_alternate: row.get::<Option<bool>, _>("is_alternate").unwrap_or(false),
            character_uuid: row.get("character_uuid"),
        })
        .collect())
}

pub async fn clear(driver: &mut ReplaceDriver<DeletePhase>, production: &str) -> Result<()> {
    graph::unlink_outgoing(driver.conn(), RelationshipKind::HasCastMember, production).await?;
    Ok(())
}

pub async fn write(
    driver: &mut ReplaceDriver<BuildPhase>,
    ids: &dyn IdGenerator,
    production: &str,
    cast: &[CastMember],
) -> Result<()> {
    let named = cast.iter().filter(|m| !m.name.is_empty());
    for (position, member) in named.enumerate() {
        let person =
            resolver::resolve(driver.conn(), ids, Label::Person, "", &member.name, &member.differentiator).await?;
        let member_props = EdgeProps::at(position);

        let roles: Vec<&Role> = member.roles.iter().filter(|r| !r.name.is_empty()).collect();
        if roles.is_empty() {
            graph::link(driver.conn(), RelationshipKind::HasCastMember, production, &person.uuid, &member_props)
                .await?;
            continue;
        }

        for (role_position, role) in roles.into_iter().enumerate() {
            let props = EdgeProps {
                role_name: Some(role.name.clone()),
                role_position: Some(role_position as i64),
                character_name: non_blank(&role.character_name).map(str::to_string),
                character_differentiator: non_blank(&role.character_differentiator).map(str::to_string),
                qualifier: non_blank(&role.qualifier).map(str::to_string),
                is_alternate: Some(role.is_alternate),
                ..member_props.clone()
            };
            graph::link(driver.conn(), RelationshipKind::HasCastMember, production, &person.uuid, &props).await?;
        }
    }
    Ok(())
}

/// Split rows into runs of consecutive rows sharing production and position
fn members(rows: Vec<CastRow>) -> Vec<Vec<CastRow>> {
    let mut members: Vec<Vec<CastRow>> = Vec::new();
    for row in rows {
        match members.last_mut() {
            Some(roles)
                if roles[0].position == row.position && roles[0].production_uuid == row.production_uuid =>
            {
                roles.push(row)
            }
            _ => members.push(vec![row]),
        }
    }
    members
}

/// Cast of a production with roles resolved to characters
pub async fn read(conn: &mut SqliteConnection, production: &str, subject: Option<&str>) -> Result<Vec<CastMemberView>> {
    Ok(members(rows(conn, CastFilter::Production(production)).await?)
        .into_iter()
        .map(|roles| {
            let first = &roles[0];
            CastMemberView {
                model: Label::Person,
                uuid: Some(first.person_uuid.clone()).filter(|uuid| Some(uuid.as_str()) != subject),
                name: first.person_name.clone(),
                roles: roles.iter().filter_map(CastRow::role_view).collect(),
            }
        })
        .collect())
}

pub async fn read_form(conn: &mut SqliteConnection, production: &str) -> Result<Vec<CastMember>> {
    Ok(members(rows(conn, CastFilter::Production(production)).await?)
        .into_iter()
        .map(|roles| CastMember {
            name: roles[0].person_name.clone(),
            differentiator: roles[0].person_differentiator.clone(),
            roles: roles
                .iter()
                .filter_map(|row| {
                    Some(Role {
                        name: row.role_name.clone()?,
                        character_name: row.character_name.clone().unwrap_or_default(),
                        character_differentiator: row.character_differentiator.clone().unwrap_or_default(),
                        qualifier: row.qualifier.clone().unwrap_or_default(),
                        is_alternate: row.is_alternate,
                    })
                })
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{characters, entities};
    use crate::models::{CharacterEntry, CharacterGroup};
    use playbill_common::db::connect_in_memory;
    use playbill_common::SequentialIds;
    use sqlx::SqlitePool;

    fn role(name: &str, character_name: &str) -> Role {
        Role {
            character_name: character_name.to_string(),
            ..Role::new(name)
        }
    }

    /// Material "m" with characters, production "pr" of it
    async fn seed(pool: &SqlitePool, ids: &SequentialIds, characters: &[(&str, &str)]) {
        let mut driver = ReplaceDriver::begin(pool).await.unwrap().build();
        entities::insert(driver.conn(), "m", Label::Material, "", "Hamlet", "").await.unwrap();
        entities::insert(driver.conn(), "pr", Label::Production, "", "Hamlet", "").await.unwrap();
        graph::link(driver.conn(), RelationshipKind::ProductionOf, "pr", "m", &EdgeProps::default())
            .await
            .unwrap();
        let group = CharacterGroup {
            name: String::new(),
            characters: characters.iter().map(|(n, d)| CharacterEntry::new(n, d, "")).collect(),
        };
        characters::write_groups(&mut driver, ids, "m", &[group]).await.unwrap();
        driver.commit().await.unwrap();
    }

    async fn write_cast(pool: &SqlitePool, ids: &SequentialIds, cast: &[CastMember]) {
        let mut driver = ReplaceDriver::begin(pool).await.unwrap();
        clear(&mut driver, "pr").await.unwrap();
        let mut driver = driver.build();
        write(&mut driver, ids, "pr", cast).await.unwrap();
        driver.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_roles_resolve_to_material_characters() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();
        seed(&pool, &ids, &[("Ghost of King Hamlet", ""), ("Claudius", "")]).await;

        let cast = vec![
            CastMember {
                name: "Patrick Stewart".to_string(),
                differentiator: String::new(),
                roles: vec![role("Ghost", "Ghost of King Hamlet"), role("Claudius", ""), role("Player King", "")],
            },
            CastMember {
                name: "Understudy".to_string(),
                differentiator: String::new(),
                roles: vec![],
            },
        ];
        write_cast(&pool, &ids, &cast).await;

        let mut conn = pool.acquire().await.unwrap();
        let view = read(&mut conn, "pr", None).await.unwrap();
        assert_eq!(view.len(), 2);

        let roles = &view[0].roles;
        assert_eq!(roles[0].name, "Ghost");
        assert!(roles[0].uuid.is_some());
        assert!(roles[1].uuid.is_some());
        assert_ne!(roles[0].uuid, roles[1].uuid);
        assert_eq!(roles[2].uuid, None);
        assert!(view[1].roles.is_empty());

        let form = read_form(&mut conn, "pr").await.unwrap();
        assert_eq!(form, cast);
    }

    #[tokio::test]
    async fn test_character_filter_finds_portrayals() {
        let pool = connect_in_memory().await.unwrap();
        let ids = SequentialIds::new();
        seed(&pool, &ids, &[("Demetrius", "1")]).await;
        write_cast(
            &pool,
            &ids,
            &[CastMember {
                name: "Oscar Pearce".to_string(),
                differentiator: String::new(),
                roles: vec![Role {
                    character_differentiator: "1".to_string(),
                    ..Role::new("Demetrius")
                }],
            }],
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        let character = resolver::find(&mut conn, Label::Character, "m", "Demetrius", "1").await.unwrap().unwrap();
        let portrayals = rows(&mut conn, CastFilter::Character(&character)).await.unwrap();
        assert_eq!(portrayals.len(), 1);
        assert_eq!(portrayals[0].person_name, "Oscar Pearce");

        let undifferentiated = resolver::resolve(&mut conn, &ids, Label::Character, "m", "Demetrius", "")
            .await
            .unwrap();
        let none = rows(&mut conn, CastFilter::Character(&undifferentiated.uuid)).await.unwrap();
        assert!(none.is_empty());
    }
}
