//! Read-side views for show and list responses
//!
//! Every entity object carries its `model` label. A `uuid` of `null` marks
//! the subject of the view appearing inside its own nested data.

use super::validation::ValidationErrors;
use playbill_common::Label;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Key under which a hierarchical entity's parent is rendered
pub fn sur_key(label: Label) -> &'static str {
    match label {
        Label::Material => "surMaterial",
        Label::Production => "surProduction",
        Label::Venue => "surVenue",
        _ => "sur",
    }
}

/// Key under which a hierarchical entity's children are rendered
pub fn sub_key(label: Label) -> &'static str {
    match label {
        Label::Material => "subMaterials",
        Label::Production => "subProductions",
        Label::Venue => "subVenues",
        _ => "subItems",
    }
}

/// One link of a sur-item chain
///
/// `include_sur` controls whether the `surX` key is written at all: full
/// chains end in `surX: null`, two-level summaries omit the key on their
/// second level.
#[derive(Debug, Clone, PartialEq)]
pub struct Ancestor {
    pub label: Label,
    pub uuid: String,
    pub name: String,
    pub sur: Option<Box<Ancestor>>,
    pub include_sur: bool,
}

impl Ancestor {
    /// Nest `links` (nearest first) into a chain, keeping at most `depth`
    /// levels when given
    pub fn chain(label: Label, links: &[EntityRef], depth: Option<usize>) -> Option<Ancestor> {
        let kept = depth.unwrap_or(links.len()).min(links.len());

        links[..kept].iter().enumerate().rev().fold(None, |sur, (level, link)| {
            Some(Ancestor {
                label,
                uuid: link.uuid.clone().unwrap_or_default(),
                name: link.name.clone(),
                sur: sur.map(Box::new),
                include_sur: depth.map_or(true, |depth| level + 1 < depth),
            })
        })
    }
}

impl Serialize for Ancestor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("model", &self.label)?;
        map.serialize_entry("uuid", &self.uuid)?;
        map.serialize_entry("name", &self.name)?;
        if self.include_sur {
            map.serialize_entry(sur_key(self.label), &self.sur)?;
        }
        map.end()
    }
}

/// `{model, uuid, name}` reference to another entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub model: Label,
    pub uuid: Option<String>,
    pub name: String,
}

impl EntityRef {
    pub fn new(model: Label, uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            model,
            uuid: Some(uuid.into()),
            name: name.into(),
        }
    }

    /// Clear the uuid if this is the subject of the view
    pub fn nullify(mut self, subject: Option<&str>) -> Self {
        if subject.is_some() && self.uuid.as_deref() == subject {
            self.uuid = None;
        }
        self
    }
}

/// Ordered group of credited entities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditGroupView {
    pub name: String,
    pub entities: Vec<CreditedEntityView>,
}

/// Entity inside a credit group or nomination
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CreditedEntityView {
    Person(EntityRef),
    Company(CompanyCredit),
    Material(MaterialSummary),
}

impl CreditedEntityView {
    pub fn uuid(&self) -> Option<&str> {
        match self {
            CreditedEntityView::Person(e) => e.uuid.as_deref(),
            CreditedEntityView::Company(c) => c.uuid.as_deref(),
            CreditedEntityView::Material(m) => m.uuid.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCredit {
    pub model: Label,
    pub uuid: Option<String>,
    pub name: String,
    pub members: Vec<EntityRef>,
}

/// Material as it appears in lists, credits and production views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSummary {
    pub model: Label,
    pub uuid: Option<String>,
    pub name: String,
    pub format: Option<String>,
    pub year: Option<i64>,
    pub sur_material: Option<Ancestor>,
    pub writing_credits: Vec<CreditGroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSummary {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub sur_venue: Option<Ancestor>,
}

/// Production as it appears in lists and in other entities' views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSummary {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub start_date: Option<String>,
    pub press_date: Option<String>,
    pub end_date: Option<String>,
    pub venue: Option<VenueSummary>,
    pub sur_production: Option<Ancestor>,
}

/// Production plus the credits in which the subject appears
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditedProduction {
    #[serde(flatten)]
    pub production: ProductionSummary,
    pub credits: Vec<CreditGroupView>,
}

/// Production plus the roles the subject plays in it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMemberProduction {
    #[serde(flatten)]
    pub production: ProductionSummary,
    pub roles: Vec<RoleView>,
}

/// Production at a venue, with the sub-venue it played at if any
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueProduction {
    #[serde(flatten)]
    pub production: ProductionSummary,
    pub sub_venue: Option<EntityRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterGroupView {
    pub name: Option<String>,
    pub characters: Vec<CharacterView>,
}

/// Character within a material's character group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub model: Label,
    pub uuid: String,
    /// Display name within the material
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_name: Option<String>,
    pub differentiator: String,
    pub qualifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMemberView {
    pub model: Label,
    pub uuid: Option<String>,
    pub name: String,
    pub roles: Vec<RoleView>,
}

/// A cast role; `uuid` is the resolved character's, or null when the role
/// matches no character of the production's material
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleView {
    pub model: Label,
    pub uuid: Option<String>,
    pub name: String,
    pub qualifier: Option<String>,
    pub is_alternate: bool,
}

/// Performer of a character in one production
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub role_name: String,
    pub qualifier: Option<String>,
    pub is_alternate: bool,
    pub other_roles: Vec<RoleView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProduction {
    #[serde(flatten)]
    pub production: ProductionSummary,
    pub performers: Vec<Performer>,
}

/// How a material presents the character
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Depiction {
    pub display_name: Option<String>,
    pub qualifier: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMaterial {
    #[serde(flatten)]
    pub material: MaterialSummary,
    pub depictions: Vec<Depiction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationView {
    pub is_winner: bool,
    pub entities: Vec<CreditedEntityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub nominations: Vec<NominationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CeremonyView {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardView {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub ceremonies: Vec<CeremonyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CeremonySummary {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub award: Option<EntityRef>,
}

// Show views

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub differentiator: String,
    pub format: Option<String>,
    pub year: Option<i64>,
    pub sur_material: Option<Ancestor>,
    pub sub_materials: Vec<EntityRef>,
    pub writing_credits: Vec<CreditGroupView>,
    pub character_groups: Vec<CharacterGroupView>,
    pub productions: Vec<ProductionSummary>,
    pub sourcing_materials: Vec<MaterialSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub start_date: Option<String>,
    pub press_date: Option<String>,
    pub end_date: Option<String>,
    pub material: Option<MaterialSummary>,
    pub venue: Option<VenueSummary>,
    pub sur_production: Option<Ancestor>,
    pub sub_productions: Vec<EntityRef>,
    pub producer_credits: Vec<CreditGroupView>,
    pub cast: Vec<CastMemberView>,
    pub creative_credits: Vec<CreditGroupView>,
    pub crew_credits: Vec<CreditGroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub differentiator: String,
    pub sur_venue: Option<Ancestor>,
    pub sub_venues: Vec<EntityRef>,
    pub productions: Vec<VenueProduction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub differentiator: String,
    pub materials: Vec<MaterialSummary>,
    pub producer_productions: Vec<CreditedProduction>,
    pub creative_productions: Vec<CreditedProduction>,
    pub crew_productions: Vec<CreditedProduction>,
    pub cast_member_productions: Vec<CastMemberProduction>,
    pub companies: Vec<EntityRef>,
    pub awards: Vec<AwardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub differentiator: String,
    pub members: Vec<EntityRef>,
    pub materials: Vec<MaterialSummary>,
    pub producer_productions: Vec<CreditedProduction>,
    pub creative_productions: Vec<CreditedProduction>,
    pub crew_productions: Vec<CreditedProduction>,
    pub awards: Vec<AwardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub differentiator: String,
    pub material: Option<CharacterMaterial>,
    pub variant_named_depictions: Vec<String>,
    pub productions: Vec<CharacterProduction>,
    pub variant_named_portrayals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub differentiator: String,
    pub ceremonies: Vec<CeremonyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardCeremonyShow {
    pub model: Label,
    pub uuid: String,
    pub name: String,
    pub award: Option<EntityRef>,
    pub categories: Vec<CategoryView>,
}

/// Create/update/edit/new response: the form plus its validation state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse<T> {
    pub model: Label,
    #[serde(flatten)]
    pub form: T,
    pub errors: ValidationErrors,
    pub has_errors: bool,
}

impl<T> FormResponse<T> {
    pub fn valid(model: Label, form: T) -> Self {
        Self {
            model,
            form,
            errors: ValidationErrors::new(),
            has_errors: false,
        }
    }

    pub fn invalid(model: Label, form: T, errors: ValidationErrors) -> Self {
        let has_errors = !errors.is_empty();
        Self {
            model,
            form,
            errors,
            has_errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub model: Label,
    pub name: String,
    pub differentiator: String,
    pub errors: ValidationErrors,
    pub has_errors: bool,
}

/// Deduplicate names, keeping the order of first occurrence
pub fn dedup_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut result: Vec<String> = Vec::new();
    for name in names {
        if !result.contains(&name) {
            result.push(name);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn links(names: &[&str]) -> Vec<EntityRef> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| EntityRef::new(Label::Material, format!("m{}", i), *name))
            .collect()
    }

    #[test]
    fn test_full_chain_ends_in_null() {
        let chain = Ancestor::chain(Label::Material, &links(&["Parent", "Grandparent"]), None);
        assert_eq!(
            serde_json::to_value(&chain).unwrap(),
            json!({
                "model": "MATERIAL", "uuid": "m0", "name": "Parent",
                "surMaterial": {
                    "model": "MATERIAL", "uuid": "m1", "name": "Grandparent",
                    "surMaterial": null
                }
            })
        );
    }

    #[test]
    fn test_two_level_chain_omits_third_level() {
        let chain = Ancestor::chain(
            Label::Venue,
            &[
                EntityRef::new(Label::Venue, "v1", "Olivier Theatre"),
                EntityRef::new(Label::Venue, "v2", "National Theatre"),
                EntityRef::new(Label::Venue, "v3", "South Bank"),
            ],
            Some(2),
        );
        assert_eq!(
            serde_json::to_value(&chain).unwrap(),
            json!({
                "model": "VENUE", "uuid": "v1", "name": "Olivier Theatre",
                "surVenue": { "model": "VENUE", "uuid": "v2", "name": "National Theatre" }
            })
        );
    }

    #[test]
    fn test_two_level_chain_with_single_parent() {
        let chain = Ancestor::chain(Label::Material, &links(&["Parent"]), Some(2));
        assert_eq!(
            serde_json::to_value(&chain).unwrap(),
            json!({ "model": "MATERIAL", "uuid": "m0", "name": "Parent", "surMaterial": null })
        );
    }

    #[test]
    fn test_two_level_chain_with_exactly_two_parents() {
        let chain = Ancestor::chain(Label::Material, &links(&["Parent", "Grandparent"]), Some(2));
        assert_eq!(
            serde_json::to_value(&chain).unwrap(),
            json!({
                "model": "MATERIAL", "uuid": "m0", "name": "Parent",
                "surMaterial": { "model": "MATERIAL", "uuid": "m1", "name": "Grandparent" }
            })
        );
    }

    #[test]
    fn test_empty_chain() {
        assert_eq!(Ancestor::chain(Label::Production, &[], None), None);
        assert_eq!(Ancestor::chain(Label::Production, &[], Some(2)), None);
    }

    #[test]
    fn test_nullify_only_matches_subject() {
        let person = EntityRef::new(Label::Person, "p1", "Ian McKellen");
        assert_eq!(person.clone().nullify(Some("p2")).uuid.as_deref(), Some("p1"));
        assert_eq!(person.clone().nullify(None).uuid.as_deref(), Some("p1"));
        assert_eq!(person.nullify(Some("p1")).uuid, None);
    }

    #[test]
    fn test_form_response_flattens_form() {
        #[derive(Serialize)]
        struct Form {
            name: String,
        }
        let response = FormResponse::valid(Label::Person, Form { name: "Judi Dench".to_string() });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "model": "PERSON", "name": "Judi Dench", "errors": {}, "hasErrors": false })
        );
    }

    #[test]
    fn test_dedup_names_keeps_first_occurrence() {
        let names = ["Ghost", "Old Hamlet", "Ghost"].map(String::from);
        assert_eq!(dedup_names(names), vec!["Ghost", "Old Hamlet"]);
    }
}
