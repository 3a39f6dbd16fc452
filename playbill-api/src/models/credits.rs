//! Credit groups, credited entities and sub-item references (form side)

use super::validation::{
    DuplicateTracker, ValidationErrors, DUPLICATE_IN_GROUP, MATERIAL_NOT_PERMITTED,
    SELF_ASSOCIATION, TOO_SHORT,
};
use super::{null_as_empty, trim};
use playbill_common::Label;
use serde::{Deserialize, Serialize};

/// Reference to an entity by name and differentiator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamedEntity {
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
}

impl NamedEntity {
    pub fn new(name: impl Into<String>, differentiator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            differentiator: differentiator.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.differentiator.trim().is_empty()
    }

    pub(crate) fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.differentiator);
    }
}

/// Company credit: the company plus the members credited alongside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyEntity {
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
    pub members: Vec<NamedEntity>,
}

/// An entity inside a credit group or nomination
///
/// Submitted entities without a `model` are people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "SCREAMING_SNAKE_CASE", from = "SubmittedEntity")]
pub enum CreditedEntity {
    Person(NamedEntity),
    Company(CompanyEntity),
    Material(NamedEntity),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SubmittedEntity {
    model: Option<Label>,
    name: String,
    #[serde(deserialize_with = "null_as_empty")]
    differentiator: String,
    members: Vec<NamedEntity>,
}

impl From<SubmittedEntity> for CreditedEntity {
    fn from(entity: SubmittedEntity) -> Self {
        match entity.model {
            Some(Label::Company) => CreditedEntity::Company(CompanyEntity {
                name: entity.name,
                differentiator: entity.differentiator,
                members: entity.members,
            }),
            Some(Label::Material) => CreditedEntity::Material(NamedEntity::new(entity.name, entity.differentiator)),
            _ => CreditedEntity::Person(NamedEntity::new(entity.name, entity.differentiator)),
        }
    }
}

impl Default for CreditedEntity {
    fn default() -> Self {
        CreditedEntity::Person(NamedEntity::default())
    }
}

impl CreditedEntity {
    pub fn label(&self) -> Label {
        match self {
            CreditedEntity::Person(_) => Label::Person,
            CreditedEntity::Company(_) => Label::Company,
            CreditedEntity::Material(_) => Label::Material,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CreditedEntity::Person(e) | CreditedEntity::Material(e) => &e.name,
            CreditedEntity::Company(c) => &c.name,
        }
    }

    pub fn differentiator(&self) -> &str {
        match self {
            CreditedEntity::Person(e) | CreditedEntity::Material(e) => &e.differentiator,
            CreditedEntity::Company(c) => &c.differentiator,
        }
    }

    /// Members credited with a company; empty for other kinds
    pub fn members(&self) -> &[NamedEntity] {
        match self {
            CreditedEntity::Company(c) => &c.members,
            _ => &[],
        }
    }

    /// Entity is written only when it has a name
    pub fn is_writable(&self) -> bool {
        !self.name().trim().is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.name().trim().is_empty()
            && self.differentiator().trim().is_empty()
            && self.members().iter().all(NamedEntity::is_blank)
    }

    pub(crate) fn normalize(&mut self) {
        match self {
            CreditedEntity::Person(e) | CreditedEntity::Material(e) => e.normalize(),
            CreditedEntity::Company(c) => {
                trim(&mut c.name);
                trim(&mut c.differentiator);
                c.members.iter_mut().for_each(NamedEntity::normalize);
            }
        }
    }

    pub(crate) fn add_placeholders(&mut self) {
        if let CreditedEntity::Company(c) = self {
            c.members.push(NamedEntity::default());
        }
    }
}

/// Ordered, named group of credited entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditGroup {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub entities: Vec<CreditedEntity>,
}

impl CreditGroup {
    pub fn new(name: impl Into<String>, entities: Vec<CreditedEntity>) -> Self {
        Self {
            name: name.into(),
            entities,
        }
    }

    /// Groups without a single named entity create no edges
    pub fn is_writable(&self) -> bool {
        self.entities.iter().any(CreditedEntity::is_writable)
    }

    pub(crate) fn normalize(&mut self) {
        trim(&mut self.name);
        self.entities.iter_mut().for_each(CreditedEntity::normalize);
    }

    pub(crate) fn add_placeholders(&mut self) {
        self.entities.iter_mut().for_each(CreditedEntity::add_placeholders);
        self.entities.push(CreditedEntity::default());
    }
}

/// Validation rules that differ per credit family
#[derive(Debug, Clone, Copy)]
pub struct CreditRules<'a> {
    /// Group name must be given when the group has entities
    pub requires_group_name: bool,
    /// MATERIAL entities may be credited
    pub permits_material: bool,
    /// Identity of the subject, used to reject a material crediting itself
    pub subject: Option<(&'a str, &'a str)>,
}

pub(crate) fn normalize_groups(groups: &mut [CreditGroup]) {
    groups.iter_mut().for_each(CreditGroup::normalize);
}

pub(crate) fn add_group_placeholders(groups: &mut Vec<CreditGroup>) {
    groups.iter_mut().for_each(CreditGroup::add_placeholders);
    groups.push(CreditGroup {
        name: String::new(),
        entities: vec![CreditedEntity::default()],
    });
}

/// Validate credit groups under `prefix` (e.g. `writingCredits`)
pub fn validate_groups(
    errors: &mut ValidationErrors,
    prefix: &str,
    groups: &[CreditGroup],
    rules: CreditRules<'_>,
) {
    for (group_index, group) in groups.iter().enumerate() {
        let group_prefix = format!("{}[{}]", prefix, group_index);
        errors.check_length(&format!("{}.name", group_prefix), &group.name);

        if rules.requires_group_name && group.name.is_empty() && group.is_writable() {
            errors.add(format!("{}.name", group_prefix), TOO_SHORT);
        }

        validate_entities(errors, &format!("{}.entities", group_prefix), &group.entities, rules);
    }
}

/// Validate a list of credited entities (one group or one nomination)
pub fn validate_entities(
    errors: &mut ValidationErrors,
    prefix: &str,
    entities: &[CreditedEntity],
    rules: CreditRules<'_>,
) {
    let mut seen = DuplicateTracker::default();

    for (entity_index, entity) in entities.iter().enumerate() {
        if entity.is_blank() {
            continue;
        }

        let entity_prefix = format!("{}[{}]", prefix, entity_index);
        let has_members = entity.members().iter().any(|m| !m.is_blank());
        errors.check_reference(&entity_prefix, entity.name(), entity.differentiator(), has_members);

        if entity.label() == Label::Material && !rules.permits_material {
            errors.add(format!("{}.model", entity_prefix), MATERIAL_NOT_PERMITTED);
        }

        if entity.label() == Label::Material
            && rules.subject == Some((entity.name(), entity.differentiator()))
        {
            errors.add(format!("{}.name", entity_prefix), SELF_ASSOCIATION);
            errors.add(format!("{}.differentiator", entity_prefix), SELF_ASSOCIATION);
        }

        if entity.is_writable()
            && seen.check([entity.label().as_str(), entity.name(), entity.differentiator()])
        {
            errors.add(format!("{}.name", entity_prefix), DUPLICATE_IN_GROUP);
            errors.add(format!("{}.differentiator", entity_prefix), DUPLICATE_IN_GROUP);
        }

        validate_members(errors, &format!("{}.members", entity_prefix), entity.members());
    }
}

fn validate_members(errors: &mut ValidationErrors, prefix: &str, members: &[NamedEntity]) {
    let mut seen = DuplicateTracker::default();

    for (member_index, member) in members.iter().enumerate() {
        if member.is_blank() {
            continue;
        }

        let member_prefix = format!("{}[{}]", prefix, member_index);
        errors.check_reference(&member_prefix, &member.name, &member.differentiator, false);

        if !member.name.is_empty() && seen.check([&member.name, &member.differentiator]) {
            errors.add(format!("{}.name", member_prefix), DUPLICATE_IN_GROUP);
            errors.add(format!("{}.differentiator", member_prefix), DUPLICATE_IN_GROUP);
        }
    }
}

/// Reference to an existing hierarchy child by uuid
///
/// `name` is filled in on edit forms for display and ignored on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubItemRef {
    #[serde(deserialize_with = "null_as_empty")]
    pub uuid: String,
    #[serde(skip_deserializing)]
    pub name: String,
}

impl SubItemRef {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.uuid.trim().is_empty()
    }
}

pub(crate) fn normalize_sub_items(items: &mut [SubItemRef]) {
    items.iter_mut().for_each(|item| trim(&mut item.uuid));
}
