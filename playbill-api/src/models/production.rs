//! Production form: dates, material and venue references, sub-productions,
//! credits and cast

use super::credits::{
    add_group_placeholders, normalize_groups, normalize_sub_items, validate_groups, CreditGroup,
    CreditRules, NamedEntity, SubItemRef,
};
use super::validation::{DuplicateTracker, ValidationErrors, DUPLICATE_IN_GROUP, INVALID_DATE};
use super::{null_as_empty, trim};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const END_BEFORE_START: &str = "End date must not be before start date";
pub const PRESS_OUT_OF_RANGE: &str = "Press date must be between start date and end date";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub press_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub end_date: String,
    pub material: NamedEntity,
    pub venue: NamedEntity,
    pub sub_productions: Vec<SubItemRef>,
    pub producer_credits: Vec<CreditGroup>,
    pub cast: Vec<CastMember>,
    pub creative_credits: Vec<CreditGroup>,
    pub crew_credits: Vec<CreditGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CastMember {
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
    pub roles: Vec<Role>,
}

/// A part played by a cast member
///
/// `character_name` is only given when the role is a variant name of the
/// character (e.g. role "Ghost" for character "Ghost of King Hamlet").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Role {
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub character_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub character_differentiator: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub qualifier: String,
    pub is_alternate: bool,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.character_name.is_empty()
            && self.character_differentiator.is_empty()
            && self.qualifier.is_empty()
    }
}

impl CastMember {
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.differentiator.is_empty() && self.roles.iter().all(Role::is_blank)
    }
}

/// Parse an ISO `YYYY-MM-DD` date; blank is `None`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

impl ProductionForm {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.start_date);
        trim(&mut self.press_date);
        trim(&mut self.end_date);
        self.material.normalize();
        self.venue.normalize();
        normalize_sub_items(&mut self.sub_productions);
        normalize_groups(&mut self.producer_credits);
        normalize_groups(&mut self.creative_credits);
        normalize_groups(&mut self.crew_credits);
        for member in &mut self.cast {
            trim(&mut member.name);
            trim(&mut member.differentiator);
            for role in &mut member.roles {
                trim(&mut role.name);
                trim(&mut role.character_name);
                trim(&mut role.character_differentiator);
                trim(&mut role.qualifier);
            }
        }
    }

    /// Checks that need no datastore access
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_name("name", &self.name);
        self.validate_dates(&mut errors);

        errors.check_reference("material", &self.material.name, &self.material.differentiator, false);
        errors.check_reference("venue", &self.venue.name, &self.venue.differentiator, false);

        let rules = |requires_group_name| CreditRules {
            requires_group_name,
            permits_material: false,
            subject: None,
        };
        validate_groups(&mut errors, "producerCredits", &self.producer_credits, rules(false));
        validate_groups(&mut errors, "creativeCredits", &self.creative_credits, rules(true));
        validate_groups(&mut errors, "crewCredits", &self.crew_credits, rules(true));

        self.validate_cast(&mut errors);
        errors
    }

    fn validate_dates(&self, errors: &mut ValidationErrors) {
        let mut parse = |field: &str, value: &str| {
            if value.is_empty() {
                return None;
            }
            let date = parse_date(value);
            if date.is_none() {
                errors.add(field, INVALID_DATE);
            }
            date
        };

        let start = parse("startDate", &self.start_date);
        let press = parse("pressDate", &self.press_date);
        let end = parse("endDate", &self.end_date);

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add("startDate", END_BEFORE_START);
                errors.add("endDate", END_BEFORE_START);
            }
        }
        if let Some(press) = press {
            if start.is_some_and(|start| press < start) || end.is_some_and(|end| press > end) {
                errors.add("pressDate", PRESS_OUT_OF_RANGE);
            }
        }
    }

    fn validate_cast(&self, errors: &mut ValidationErrors) {
        let mut seen_members = DuplicateTracker::default();

        for (member_index, member) in self.cast.iter().enumerate() {
            if member.is_blank() {
                continue;
            }
            let prefix = format!("cast[{}]", member_index);
            let has_roles = member.roles.iter().any(|r| !r.is_blank());
            errors.check_reference(&prefix, &member.name, &member.differentiator, has_roles);

            if !member.name.is_empty() && seen_members.check([&member.name, &member.differentiator]) {
                errors.add(format!("{}.name", prefix), DUPLICATE_IN_GROUP);
                errors.add(format!("{}.differentiator", prefix), DUPLICATE_IN_GROUP);
            }

            let mut seen_roles = DuplicateTracker::default();
            for (role_index, role) in member.roles.iter().enumerate() {
                if role.is_blank() {
                    continue;
                }
                let role_prefix = format!("{}.roles[{}]", prefix, role_index);
                let has_detail = !role.character_name.is_empty()
                    || !role.character_differentiator.is_empty()
                    || !role.qualifier.is_empty();
                if role.name.is_empty() && has_detail {
                    errors.add(format!("{}.name", role_prefix), super::validation::TOO_SHORT);
                }
                errors.check_length(&format!("{}.name", role_prefix), &role.name);
                errors.check_length(&format!("{}.characterName", role_prefix), &role.character_name);
                errors.check_length(
                    &format!("{}.characterDifferentiator", role_prefix),
                    &role.character_differentiator,
                );
                errors.check_length(&format!("{}.qualifier", role_prefix), &role.qualifier);

                if !role.name.is_empty()
                    && seen_roles.check([
                        &role.name,
                        &role.character_name,
                        &role.character_differentiator,
                        &role.qualifier,
                    ])
                {
                    errors.add(format!("{}.name", role_prefix), DUPLICATE_IN_GROUP);
                }
            }
        }
    }

    /// Append one empty entry to every repeatable collection
    pub fn add_placeholders(&mut self) {
        self.sub_productions.push(SubItemRef::default());
        add_group_placeholders(&mut self.producer_credits);
        add_group_placeholders(&mut self.creative_credits);
        add_group_placeholders(&mut self.crew_credits);
        for member in &mut self.cast {
            member.roles.push(Role::default());
        }
        self.cast.push(CastMember {
            roles: vec![Role::default()],
            ..Default::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::TOO_SHORT;
    use crate::models::CreditedEntity;
    use serde_json::json;

    fn named(name: &str) -> ProductionForm {
        ProductionForm {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserializes_cast_and_roles() {
        let form: ProductionForm = serde_json::from_value(json!({
            "name": "Hamlet",
            "startDate": "2009-05-19",
            "material": { "name": "The Tragedy of Hamlet, Prince of Denmark" },
            "venue": { "name": "Novello Theatre", "differentiator": null },
            "cast": [{
                "name": "Patrick Stewart",
                "roles": [
                    { "name": "Ghost", "characterName": "Ghost of King Hamlet" },
                    { "name": "Claudius", "isAlternate": false }
                ]
            }]
        }))
        .unwrap();

        assert_eq!(form.venue.differentiator, "");
        assert_eq!(form.cast[0].roles[0].character_name, "Ghost of King Hamlet");
        assert!(!form.cast[0].roles[1].is_alternate);
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_invalid_date() {
        let mut form = named("Hamlet");
        form.start_date = "2009-13-40".to_string();
        let errors = form.validate();
        assert_eq!(errors.get("startDate").unwrap(), [INVALID_DATE.to_string()]);
    }

    #[test]
    fn test_end_before_start() {
        let mut form = named("Hamlet");
        form.start_date = "2009-05-19".to_string();
        form.end_date = "2009-05-01".to_string();
        let errors = form.validate();
        assert_eq!(errors.get("endDate").unwrap(), [END_BEFORE_START.to_string()]);
    }

    #[test]
    fn test_press_date_outside_run() {
        let mut form = named("Hamlet");
        form.start_date = "2009-05-19".to_string();
        form.press_date = "2009-05-01".to_string();
        form.end_date = "2009-08-01".to_string();
        assert!(form.validate().get("pressDate").is_some());

        form.press_date = "2009-06-03".to_string();
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_creative_group_requires_name() {
        let mut form = named("Hamlet");
        form.creative_credits = vec![CreditGroup::new(
            "",
            vec![CreditedEntity::Person(NamedEntity::new("Gregory Doran", ""))],
        )];
        form.producer_credits = form.creative_credits.clone();

        let errors = form.validate();
        assert_eq!(errors.get("creativeCredits[0].name").unwrap(), [TOO_SHORT.to_string()]);
        assert!(errors.get("producerCredits[0].name").is_none());
    }

    #[test]
    fn test_material_not_permitted_in_producer_credits() {
        let mut form = named("Hamlet");
        form.producer_credits = vec![CreditGroup::new(
            "produced by",
            vec![CreditedEntity::Material(NamedEntity::new("Hamlet", ""))],
        )];
        assert!(form.validate().get("producerCredits[0].entities[0].model").is_some());
    }

    #[test]
    fn test_duplicate_cast_member() {
        let mut form = named("Hamlet");
        let member = CastMember {
            name: "David Tennant".to_string(),
            differentiator: String::new(),
            roles: vec![Role::new("Hamlet")],
        };
        form.cast = vec![member.clone(), member];
        assert!(form.validate().get("cast[1].name").is_some());
    }

    #[test]
    fn test_placeholders() {
        let mut form = named("Hamlet");
        form.cast = vec![CastMember {
            name: "David Tennant".to_string(),
            differentiator: String::new(),
            roles: vec![Role::new("Hamlet")],
        }];
        form.add_placeholders();

        assert_eq!(form.cast.len(), 2);
        assert_eq!(form.cast[0].roles.len(), 2);
        assert_eq!(form.cast[1].roles.len(), 1);
        assert_eq!(form.sub_productions.len(), 1);
        assert_eq!(form.crew_credits[0].entities.len(), 1);
    }
}
