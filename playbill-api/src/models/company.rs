//! Company form: identity plus ordered members

use super::credits::NamedEntity;
use super::validation::{DuplicateTracker, ValidationErrors, DUPLICATE_IN_GROUP};
use super::{null_as_empty, trim};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
    pub members: Vec<NamedEntity>,
}

impl CompanyForm {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.differentiator);
        self.members.iter_mut().for_each(NamedEntity::normalize);
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_name("name", &self.name);
        errors.check_length("differentiator", &self.differentiator);

        let mut seen = DuplicateTracker::default();
        for (index, member) in self.members.iter().enumerate() {
            if member.is_blank() {
                continue;
            }
            let prefix = format!("members[{}]", index);
            errors.check_reference(&prefix, &member.name, &member.differentiator, false);
            if !member.name.is_empty() && seen.check([&member.name, &member.differentiator]) {
                errors.add(format!("{}.name", prefix), DUPLICATE_IN_GROUP);
                errors.add(format!("{}.differentiator", prefix), DUPLICATE_IN_GROUP);
            }
        }
        errors
    }

    pub fn add_placeholders(&mut self) {
        self.members.push(NamedEntity::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_members() {
        let form = CompanyForm {
            name: "Fuel".to_string(),
            members: vec![
                NamedEntity::new("Kate McGrath", ""),
                NamedEntity::new("Kate McGrath", ""),
                NamedEntity::new("Kate McGrath", "1"),
            ],
            ..Default::default()
        };
        let errors = form.validate();
        assert!(errors.get("members[1].name").is_some());
        assert!(errors.get("members[2].name").is_none());
    }

    #[test]
    fn test_member_differentiator_without_name() {
        let form = CompanyForm {
            name: "Fuel".to_string(),
            members: vec![NamedEntity::new("", "2")],
            ..Default::default()
        };
        assert!(form.validate().get("members[0].name").is_some());
    }
}
