//! Material form: identity, format/year, sub-materials, writing credits and
//! character groups

use super::credits::{
    add_group_placeholders, normalize_groups, normalize_sub_items, validate_groups, CreditGroup,
    CreditRules, SubItemRef,
};
use super::validation::{DuplicateTracker, ValidationErrors, DUPLICATE_IN_GROUP};
use super::{null_as_empty, trim};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub format: String,
    pub year: Option<i64>,
    pub sub_materials: Vec<SubItemRef>,
    pub writing_credits: Vec<CreditGroup>,
    pub character_groups: Vec<CharacterGroup>,
}

/// Ordered, optionally named group of characters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterGroup {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub characters: Vec<CharacterEntry>,
}

/// Character as depicted in a material
///
/// `name` is the display name. When it differs from the character's
/// canonical name, the canonical name goes in `underlying_name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterEntry {
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub underlying_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub qualifier: String,
}

impl CharacterEntry {
    pub fn new(name: &str, differentiator: &str, qualifier: &str) -> Self {
        Self {
            name: name.to_string(),
            differentiator: differentiator.to_string(),
            qualifier: qualifier.to_string(),
            ..Default::default()
        }
    }

    /// Name of the character node this entry resolves to
    pub fn character_name(&self) -> &str {
        if self.underlying_name.is_empty() {
            &self.name
        } else {
            &self.underlying_name
        }
    }

    /// Display name, when it differs from the character's name
    pub fn display_name(&self) -> Option<&str> {
        (!self.underlying_name.is_empty() && self.underlying_name != self.name)
            .then_some(self.name.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.underlying_name.is_empty()
            && self.differentiator.is_empty()
            && self.qualifier.is_empty()
    }
}

impl CharacterGroup {
    pub fn is_writable(&self) -> bool {
        self.characters.iter().any(|c| !c.name.is_empty())
    }
}

impl MaterialForm {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.differentiator);
        trim(&mut self.format);
        normalize_sub_items(&mut self.sub_materials);
        normalize_groups(&mut self.writing_credits);
        for group in &mut self.character_groups {
            trim(&mut group.name);
            for character in &mut group.characters {
                trim(&mut character.name);
                trim(&mut character.underlying_name);
                trim(&mut character.differentiator);
                trim(&mut character.qualifier);
            }
        }
    }

    /// Checks that need no datastore access
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_name("name", &self.name);
        errors.check_length("differentiator", &self.differentiator);
        errors.check_length("format", &self.format);

        validate_groups(
            &mut errors,
            "writingCredits",
            &self.writing_credits,
            CreditRules {
                requires_group_name: false,
                permits_material: true,
                subject: Some((&self.name, &self.differentiator)),
            },
        );

        for (group_index, group) in self.character_groups.iter().enumerate() {
            let group_prefix = format!("characterGroups[{}]", group_index);
            errors.check_length(&format!("{}.name", group_prefix), &group.name);

            let mut seen = DuplicateTracker::default();
            for (index, character) in group.characters.iter().enumerate() {
                if character.is_blank() {
                    continue;
                }
                let prefix = format!("{}.characters[{}]", group_prefix, index);
                errors.check_reference(
                    &prefix,
                    &character.name,
                    &character.differentiator,
                    !character.qualifier.is_empty() || !character.underlying_name.is_empty(),
                );
                errors.check_length(&format!("{}.underlyingName", prefix), &character.underlying_name);
                errors.check_length(&format!("{}.qualifier", prefix), &character.qualifier);

                if !character.name.is_empty()
                    && seen.check([
                        character.character_name(),
                        character.differentiator.as_str(),
                        character.qualifier.as_str(),
                    ])
                {
                    errors.add(format!("{}.name", prefix), DUPLICATE_IN_GROUP);
                    errors.add(format!("{}.differentiator", prefix), DUPLICATE_IN_GROUP);
                }
            }
        }

        errors
    }

    /// Append one empty entry to every repeatable collection
    pub fn add_placeholders(&mut self) {
        self.sub_materials.push(SubItemRef::default());
        add_group_placeholders(&mut self.writing_credits);
        for group in &mut self.character_groups {
            group.characters.push(CharacterEntry::default());
        }
        self.character_groups.push(CharacterGroup {
            name: String::new(),
            characters: vec![CharacterEntry::default()],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::TOO_SHORT;
    use crate::models::CreditedEntity;
    use serde_json::json;

    #[test]
    fn test_deserializes_camel_case_payload() {
        let form: MaterialForm = serde_json::from_value(json!({
            "name": "The Tempest",
            "differentiator": null,
            "format": "play",
            "year": 1611,
            "subMaterials": [{ "uuid": "00000000-0000-0000-0000-000000000001" }],
            "writingCredits": [{ "entities": [{ "model": "PERSON", "name": "William Shakespeare" }] }],
            "characterGroups": [{ "characters": [{ "name": "Prospero" }] }]
        }))
        .unwrap();

        assert_eq!(form.differentiator, "");
        assert_eq!(form.year, Some(1611));
        assert_eq!(form.sub_materials[0].uuid, "00000000-0000-0000-0000-000000000001");
        assert_eq!(form.writing_credits[0].name, "");
        assert_eq!(form.character_groups[0].characters[0].name, "Prospero");
    }

    #[test]
    fn test_normalize_trims_nested_values() {
        let mut form = MaterialForm {
            name: "  Hamlet ".to_string(),
            differentiator: " 1 ".to_string(),
            writing_credits: vec![CreditGroup::new(
                " by ",
                vec![CreditedEntity::Person(crate::models::NamedEntity::new(" William Shakespeare", ""))],
            )],
            ..Default::default()
        };
        form.normalize();

        assert_eq!(form.name, "Hamlet");
        assert_eq!(form.differentiator, "1");
        assert_eq!(form.writing_credits[0].name, "by");
        assert_eq!(form.writing_credits[0].entities[0].name(), "William Shakespeare");
    }

    #[test]
    fn test_name_required() {
        let form = MaterialForm::default();
        assert_eq!(form.validate().get("name").unwrap(), [TOO_SHORT.to_string()]);
    }

    #[test]
    fn test_repeated_character_name_with_different_qualifiers_is_valid() {
        let form = MaterialForm {
            name: "Henry IV".to_string(),
            character_groups: vec![CharacterGroup {
                name: String::new(),
                characters: vec![
                    CharacterEntry::new("Henry", "", "young"),
                    CharacterEntry::new("Henry", "", "old"),
                ],
            }],
            ..Default::default()
        };
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_duplicate_character_in_group() {
        let form = MaterialForm {
            name: "A Midsummer Night's Dream".to_string(),
            character_groups: vec![CharacterGroup {
                name: "Lovers".to_string(),
                characters: vec![
                    CharacterEntry::new("Demetrius", "", ""),
                    CharacterEntry::new("Demetrius", "", ""),
                ],
            }],
            ..Default::default()
        };
        let errors = form.validate();
        assert!(errors.get("characterGroups[0].characters[1].name").is_some());
    }

    #[test]
    fn test_underlying_name_marks_display_name() {
        let mut entry = CharacterEntry::new("Ghost", "", "");
        assert_eq!(entry.character_name(), "Ghost");
        assert_eq!(entry.display_name(), None);

        entry.underlying_name = "Ghost of King Hamlet".to_string();
        assert_eq!(entry.character_name(), "Ghost of King Hamlet");
        assert_eq!(entry.display_name(), Some("Ghost"));
    }

    #[test]
    fn test_placeholders() {
        let mut form = MaterialForm::default();
        form.add_placeholders();

        assert_eq!(form.sub_materials.len(), 1);
        assert_eq!(form.writing_credits.len(), 1);
        assert_eq!(form.writing_credits[0].entities.len(), 1);
        assert_eq!(form.character_groups.len(), 1);
        assert_eq!(form.character_groups[0].characters.len(), 1);
    }
}
