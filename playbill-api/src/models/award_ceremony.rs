//! Award ceremony form: owning award, categories and nominations

use super::credits::{validate_entities, CreditRules, CreditedEntity, NamedEntity};
use super::validation::{DuplicateTracker, ValidationErrors, DUPLICATE_IN_GROUP, TOO_SHORT};
use super::trim;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwardCeremonyForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    pub award: NamedEntity,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub name: String,
    pub nominations: Vec<Nomination>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nomination {
    pub is_winner: bool,
    pub entities: Vec<CreditedEntity>,
}

impl Nomination {
    pub fn is_writable(&self) -> bool {
        self.entities.iter().any(CreditedEntity::is_writable)
    }
}

impl Category {
    pub fn is_writable(&self) -> bool {
        !self.name.is_empty() || self.nominations.iter().any(Nomination::is_writable)
    }
}

impl AwardCeremonyForm {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        self.award.normalize();
        for category in &mut self.categories {
            trim(&mut category.name);
            for nomination in &mut category.nominations {
                nomination.entities.iter_mut().for_each(CreditedEntity::normalize);
            }
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_name("name", &self.name);
        errors.require_name("award.name", &self.award.name);
        errors.check_length("award.differentiator", &self.award.differentiator);

        let rules = CreditRules {
            requires_group_name: false,
            permits_material: false,
            subject: None,
        };

        let mut seen = DuplicateTracker::default();
        for (category_index, category) in self.categories.iter().enumerate() {
            let prefix = format!("categories[{}]", category_index);
            let name_field = format!("{}.name", prefix);
            errors.check_length(&name_field, &category.name);

            let has_nominations = category.nominations.iter().any(Nomination::is_writable);
            if category.name.is_empty() && has_nominations {
                errors.add(&name_field, TOO_SHORT);
            }
            if !category.name.is_empty() && seen.check([&category.name]) {
                errors.add(&name_field, DUPLICATE_IN_GROUP);
            }

            for (nomination_index, nomination) in category.nominations.iter().enumerate() {
                validate_entities(
                    &mut errors,
                    &format!("{}.nominations[{}].entities", prefix, nomination_index),
                    &nomination.entities,
                    rules,
                );
            }
        }

        errors
    }

    pub fn add_placeholders(&mut self) {
        for category in &mut self.categories {
            for nomination in &mut category.nominations {
                nomination.entities.iter_mut().for_each(CreditedEntity::add_placeholders);
                nomination.entities.push(CreditedEntity::default());
            }
            category.nominations.push(Nomination {
                is_winner: false,
                entities: vec![CreditedEntity::default()],
            });
        }
        self.categories.push(Category {
            name: String::new(),
            nominations: vec![Nomination {
                is_winner: false,
                entities: vec![CreditedEntity::default()],
            }],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person(name: &str) -> CreditedEntity {
        CreditedEntity::Person(NamedEntity::new(name, ""))
    }

    #[test]
    fn test_deserializes_nominations() {
        let form: AwardCeremonyForm = serde_json::from_value(json!({
            "name": "2020",
            "award": { "name": "Laurence Olivier Awards" },
            "categories": [{
                "name": "Best Actor",
                "nominations": [
                    { "isWinner": true, "entities": [{ "model": "PERSON", "name": "Andrew Scott" }] },
                    { "entities": [{ "model": "COMPANY", "name": "Fuel", "members": [{ "name": "Kate McGrath" }] }] }
                ]
            }]
        }))
        .unwrap();

        let nominations = &form.categories[0].nominations;
        assert!(nominations[0].is_winner);
        assert!(!nominations[1].is_winner);
        assert_eq!(nominations[1].entities[0].members()[0].name, "Kate McGrath");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_award_required() {
        let form = AwardCeremonyForm {
            name: "2020".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().get("award.name").unwrap(), [TOO_SHORT.to_string()]);
    }

    #[test]
    fn test_category_with_nominations_requires_name() {
        let form = AwardCeremonyForm {
            uuid: None,
            name: "2020".to_string(),
            award: NamedEntity::new("Evening Standard Theatre Awards", ""),
            categories: vec![Category {
                name: String::new(),
                nominations: vec![Nomination {
                    is_winner: false,
                    entities: vec![person("Andrew Scott")],
                }],
            }],
        };
        assert_eq!(form.validate().get("categories[0].name").unwrap(), [TOO_SHORT.to_string()]);
    }

    #[test]
    fn test_placeholders() {
        let mut form = AwardCeremonyForm {
            categories: vec![Category {
                name: "Best Actor".to_string(),
                nominations: vec![Nomination {
                    is_winner: true,
                    entities: vec![person("Andrew Scott")],
                }],
            }],
            ..Default::default()
        };
        form.add_placeholders();

        assert_eq!(form.categories.len(), 2);
        assert_eq!(form.categories[0].nominations.len(), 2);
        assert_eq!(form.categories[0].nominations[0].entities.len(), 2);
        assert_eq!(form.categories[1].nominations[0].entities.len(), 1);
    }
}
