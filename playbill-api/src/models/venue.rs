//! Venue form

use super::credits::{normalize_sub_items, SubItemRef};
use super::validation::ValidationErrors;
use super::{null_as_empty, trim};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VenueForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
    pub sub_venues: Vec<SubItemRef>,
}

impl VenueForm {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.differentiator);
        normalize_sub_items(&mut self.sub_venues);
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_name("name", &self.name);
        errors.check_length("differentiator", &self.differentiator);
        errors
    }

    pub fn add_placeholders(&mut self) {
        self.sub_venues.push(SubItemRef::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sub_venue_names_are_output_only() {
        let form: VenueForm = serde_json::from_value(json!({
            "name": "National Theatre",
            "subVenues": [{ "uuid": " 00000000-0000-0000-0000-000000000002 ", "name": "Olivier Theatre" }]
        }))
        .unwrap();
        assert_eq!(form.sub_venues[0].name, "");

        let mut form = form;
        form.normalize();
        assert_eq!(form.sub_venues[0].uuid, "00000000-0000-0000-0000-000000000002");
    }

    #[test]
    fn test_edit_form_shape() {
        let mut form = VenueForm::default();
        form.add_placeholders();
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({
                "name": "",
                "differentiator": "",
                "subVenues": [{ "uuid": "", "name": "" }]
            })
        );
    }
}
