//! Person form

use super::validation::ValidationErrors;
use super::{null_as_empty, trim};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub differentiator: String,
}

impl PersonForm {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.differentiator);
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_name("name", &self.name);
        errors.check_length("differentiator", &self.differentiator);
        errors
    }
}
