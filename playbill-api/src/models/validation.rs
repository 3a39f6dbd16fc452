//! Field validation errors
//!
//! Errors are keyed by a field path such as `writingCredits[1].entities[0].name`
//! and rendered as `{ "<path>": ["<message>", ...] }`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Maximum length of any free-text field
pub const MAX_LENGTH: usize = 1000;

pub const TOO_SHORT: &str = "Value is too short";
pub const TOO_LONG: &str = "Value is too long";
pub const DUPLICATE_IDENTITY: &str = "Name and differentiator combination already exists";
pub const DUPLICATE_CEREMONY: &str = "Award ceremony already exists for given award";
pub const DUPLICATE_IN_GROUP: &str = "This item has been duplicated within the group";
pub const SELF_ASSOCIATION: &str = "Instance cannot form association with itself";
pub const INVALID_DATE: &str = "Value needs to be a valid date";
pub const MATERIAL_NOT_PERMITTED: &str = "Material entities are only permitted in writing credits";
pub const UNKNOWN_SUB_ITEM: &str = "Entity with this UUID does not exist";
pub const SELF_SUB_ITEM: &str = "Instance cannot be assigned as its own sub-item";
pub const ANCESTOR_SUB_ITEM: &str = "Instance is an ancestor of the subject and cannot be its sub-item";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: &str) {
        let messages = self.0.entry(field.into()).or_default();
        if !messages.iter().any(|m| m == message) {
            messages.push(message.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Required name: non-blank and within length
    pub fn require_name(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, TOO_SHORT);
        }
        self.check_length(field, value);
    }

    /// Optional text: within length
    pub fn check_length(&mut self, field: &str, value: &str) {
        if value.chars().count() > MAX_LENGTH {
            self.add(field, TOO_LONG);
        }
    }

    /// Name of a nested reference: only required when other fields of the
    /// reference are filled in
    pub fn check_reference(&mut self, prefix: &str, name: &str, differentiator: &str, has_children: bool) {
        let name_field = format!("{}.name", prefix);
        if name.trim().is_empty() && (!differentiator.trim().is_empty() || has_children) {
            self.add(&name_field, TOO_SHORT);
        }
        self.check_length(&name_field, name);
        self.check_length(&format!("{}.differentiator", prefix), differentiator);
    }
}

/// Tracks `(name, differentiator, ...)` keys already seen within one group
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen: Vec<Vec<String>>,
}

impl DuplicateTracker {
    /// Returns true if the key was already seen
    pub fn check<I, S>(&mut self, key: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key: Vec<String> = key.into_iter().map(|s| s.as_ref().trim().to_string()).collect();
        if self.seen.contains(&key) {
            true
        } else {
            self.seen.push(key);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_not_repeated() {
        let mut errors = ValidationErrors::new();
        errors.add("name", TOO_SHORT);
        errors.add("name", TOO_SHORT);
        assert_eq!(errors.get("name").unwrap(), [TOO_SHORT.to_string()]);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut errors = ValidationErrors::new();
        errors.add("differentiator", DUPLICATE_IDENTITY);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "differentiator": [DUPLICATE_IDENTITY] })
        );
        assert_eq!(serde_json::to_value(ValidationErrors::new()).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_reference_name_required_only_with_other_fields() {
        let mut errors = ValidationErrors::new();
        errors.check_reference("venue", "", "", false);
        assert!(errors.is_empty());

        errors.check_reference("venue", " ", "1", false);
        assert_eq!(errors.get("venue.name").unwrap(), [TOO_SHORT.to_string()]);
    }

    #[test]
    fn test_length_limit() {
        let mut errors = ValidationErrors::new();
        errors.require_name("name", &"a".repeat(MAX_LENGTH + 1));
        assert_eq!(errors.get("name").unwrap(), [TOO_LONG.to_string()]);
    }

    #[test]
    fn test_duplicate_tracker_trims() {
        let mut tracker = DuplicateTracker::default();
        assert!(!tracker.check(["Hamlet", ""]));
        assert!(tracker.check([" Hamlet ", ""]));
        assert!(!tracker.check(["Hamlet", "1"]));
    }
}
