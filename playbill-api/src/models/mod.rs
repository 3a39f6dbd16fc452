//! Request payloads, form shapes and read-side views
//!
//! Each entity kind has one `*Form` type that is both the create/update
//! payload and the edit-form response body, plus view types for show/list
//! responses in [`views`].

pub mod award;
pub mod award_ceremony;
pub mod character;
pub mod company;
pub mod credits;
pub mod material;
pub mod person;
pub mod production;
pub mod validation;
pub mod venue;
pub mod views;

pub use award::AwardForm;
pub use award_ceremony::{AwardCeremonyForm, Category, Nomination};
pub use character::CharacterForm;
pub use company::CompanyForm;
pub use credits::{CompanyEntity, CreditGroup, CreditedEntity, NamedEntity, SubItemRef};
pub use material::{CharacterEntry, CharacterGroup, MaterialForm};
pub use person::PersonForm;
pub use production::{CastMember, ProductionForm, Role};
pub use validation::ValidationErrors;
pub use venue::VenueForm;

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating `null` as the empty string
///
/// Omitted, `null` and `""` differentiators share one comparison key.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trim in place
pub(crate) fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// `None` for blank strings
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
