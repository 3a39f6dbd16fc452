//! Graph vocabulary: node labels and relationship kinds
//!
//! Labels double as the `model` field of every entity object in the JSON
//! API, so they serialize in SCREAMING_SNAKE_CASE.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Node label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Material,
    Production,
    Venue,
    Person,
    Company,
    Character,
    Award,
    AwardCeremony,
    AwardCeremonyCategory,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Material => "MATERIAL",
            Label::Production => "PRODUCTION",
            Label::Venue => "VENUE",
            Label::Person => "PERSON",
            Label::Company => "COMPANY",
            Label::Character => "CHARACTER",
            Label::Award => "AWARD",
            Label::AwardCeremony => "AWARD_CEREMONY",
            Label::AwardCeremonyCategory => "AWARD_CEREMONY_CATEGORY",
        }
    }

    /// Whether `(label, scope, name, differentiator)` must be unique
    ///
    /// Productions and ceremony categories are identified by uuid only.
    pub fn is_identity_constrained(&self) -> bool {
        !matches!(self, Label::Production | Label::AwardCeremonyCategory)
    }

    /// Whether nodes of this label take part in `SUB_OF` hierarchies
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, Label::Material | Label::Production | Label::Venue)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATERIAL" => Ok(Label::Material),
            "PRODUCTION" => Ok(Label::Production),
            "VENUE" => Ok(Label::Venue),
            "PERSON" => Ok(Label::Person),
            "COMPANY" => Ok(Label::Company),
            "CHARACTER" => Ok(Label::Character),
            "AWARD" => Ok(Label::Award),
            "AWARD_CEREMONY" => Ok(Label::AwardCeremony),
            "AWARD_CEREMONY_CATEGORY" => Ok(Label::AwardCeremonyCategory),
            other => Err(crate::Error::InvalidInput(format!("Unknown label: {}", other))),
        }
    }
}

/// Relationship kind (edge type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// child → parent, same label
    SubOf,
    WritingCredit,
    ProducerCredit,
    CreativeCredit,
    CrewCredit,
    HasCharacter,
    ProductionOf,
    PlaysAt,
    HasCastMember,
    HasMember,
    CeremonyOf,
    PresentsCategory,
    HasNominee,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::SubOf => "SUB_OF",
            RelationshipKind::WritingCredit => "WRITING_CREDIT",
            RelationshipKind::ProducerCredit => "PRODUCER_CREDIT",
            RelationshipKind::CreativeCredit => "CREATIVE_CREDIT",
            RelationshipKind::CrewCredit => "CREW_CREDIT",
            RelationshipKind::HasCharacter => "HAS_CHARACTER",
            RelationshipKind::ProductionOf => "PRODUCTION_OF",
            RelationshipKind::PlaysAt => "PLAYS_AT",
            RelationshipKind::HasCastMember => "HAS_CAST_MEMBER",
            RelationshipKind::HasMember => "HAS_MEMBER",
            RelationshipKind::CeremonyOf => "CEREMONY_OF",
            RelationshipKind::PresentsCategory => "PRESENTS_CATEGORY",
            RelationshipKind::HasNominee => "HAS_NOMINEE",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
