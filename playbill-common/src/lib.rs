//! # Playbill Common Library
//!
//! Shared code for the Playbill workspace:
//! - Error type and result alias
//! - Bootstrap configuration resolution
//! - Identity generation
//! - Datastore bootstrap (pool, schema) and the graph vocabulary
//!   (node labels, relationship kinds)

pub mod config;
pub mod db;
pub mod error;
pub mod ids;

pub use db::{Label, RelationshipKind};
pub use error::{Error, Result};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
