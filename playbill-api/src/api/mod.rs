//! HTTP API handlers for playbill-api
//!
//! One module per collection, each exposing a `*_routes()` builder. Handlers
//! only extract the request and hand it to the matching service.

pub mod award_ceremonies;
pub mod awards;
pub mod characters;
pub mod companies;
pub mod health;
pub mod materials;
pub mod people;
pub mod productions;
pub mod venues;

pub use award_ceremonies::award_ceremony_routes;
pub use awards::award_routes;
pub use characters::character_routes;
pub use companies::company_routes;
pub use health::health_routes;
pub use materials::material_routes;
pub use people::person_routes;
pub use productions::production_routes;
pub use venues::venue_routes;

use crate::error::{ApiError, ApiResult};

/// Accept a path segment only if it is a well-formed uuid
///
/// Malformed identifiers answer 404 like unknown ones.
pub(crate) fn uuid_param(raw: &str) -> ApiResult<&str> {
    playbill_common::ids::parse(raw)
        .map(|_| raw)
        .map_err(|_| ApiError::NotFound(raw.to_string()))
}
