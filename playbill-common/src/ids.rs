//! Identity generation
//!
//! The generator is injected wherever new nodes are allocated so tests can
//! substitute [`SequentialIds`] for the random production generator.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of identities for newly created nodes
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Uuid;
}

/// UUIDv4 generator used by the service
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic generator: `00000000-0000-0000-0000-000000000001`, `...0002`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> Uuid {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Uuid::from_u128(u128::from(n))
    }
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_ordered() {
        let ids = SequentialIds::new();
        assert_eq!(
            ids.generate().to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            ids.generate().to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn test_random_ids_differ() {
        let ids = RandomIds;
        assert_ne!(ids.generate(), ids.generate());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("not-a-uuid").is_err());
        assert!(parse("00000000-0000-0000-0000-000000000001").is_ok());
    }
}
