//! Datastore bootstrap and graph vocabulary

pub mod init;
pub mod models;

pub use init::*;
pub use models::*;
