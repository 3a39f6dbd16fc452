//! Graph queries
//!
//! Each module owns one kind of relationship structure. Read functions take
//! a plain connection; functions that remove or rebuild state take a
//! [`ReplaceDriver`] in the matching phase. The row-level primitives in
//! [`entities`] and [`graph`] take a connection; their writes only ever run
//! on a driver's connection.

pub mod cast;
pub mod characters;
pub mod credits;
pub mod entities;
pub mod graph;
pub mod hierarchy;
pub mod members;
pub mod nominations;
pub mod replace;
pub mod resolver;

pub use credits::CreditKind;
pub use entities::EntityRow;
pub use replace::{BuildPhase, DeletePhase, ReplaceDriver};
