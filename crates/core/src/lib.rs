//! Domain types for the oversight workflow engine.
//!
//! This crate is shared by the persistence layer (`oversight-db`) and the
//! engine (`oversight-workflow`). It holds the pieces that have no business
//! touching a connection pool: status enums, the parsed template graph,
//! assignment targets, the condition-evaluation seam, instance numbering,
//! and the error taxonomy.

pub mod assignee;
pub mod condition;
pub mod error;
pub mod graph;
pub mod numbering;
pub mod status;
pub mod types;
