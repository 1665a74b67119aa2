//! The oversight workflow engine.
//!
//! Templates define a graph of nodes and transitions; instances execute
//! one run of a template against materialized node rows. The engine owns
//! the state transitions: instance start, task completion, and the
//! auto-flow cascade that activates downstream nodes until an END node
//! completes the instance.
//!
//! Everything is exposed through [`service::WorkflowService`]; callers
//! (HTTP handlers, schedulers) live outside this crate.

pub mod cache;
pub mod error;
pub mod flow;
pub mod instances;
pub mod notify;
pub mod service;
pub mod stats;
pub mod tasks;
pub mod templates;

pub use error::{WorkflowError, WorkflowResult};
pub use notify::{LogNotifier, NoopNotifier, WorkflowNotifier};
pub use service::{Page, WorkflowService};
