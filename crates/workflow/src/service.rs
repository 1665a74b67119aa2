//! The engine service: shared state and construction.
//!
//! Operation implementations are split by area: [`crate::templates`],
//! [`crate::instances`], [`crate::tasks`], [`crate::flow`],
//! [`crate::stats`].

use std::sync::Arc;

use serde::Serialize;

use oversight_core::condition::{AlwaysTrue, ConditionEvaluator};
use oversight_core::error::CoreError;
use oversight_core::graph::TemplateGraph;
use oversight_core::status::FlowBehavior;
use oversight_db::models::workflow::WorkflowTemplate;
use oversight_db::DbPool;

use crate::cache::GraphCache;
use crate::flow::FlowOutcome;
use crate::notify::{LogNotifier, WorkflowNotifier};

/// Default page size for listing operations.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for listing operations.
pub const MAX_LIMIT: i64 = 100;

/// One page of a listing plus the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// The workflow engine.
///
/// Cheaply cloneable: the pool, the graph cache, and the pluggable seams
/// are all shared. One instance per process is the expected shape.
#[derive(Clone)]
pub struct WorkflowService {
    pub(crate) pool: DbPool,
    pub(crate) graphs: GraphCache,
    pub(crate) conditions: Arc<dyn ConditionEvaluator>,
    pub(crate) notifier: Arc<dyn WorkflowNotifier>,
}

impl WorkflowService {
    /// Build a service with the default seams: every transition condition
    /// evaluates to true and notifications are logged.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            graphs: GraphCache::default(),
            conditions: Arc::new(AlwaysTrue),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Replace the transition condition evaluator.
    pub fn with_condition_evaluator(mut self, conditions: Arc<dyn ConditionEvaluator>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn WorkflowNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Parsed graph for a template, via the cache.
    pub(crate) fn graph_for(
        &self,
        template: &WorkflowTemplate,
    ) -> Result<Arc<TemplateGraph>, CoreError> {
        self.graphs.get_or_parse(template)
    }

    /// Deliver notifications for a committed flow outcome.
    pub(crate) async fn emit(&self, outcome: &FlowOutcome) {
        for node in &outcome.activated {
            // END nodes are reported as instance completion, not as tasks.
            if node.node_type.flow_behavior() == FlowBehavior::Activate {
                self.notifier.task_activated(node).await;
            }
        }
        if let Some(instance_id) = outcome.completed_instance {
            self.notifier.instance_completed(instance_id).await;
        }
    }

    /// Clamp a caller-supplied page size to `1..=MAX_LIMIT`.
    pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}
