//! Transition condition evaluation.
//!
//! Template transitions carry an optional free-text `condition`. No
//! expression language is defined for it; instead the engine takes a
//! [`ConditionEvaluator`] so deployments can plug in their own semantics.
//! The shipped default treats every transition as eligible.

/// Decides whether a transition may be traversed.
pub trait ConditionEvaluator: Send + Sync {
    /// Evaluate a transition condition against the instance's variables.
    ///
    /// `condition` is the raw string from the template definition (`None`
    /// when the transition has no condition). Implementations must not
    /// mutate state and should be cheap; this runs once per candidate edge
    /// on every auto-flow pass.
    fn evaluate(&self, condition: Option<&str>, variables: &serde_json::Value) -> bool;
}

/// Default evaluator: every transition is eligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTrue;

impl ConditionEvaluator for AlwaysTrue {
    fn evaluate(&self, _condition: Option<&str>, _variables: &serde_json::Value) -> bool {
        true
    }
}
