use async_trait::async_trait;

use webhelm_core_types::{BrowserAction, BrowserState, BrowserStep};

/// The decision oracle seam.
///
/// Implementations turn the observed state plus history into the next
/// declarative action. The loop treats this as a black box: whatever error
/// an implementation returns propagates out of `step()`/`start()`
/// unmodified, by design, so oracle misbehavior is never masked.
#[async_trait]
pub trait ActionPlanner: Send + Sync {
    async fn plan_action(
        &self,
        goal: &str,
        additional_context: &str,
        additional_instructions: &[String],
        current_state: &BrowserState,
        session_history: &[BrowserStep],
    ) -> anyhow::Result<BrowserAction>;
}

/// Human-in-the-loop hook invoked between steps when
/// [`crate::AgentConfig::pause_after_each_action`] is set.
#[async_trait]
pub trait StepGate: Send + Sync {
    /// Block until the operator allows the next step.
    async fn confirm(&self);
}

/// Gate that never blocks; the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGate;

#[async_trait]
impl StepGate for NoopGate {
    async fn confirm(&self) {}
}
