//! The observe -> decide -> act control loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use webhelm_actions::{dispatch, ActionTranslator};
use webhelm_core_types::{
    ActionKind, BrowserAction, BrowserState, BrowserStep, Coordinate, GoalState, TabRegistry,
    ViewportSize,
};
use webhelm_driver::Driver;
use webhelm_perceiver::{CaptureConfig, ScreenshotAnnotator, StateCapture};
use webhelm_scaling::ScalingRatio;

use crate::config::AgentConfig;
use crate::errors::AgentError;
use crate::planner::{ActionPlanner, NoopGate, StepGate};

/// Drives a browser toward a goal by repeatedly capturing state, asking the
/// oracle for the next action, and executing it.
///
/// One agent owns one run: its history is append-only, its tab registry is
/// monotonic, and neither is shared with any other agent instance. The
/// state machine is `Initial -> Running -> {Success, Failed,
/// BudgetExceeded}`.
pub struct BrowserAgent {
    driver: Arc<dyn Driver>,
    planner: Arc<dyn ActionPlanner>,
    goal: String,
    config: AgentConfig,
    capture: StateCapture,
    annotator: ScreenshotAnnotator,
    translator: ActionTranslator,
    gate: Arc<dyn StepGate>,
    status: GoalState,
    history: Vec<BrowserStep>,
    consecutive_rejections: u32,
}

impl BrowserAgent {
    pub fn new(
        driver: Arc<dyn Driver>,
        planner: Arc<dyn ActionPlanner>,
        goal: impl Into<String>,
        config: AgentConfig,
    ) -> Self {
        let capture = StateCapture::new(
            Arc::clone(&driver),
            CaptureConfig {
                screenshot_timeout_ms: config.screenshot_timeout_ms,
                screenshot_attempts: config.screenshot_attempts,
            },
        );
        let translator = ActionTranslator::new(config.jitter_threshold);

        Self {
            driver,
            planner,
            goal: goal.into(),
            config,
            capture,
            annotator: ScreenshotAnnotator::new(),
            translator,
            gate: Arc::new(NoopGate),
            status: GoalState::Initial,
            history: Vec::new(),
            consecutive_rejections: 0,
        }
    }

    /// Install a human-in-the-loop gate, consulted between steps when
    /// `pause_after_each_action` is configured.
    pub fn with_gate(mut self, gate: Arc<dyn StepGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn status(&self) -> GoalState {
        self.status
    }

    /// The completed steps of this run, oldest first.
    pub fn history(&self) -> &[BrowserStep] {
        &self.history
    }

    /// Tab ids observed so far.
    pub fn tabs(&self) -> &TabRegistry {
        self.capture.registry()
    }

    /// Explanation for a failed run: the reasoning recorded on the last
    /// step.
    pub fn failure_reason(&self) -> Option<&str> {
        self.history.last().map(|step| step.action.reasoning.as_str())
    }

    /// Execute one observe -> decide -> act cycle.
    ///
    /// Terminal oracle decisions (`success`/`failure`) set the status and
    /// append nothing; nothing is dispatched for them. A driver failure
    /// during dispatch is recorded in history as a `failure`-kind action
    /// carrying the error text, and the loop stays live so the oracle can
    /// react on the next cycle.
    pub async fn step(&mut self) -> Result<(), AgentError> {
        let mut state = self.capture.capture().await?;
        if self.config.annotate_screenshots {
            match self.annotator.annotate(&state) {
                Ok(marked) => state.screenshot = marked,
                Err(err) => warn!(%err, "screenshot annotation failed, passing raw frame"),
            }
        }

        let action = self
            .planner
            .plan_action(
                &self.goal,
                &self.config.additional_context,
                &self.config.additional_instructions,
                &state,
                &self.history,
            )
            .await
            .map_err(AgentError::Planner)?;

        debug!(kind = action.kind.name(), reasoning = %action.reasoning, "oracle decided");

        match action.kind {
            ActionKind::Success => {
                info!("goal achieved");
                self.status = GoalState::Success;
                return Ok(());
            }
            ActionKind::Failure => {
                warn!(reasoning = %action.reasoning, "oracle declared failure");
                self.status = GoalState::Failed;
                return Ok(());
            }
            _ => {}
        }

        self.status = GoalState::Running;
        self.execute(action, state).await
    }

    async fn execute(
        &mut self,
        action: BrowserAction,
        state: BrowserState,
    ) -> Result<(), AgentError> {
        let ratio = ScalingRatio::for_viewport(
            ViewportSize::new(state.width, state.height),
            self.config.scaling,
        )?;
        let plan = self
            .translator
            .plan(&action, &state, self.capture.registry(), &ratio)?;

        match dispatch(self.driver.as_ref(), &plan).await {
            Ok(()) => {
                self.consecutive_rejections = 0;
                self.history.push(BrowserStep { state, action });
            }
            Err(err) => {
                warn!(%err, kind = action.kind.name(), "action failed at the driver");
                let failure = BrowserAction::failure(err.to_string(), action.id.clone());
                self.history.push(BrowserStep {
                    state,
                    action: failure,
                });
            }
        }
        Ok(())
    }

    /// Run the loop until a terminal state or the step budget is exhausted.
    ///
    /// Performs one trivial pointer move first so the pointer has a defined
    /// starting position, then steps while the run is open and history is
    /// within `max_steps`, sleeping `wait_after_step_ms` between steps.
    /// Rejected actions (validation failures, unknown tabs) are logged and
    /// the loop continues, up to `max_consecutive_rejections` in a row.
    /// Oracle errors propagate immediately.
    pub async fn start(&mut self) -> Result<(), AgentError> {
        self.driver.move_mouse_to(Coordinate::new(1, 1)).await?;

        while !self.status.is_terminal() && self.history.len() <= self.config.max_steps as usize {
            match self.step().await {
                Ok(()) => {}
                Err(AgentError::Translate(err)) => {
                    self.consecutive_rejections += 1;
                    warn!(
                        %err,
                        rejections = self.consecutive_rejections,
                        "oracle action rejected, continuing"
                    );
                    if self.consecutive_rejections >= self.config.max_consecutive_rejections {
                        warn!("too many consecutive rejected actions, declaring failure");
                        self.status = GoalState::Failed;
                    }
                }
                Err(other) => return Err(other),
            }

            if self.config.wait_after_step_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.wait_after_step_ms)).await;
            }

            if self.config.pause_after_each_action {
                self.gate.confirm().await;
            }
        }

        if !self.status.is_terminal() {
            info!(
                steps = self.history.len(),
                max_steps = self.config.max_steps,
                "step budget exhausted"
            );
            self.status = GoalState::BudgetExceeded;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use webhelm_core_types::ActionKind;
    use webhelm_driver::testing::FakeDriver;
    use webhelm_driver::DriverError;

    struct ScriptedPlanner {
        script: Mutex<VecDeque<BrowserAction>>,
        calls: AtomicU32,
    }

    impl ScriptedPlanner {
        fn new(actions: Vec<BrowserAction>) -> Self {
            Self {
                script: Mutex::new(actions.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ActionPlanner for ScriptedPlanner {
        async fn plan_action(
            &self,
            _goal: &str,
            _additional_context: &str,
            _additional_instructions: &[String],
            _current_state: &BrowserState,
            _session_history: &[BrowserStep],
        ) -> anyhow::Result<BrowserAction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    fn fast_config() -> AgentConfig {
        AgentConfig::new().wait_after_step(0)
    }

    fn act(kind: ActionKind) -> BrowserAction {
        BrowserAction::new(kind, "scripted", "act-test")
    }

    #[tokio::test]
    async fn success_short_circuits_without_dispatch() {
        let driver = Arc::new(FakeDriver::new());
        let planner = Arc::new(ScriptedPlanner::new(vec![act(ActionKind::Success)]));
        let mut agent = BrowserAgent::new(driver.clone(), planner, "goal", fast_config());

        agent.step().await.unwrap();
        assert_eq!(agent.status(), GoalState::Success);
        assert!(agent.history().is_empty());
        assert_eq!(driver.input_dispatch_count(), 0);
    }

    #[tokio::test]
    async fn failure_sets_status_and_appends_nothing() {
        let driver = Arc::new(FakeDriver::new());
        let planner = Arc::new(ScriptedPlanner::new(vec![act(ActionKind::Failure)]));
        let mut agent = BrowserAgent::new(driver, planner, "goal", fast_config());

        agent.step().await.unwrap();
        assert_eq!(agent.status(), GoalState::Failed);
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn non_terminal_step_appends_history() {
        let driver = Arc::new(FakeDriver::new());
        driver.set_pointer(Coordinate::new(100, 100));
        let planner = Arc::new(ScriptedPlanner::new(vec![act(ActionKind::ScrollDown)]));
        let mut agent = BrowserAgent::new(driver.clone(), planner, "goal", fast_config());

        agent.step().await.unwrap();
        assert_eq!(agent.status(), GoalState::Running);
        assert_eq!(agent.history().len(), 1);
        assert_eq!(agent.history()[0].action.kind, ActionKind::ScrollDown);
        assert!(driver.calls().contains(&"scroll_by(810)".to_string()));
    }

    #[tokio::test]
    async fn driver_error_is_recorded_as_failure_step() {
        let driver = Arc::new(FakeDriver::new());
        driver.fail_inputs(DriverError::NotInteractable("button covered".into()));
        let planner = Arc::new(ScriptedPlanner::new(vec![act(ActionKind::ScrollDown)]));
        let mut agent = BrowserAgent::new(driver, planner, "goal", fast_config());

        agent.step().await.unwrap();
        assert_eq!(agent.status(), GoalState::Running);
        assert_eq!(agent.history().len(), 1);
        let recorded = &agent.history()[0].action;
        assert_eq!(recorded.kind, ActionKind::Failure);
        assert!(recorded.reasoning.contains("button covered"));
        assert_eq!(agent.failure_reason(), Some(recorded.reasoning.as_str()));
    }

    #[tokio::test]
    async fn unknown_tab_is_fatal_for_the_attempt_only() {
        let driver = Arc::new(FakeDriver::new());
        let planner = Arc::new(ScriptedPlanner::new(vec![act(ActionKind::SwitchTab {
            tab_id: 99,
        })]));
        let mut agent = BrowserAgent::new(driver, planner, "goal", fast_config());

        let err = agent.step().await.unwrap_err();
        assert!(matches!(err, AgentError::Translate(_)));
        assert!(agent.history().is_empty());
        assert_eq!(agent.status(), GoalState::Running);
    }

    #[tokio::test]
    async fn planner_errors_propagate() {
        let driver = Arc::new(FakeDriver::new());
        let planner = Arc::new(ScriptedPlanner::new(Vec::new()));
        let mut agent = BrowserAgent::new(driver, planner, "goal", fast_config());

        let err = agent.step().await.unwrap_err();
        assert!(matches!(err, AgentError::Planner(_)));
    }

    #[tokio::test]
    async fn start_runs_to_success() {
        let driver = Arc::new(FakeDriver::new());
        let planner = Arc::new(ScriptedPlanner::new(vec![
            act(ActionKind::ScrollDown),
            act(ActionKind::Success),
        ]));
        let mut agent = BrowserAgent::new(driver.clone(), planner.clone(), "goal", fast_config());

        agent.start().await.unwrap();
        assert_eq!(agent.status(), GoalState::Success);
        assert_eq!(agent.history().len(), 1);
        assert_eq!(planner.calls(), 2);
        // The initial pointer-positioning move ran first.
        assert_eq!(driver.calls()[0], "move_to(1,1)");
    }

    #[tokio::test]
    async fn zero_budget_runs_exactly_one_cycle() {
        let driver = Arc::new(FakeDriver::new());
        let planner = Arc::new(ScriptedPlanner::new(vec![
            act(ActionKind::ScrollDown),
            act(ActionKind::ScrollDown),
        ]));
        let mut agent = BrowserAgent::new(
            driver,
            planner.clone(),
            "goal",
            fast_config().max_steps(0),
        );

        agent.start().await.unwrap();
        assert_eq!(planner.calls(), 1);
        assert_eq!(agent.status(), GoalState::BudgetExceeded);
    }

    #[tokio::test]
    async fn repeated_rejections_fail_the_run() {
        let driver = Arc::new(FakeDriver::new());
        let planner = Arc::new(ScriptedPlanner::new(vec![
            act(ActionKind::SwitchTab { tab_id: 99 }),
            act(ActionKind::SwitchTab { tab_id: 99 }),
            act(ActionKind::SwitchTab { tab_id: 99 }),
            act(ActionKind::ScrollDown),
        ]));
        let mut agent = BrowserAgent::new(driver, planner.clone(), "goal", fast_config());

        agent.start().await.unwrap();
        assert_eq!(agent.status(), GoalState::Failed);
        assert_eq!(planner.calls(), 3);
        assert!(agent.history().is_empty());
    }
}
