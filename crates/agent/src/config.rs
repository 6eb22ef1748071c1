//! Run configuration.

use serde::{Deserialize, Serialize};

use webhelm_scaling::ScalingPolicy;

/// Configuration for one [`crate::BrowserAgent`] run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Free-form context handed to the oracle alongside the goal.
    pub additional_context: String,

    /// Extra oracle instructions, one per line.
    pub additional_instructions: Vec<String>,

    /// Sleep between steps in milliseconds.
    /// Default: 500
    pub wait_after_step_ms: u64,

    /// Whether to block on the step gate after each step.
    /// Default: false
    pub pause_after_each_action: bool,

    /// Step budget: the loop stops once history exceeds this length.
    /// Default: 50
    pub max_steps: u32,

    /// Native-pixel distance under which pointer moves become clicks.
    /// Default: 5.0
    pub jitter_threshold: f64,

    /// How native coordinates map onto the oracle's normalized space.
    pub scaling: ScalingPolicy,

    /// Whether captured screenshots are annotated before the oracle sees
    /// them. Default: true
    pub annotate_screenshots: bool,

    /// First screenshot attempt timeout in milliseconds; doubles per retry.
    /// Default: 5000
    pub screenshot_timeout_ms: u64,

    /// Screenshot attempts before failing open with an empty frame.
    /// Default: 3
    pub screenshot_attempts: u32,

    /// Consecutive rejected actions before the run is declared failed.
    /// Default: 3
    pub max_consecutive_rejections: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            additional_context: "None".to_string(),
            additional_instructions: Vec::new(),
            wait_after_step_ms: 500,
            pause_after_each_action: false,
            max_steps: 50,
            jitter_threshold: 5.0,
            scaling: ScalingPolicy::default(),
            annotate_screenshots: true,
            screenshot_timeout_ms: 5_000,
            screenshot_attempts: 3,
            max_consecutive_rejections: 3,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the step budget.
    pub fn max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Builder: set the between-step sleep.
    pub fn wait_after_step(mut self, ms: u64) -> Self {
        self.wait_after_step_ms = ms;
        self
    }

    /// Builder: require human confirmation between steps.
    pub fn pause_after_each_action(mut self, pause: bool) -> Self {
        self.pause_after_each_action = pause;
        self
    }

    /// Builder: set the jitter-suppression threshold.
    pub fn jitter_threshold(mut self, native_px: f64) -> Self {
        self.jitter_threshold = native_px;
        self
    }

    /// Builder: set the scaling policy for this run.
    pub fn scaling(mut self, policy: ScalingPolicy) -> Self {
        self.scaling = policy;
        self
    }

    /// Builder: enable or disable screenshot annotation.
    pub fn annotate(mut self, annotate: bool) -> Self {
        self.annotate_screenshots = annotate;
        self
    }

    /// Builder: set the oracle context from a string.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.additional_context = context.into();
        self
    }

    /// Builder: set the oracle context from structured data.
    pub fn context_json(mut self, context: &serde_json::Value) -> Self {
        self.additional_context = context.to_string();
        self
    }

    /// Builder: set the extra oracle instructions.
    pub fn instructions(mut self, instructions: Vec<String>) -> Self {
        self.additional_instructions = instructions;
        self
    }
}
