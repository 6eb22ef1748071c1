//! webhelm: a goal-driven browser control loop.
//!
//! The engine repeatedly captures a normalized snapshot of a browser tab,
//! asks an injected decision oracle what to do next, translates the answer
//! into low-level input events, and appends the (state, action) pair to an
//! append-only history, until the oracle declares the goal reached or the
//! step budget runs out.
//!
//! Hosts supply two collaborators: a [`Driver`] that talks to the actual
//! browser and an [`ActionPlanner`] that makes decisions. Everything in
//! between — coordinate mapping, screenshot annotation, jitter
//! suppression, tab-id bookkeeping, the loop itself — lives here.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # async fn run(driver: Arc<dyn webhelm::Driver>, planner: Arc<dyn webhelm::ActionPlanner>) {
//! use webhelm::{AgentConfig, BrowserAgent};
//!
//! let mut agent = BrowserAgent::new(
//!     driver,
//!     planner,
//!     "Find the cheapest direct flight to Lisbon",
//!     AgentConfig::new().max_steps(30),
//! );
//! agent.start().await.expect("run failed");
//! println!("finished with {:?}", agent.status());
//! # }
//! ```

pub mod telemetry;

pub use webhelm_actions::{dispatch, ActionTranslator, InputEvent, KeyCombo, TranslateError};
pub use webhelm_agent::{
    wire, ActionPlanner, AgentConfig, AgentError, BrowserAgent, NoopGate, StepGate,
};
pub use webhelm_core_types::{
    ActionKind, BoundingBox, BrowserAction, BrowserState, BrowserStep, BrowserTab, Coordinate,
    GoalState, ScrollBar, TabRegistry, ViewportSize,
};
pub use webhelm_driver::{Driver, DriverError, FocusedElement, MouseButton};
pub use webhelm_perceiver::{
    AnnotateError, CaptureConfig, ScreenshotAnnotator, StateCapture,
};
pub use webhelm_scaling::{ScalingError, ScalingPolicy, ScalingRatio};
