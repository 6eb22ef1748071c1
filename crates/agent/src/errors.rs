use thiserror::Error;

use webhelm_actions::TranslateError;
use webhelm_driver::DriverError;
use webhelm_scaling::ScalingError;

/// Errors surfaced by [`crate::BrowserAgent`].
///
/// Only `Translate` is recoverable from the loop's point of view: it is
/// fatal for that action attempt, logged, and the run continues. Everything
/// else unwinds to the host. Oracle failures are deliberately never caught
/// here so oracle misbehavior stays visible.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The oracle's action could not be planned (validation or unknown
    /// tab). Fatal for the attempt, not for the run.
    #[error("action rejected: {0}")]
    Translate(#[from] TranslateError),

    /// The captured viewport produced no usable scaling ratio.
    #[error("scaling failed: {0}")]
    Scaling(#[from] ScalingError),

    /// Capture or initial pointer positioning failed at the driver.
    #[error("driver failure: {0}")]
    Driver(#[from] DriverError),

    /// The oracle itself failed; propagated unmodified.
    #[error("planner failure: {0}")]
    Planner(anyhow::Error),
}
