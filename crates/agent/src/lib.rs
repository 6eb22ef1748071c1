//! The control loop: owns the goal, history, and step budget, and drives
//! the capture -> decide -> translate -> dispatch cycle to a terminal state.
//!
//! The decision oracle and the concrete driver stay outside this crate;
//! both arrive as injected trait objects ([`ActionPlanner`] and
//! [`webhelm_driver::Driver`]).

mod agent;
mod config;
mod errors;
mod planner;
pub mod wire;

pub use agent::BrowserAgent;
pub use config::AgentConfig;
pub use errors::AgentError;
pub use planner::{ActionPlanner, NoopGate, StepGate};
