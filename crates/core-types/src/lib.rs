//! Shared primitives for the webhelm browser control loop.
//!
//! Everything the observe-decide-act cycle passes between components lives
//! here: geometry value types, the per-step browser snapshot, the declarative
//! action vocabulary, and the monotonic tab-id registry.

pub mod action;
pub mod geometry;
pub mod state;
pub mod tabs;

pub use action::{ActionKind, BrowserAction};
pub use geometry::{BoundingBox, Coordinate, ScrollBar, ViewportSize};
pub use state::{BrowserState, BrowserStep, BrowserTab, GoalState};
pub use tabs::TabRegistry;
