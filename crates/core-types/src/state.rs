//! Per-step browser snapshots and run state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::BrowserAction;
use crate::geometry::{BoundingBox, Coordinate, ScrollBar};

/// Lifecycle of one automation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalState {
    /// Before the first step executes.
    Initial,
    /// At least one non-terminal step has executed.
    Running,
    /// The oracle declared the goal achieved.
    Success,
    /// The oracle declared the goal unreachable.
    Failed,
    /// The step budget ran out while the goal was still open.
    BudgetExceeded,
}

impl GoalState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Initial | Self::Running)
    }
}

/// One open browser tab as observed during a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserTab {
    /// Driver-level window handle. Opaque and potentially reused by the
    /// browser after a close; the stable identity is `id`.
    pub handle: String,
    pub url: String,
    pub title: String,
    /// Whether this tab was active when the capture started. At most one
    /// tab per snapshot is active.
    pub active: bool,
    /// True only on the capture that first observed this handle.
    pub new: bool,
    /// Registry-assigned id, unique for the lifetime of the run.
    pub id: u32,
}

/// Immutable snapshot of the browser surface taken at the top of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserState {
    /// Base64-encoded PNG of the active tab's viewport. Empty when capture
    /// failed open after exhausting screenshot retries.
    pub screenshot: String,
    /// Viewport width in native pixels.
    pub width: u32,
    /// Viewport height in native pixels.
    pub height: u32,
    pub scrollbar: ScrollBar,
    pub tabs: Vec<BrowserTab>,
    /// Handle of the tab that was active during this capture.
    pub active_tab: String,
    /// Bounding box of the focused element, if focus rests on something
    /// interactive rather than a document-level container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_element: Option<BoundingBox>,
    /// Last known pointer position in native pixels.
    pub mouse: Coordinate,
    pub captured_at: DateTime<Utc>,
}

impl BrowserState {
    /// The tab the oracle's action would apply to, if still present.
    pub fn active(&self) -> Option<&BrowserTab> {
        self.tabs.iter().find(|tab| tab.active)
    }
}

/// One completed (state, action) pair: the unit of session history.
///
/// History is append-only and never truncated, so external recorders can
/// serialize it deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserStep {
    pub state: BrowserState,
    pub action: BrowserAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    fn sample_state() -> BrowserState {
        BrowserState {
            screenshot: String::new(),
            width: 1920,
            height: 1080,
            scrollbar: ScrollBar::new(0.0, 1.0),
            tabs: vec![
                BrowserTab {
                    handle: "h-1".into(),
                    url: "https://example.com".into(),
                    title: "Example".into(),
                    active: true,
                    new: true,
                    id: 0,
                },
                BrowserTab {
                    handle: "h-2".into(),
                    url: "https://example.org".into(),
                    title: "Other".into(),
                    active: false,
                    new: true,
                    id: 1,
                },
            ],
            active_tab: "h-1".into(),
            active_element: None,
            mouse: Coordinate::origin(),
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn active_tab_lookup() {
        let state = sample_state();
        assert_eq!(state.active().map(|t| t.id), Some(0));
    }

    #[test]
    fn terminal_states() {
        assert!(!GoalState::Initial.is_terminal());
        assert!(!GoalState::Running.is_terminal());
        assert!(GoalState::Success.is_terminal());
        assert!(GoalState::Failed.is_terminal());
        assert!(GoalState::BudgetExceeded.is_terminal());
    }

    #[test]
    fn step_round_trips_through_json() {
        let step = BrowserStep {
            state: sample_state(),
            action: BrowserAction::new(ActionKind::ScrollDown, "look further", "act-9"),
        };

        let json = serde_json::to_string(&step).unwrap();
        let back: BrowserStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
