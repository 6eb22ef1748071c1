//! Declarative actions emitted by the decision oracle.

use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;

/// The closed set of actions the oracle may request, one variant per kind.
///
/// Variants carry their required payload, so an action that reaches the
/// translator is structurally complete: a `MouseMove` without a coordinate
/// cannot be constructed. Coordinates are in normalized space; the
/// translator converts them to native pixels before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionKind {
    /// Press an xdotool-style key combination, e.g. `"ctrl+shift+a"`.
    Key { text: String },
    /// Type literal text into the focused element.
    Type { text: String },
    /// Move the pointer to a normalized coordinate.
    MouseMove { coordinate: Coordinate },
    LeftClick,
    /// Press, drag to a normalized coordinate, release.
    LeftClickDrag { coordinate: Coordinate },
    RightClick,
    MiddleClick,
    DoubleClick,
    ScrollUp,
    ScrollDown,
    /// Activate a previously observed tab by registry id.
    SwitchTab { tab_id: u32 },
    /// Capture-only no-op; the next snapshot satisfies it.
    Screenshot,
    /// Capture-only no-op; the next snapshot satisfies it.
    CursorPosition,
    /// Terminal: the goal was achieved.
    Success,
    /// Terminal: the goal cannot be achieved.
    Failure,
}

impl ActionKind {
    /// Wire name of this kind, for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Key { .. } => "key",
            Self::Type { .. } => "type",
            Self::MouseMove { .. } => "mouse_move",
            Self::LeftClick => "left_click",
            Self::LeftClickDrag { .. } => "left_click_drag",
            Self::RightClick => "right_click",
            Self::MiddleClick => "middle_click",
            Self::DoubleClick => "double_click",
            Self::ScrollUp => "scroll_up",
            Self::ScrollDown => "scroll_down",
            Self::SwitchTab { .. } => "switch_tab",
            Self::Screenshot => "screenshot",
            Self::CursorPosition => "cursor_position",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Terminal kinds end the run without touching the browser.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Kinds that need no dispatch because every step captures anyway.
    pub fn is_capture_only(&self) -> bool {
        matches!(self, Self::Screenshot | Self::CursorPosition)
    }
}

/// One oracle decision: what to do and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserAction {
    #[serde(flatten)]
    pub kind: ActionKind,
    /// The oracle's stated rationale; surfaced to users on failure.
    pub reasoning: String,
    /// Oracle-assigned correlation id.
    pub id: String,
}

impl BrowserAction {
    pub fn new(kind: ActionKind, reasoning: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind,
            reasoning: reasoning.into(),
            id: id.into(),
        }
    }

    /// A failure action carrying an error explanation, used when the driver
    /// rejects a dispatched action and the loop records the outcome.
    pub fn failure(reasoning: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(ActionKind::Failure, reasoning, id)
    }
}
