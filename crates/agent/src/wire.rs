//! Strict validation at the oracle-response boundary.
//!
//! Oracle backends emit loosely shaped JSON: coordinates arrive as
//! two-element arrays, `{x, y}` objects, or either of those wrapped in a
//! JSON string. This module parses that exactly once into the canonical
//! [`BrowserAction`], failing loudly on malformed shapes instead of
//! coercing them, so nothing downstream ever re-parses.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use webhelm_core_types::{ActionKind, BrowserAction, Coordinate};

/// Errors from oracle-response validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("unknown action kind: {0}")]
    UnknownKind(String),

    #[error("text is required for {0} action")]
    MissingText(&'static str),

    #[error("coordinate is required for {0} action")]
    MissingCoordinate(&'static str),

    #[error("malformed coordinate: {0}")]
    MalformedCoordinate(String),

    #[error("invalid tab id: {0}")]
    InvalidTabId(String),
}

/// An oracle response before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAction {
    pub action: String,
    #[serde(default)]
    pub coordinate: Option<serde_json::Value>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Validate a raw oracle response into a canonical action.
///
/// Missing ids are filled with a fresh UUID. A `key` action whose text is a
/// page-up/page-down chord is folded into the corresponding scroll kind, so
/// scroll intent expressed either way lands on one code path. A `failure`
/// without reasoning borrows the oracle's error text.
pub fn parse_action(raw: RawAction) -> Result<BrowserAction, ActionParseError> {
    let kind = match raw.action.as_str() {
        "key" => match scroll_chord(raw.text.as_deref()) {
            Some(kind) => kind,
            None => ActionKind::Key {
                text: required_text(&raw, "key")?,
            },
        },
        "type" => ActionKind::Type {
            text: required_text(&raw, "type")?,
        },
        "mouse_move" => ActionKind::MouseMove {
            coordinate: required_coordinate(&raw, "mouse_move")?,
        },
        "left_click" => ActionKind::LeftClick,
        "left_click_drag" => ActionKind::LeftClickDrag {
            coordinate: required_coordinate(&raw, "left_click_drag")?,
        },
        "right_click" => ActionKind::RightClick,
        "middle_click" => ActionKind::MiddleClick,
        "double_click" => ActionKind::DoubleClick,
        "scroll_up" => ActionKind::ScrollUp,
        "scroll_down" => ActionKind::ScrollDown,
        "switch_tab" => ActionKind::SwitchTab {
            tab_id: parse_tab_id(&raw)?,
        },
        "screenshot" => ActionKind::Screenshot,
        "cursor_position" => ActionKind::CursorPosition,
        "success" => ActionKind::Success,
        "failure" => ActionKind::Failure,
        other => return Err(ActionParseError::UnknownKind(other.to_string())),
    };

    let mut reasoning = raw.reasoning.unwrap_or_default();
    if reasoning.is_empty() && kind == ActionKind::Failure {
        if let Some(text) = &raw.text {
            reasoning = text.clone();
        }
    }

    Ok(BrowserAction {
        kind,
        reasoning,
        id: raw
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
    })
}

/// Page-up/page-down key chords express scroll intent.
fn scroll_chord(text: Option<&str>) -> Option<ActionKind> {
    match text?.trim().to_ascii_lowercase().as_str() {
        "page_down" | "pagedown" => Some(ActionKind::ScrollDown),
        "page_up" | "pageup" => Some(ActionKind::ScrollUp),
        _ => None,
    }
}

fn required_text(raw: &RawAction, kind: &'static str) -> Result<String, ActionParseError> {
    match &raw.text {
        Some(text) if !text.trim().is_empty() => Ok(text.clone()),
        _ => Err(ActionParseError::MissingText(kind)),
    }
}

fn required_coordinate(
    raw: &RawAction,
    kind: &'static str,
) -> Result<Coordinate, ActionParseError> {
    match &raw.coordinate {
        Some(value) => parse_coordinate(value),
        None => Err(ActionParseError::MissingCoordinate(kind)),
    }
}

/// Accepts `[x, y]`, `{"x": .., "y": ..}`, and either of those wrapped in a
/// JSON string. Anything else is malformed.
fn parse_coordinate(value: &serde_json::Value) -> Result<Coordinate, ActionParseError> {
    match value {
        serde_json::Value::String(inner) => {
            let unwrapped: serde_json::Value = serde_json::from_str(inner)
                .map_err(|_| ActionParseError::MalformedCoordinate(inner.clone()))?;
            if unwrapped.is_string() {
                return Err(ActionParseError::MalformedCoordinate(inner.clone()));
            }
            parse_coordinate(&unwrapped)
        }
        serde_json::Value::Array(items) if items.len() == 2 => {
            let x = axis_value(&items[0], value)?;
            let y = axis_value(&items[1], value)?;
            Ok(Coordinate::new(x, y))
        }
        serde_json::Value::Object(map) => {
            let x = map
                .get("x")
                .ok_or_else(|| malformed(value))
                .and_then(|v| axis_value(v, value))?;
            let y = map
                .get("y")
                .ok_or_else(|| malformed(value))
                .and_then(|v| axis_value(v, value))?;
            Ok(Coordinate::new(x, y))
        }
        other => Err(malformed(other)),
    }
}

fn axis_value(
    value: &serde_json::Value,
    context: &serde_json::Value,
) -> Result<u32, ActionParseError> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| malformed(context))
}

fn malformed(value: &serde_json::Value) -> ActionParseError {
    ActionParseError::MalformedCoordinate(value.to_string())
}

fn parse_tab_id(raw: &RawAction) -> Result<u32, ActionParseError> {
    let text = raw
        .text
        .as_deref()
        .ok_or_else(|| ActionParseError::InvalidTabId("<missing>".to_string()))?;
    text.trim()
        .parse()
        .map_err(|_| ActionParseError::InvalidTabId(text.to_string()))
}
