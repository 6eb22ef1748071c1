//! Per-kind translation policy.

use thiserror::Error;
use tracing::debug;

use webhelm_core_types::{ActionKind, BrowserAction, BrowserState, TabRegistry};
use webhelm_driver::MouseButton;
use webhelm_scaling::ScalingRatio;

use crate::events::InputEvent;
use crate::keymap::parse_key_combo;

/// Fraction of the viewport height covered by one scroll action.
const SCROLL_VIEWPORT_FRACTION: f64 = 0.75;

/// Errors raised while planning an action. Fatal for that action attempt
/// only; the control loop survives them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// A key or type action arrived with empty text.
    #[error("text is required for {0} action")]
    MissingText(&'static str),

    /// The oracle referenced a tab id that was never observed.
    #[error("unknown tab id: {0}")]
    UnknownTab(u32),

    /// A terminal action reached the translator; the loop should have
    /// short-circuited it.
    #[error("terminal action {0} cannot be dispatched")]
    Terminal(&'static str),
}

/// Converts declarative actions into input-primitive plans.
///
/// Planning is pure: coordinate conversion uses the capture's scaling
/// ratio, pointer-distance policy uses the capture's mouse estimate, and
/// tab ids resolve against the run's registry. No driver I/O happens until
/// [`crate::dispatch`].
#[derive(Debug, Clone)]
pub struct ActionTranslator {
    jitter_threshold: f64,
}

impl Default for ActionTranslator {
    fn default() -> Self {
        Self {
            jitter_threshold: 5.0,
        }
    }
}

impl ActionTranslator {
    /// `jitter_threshold` is the native-pixel distance under which a
    /// requested pointer move is treated as oracle imprecision and becomes
    /// a click in place.
    pub fn new(jitter_threshold: f64) -> Self {
        Self { jitter_threshold }
    }

    /// Plan the primitives for one action.
    pub fn plan(
        &self,
        action: &BrowserAction,
        state: &BrowserState,
        registry: &TabRegistry,
        ratio: &ScalingRatio,
    ) -> Result<Vec<InputEvent>, TranslateError> {
        match &action.kind {
            ActionKind::Key { text } => {
                ensure_text(text, "key")?;
                Ok(key_events(text))
            }
            ActionKind::Type { text } => {
                ensure_text(text, "type")?;
                Ok(vec![InputEvent::SendText(text.clone())])
            }
            ActionKind::MouseMove { coordinate } => {
                let native = ratio.to_native(*coordinate);
                let distance = native.distance_to(state.mouse);
                if distance <= self.jitter_threshold {
                    debug!(
                        distance,
                        threshold = self.jitter_threshold,
                        "move within jitter threshold, clicking in place"
                    );
                    Ok(vec![InputEvent::Click(MouseButton::Left)])
                } else {
                    Ok(vec![InputEvent::MoveTo(native)])
                }
            }
            ActionKind::LeftClick => Ok(vec![InputEvent::Click(MouseButton::Left)]),
            ActionKind::LeftClickDrag { coordinate } => {
                let native = ratio.to_native(*coordinate);
                let dx = (native.x as i64 - state.mouse.x as i64) as i32;
                let dy = (native.y as i64 - state.mouse.y as i64) as i32;
                Ok(vec![
                    InputEvent::ButtonDown(MouseButton::Left),
                    InputEvent::MoveBy { dx, dy },
                    InputEvent::ButtonUp(MouseButton::Left),
                ])
            }
            ActionKind::RightClick => Ok(vec![InputEvent::Click(MouseButton::Right)]),
            ActionKind::MiddleClick => Ok(vec![InputEvent::Click(MouseButton::Middle)]),
            ActionKind::DoubleClick => Ok(vec![InputEvent::DoubleClick(MouseButton::Left)]),
            ActionKind::ScrollUp => Ok(vec![InputEvent::ScrollBy(-scroll_amount(state))]),
            ActionKind::ScrollDown => Ok(vec![InputEvent::ScrollBy(scroll_amount(state))]),
            ActionKind::SwitchTab { tab_id } => registry
                .resolve(*tab_id)
                .map(|handle| vec![InputEvent::SwitchTab(handle.to_string())])
                .ok_or(TranslateError::UnknownTab(*tab_id)),
            ActionKind::Screenshot | ActionKind::CursorPosition => Ok(Vec::new()),
            ActionKind::Success | ActionKind::Failure => {
                Err(TranslateError::Terminal(action.kind.name()))
            }
        }
    }
}

fn ensure_text(text: &str, kind: &'static str) -> Result<(), TranslateError> {
    if text.trim().is_empty() {
        return Err(TranslateError::MissingText(kind));
    }
    Ok(())
}

/// Modifiers held in order, keys tapped between, modifiers released in
/// reverse order.
fn key_events(combo: &str) -> Vec<InputEvent> {
    let parsed = parse_key_combo(combo);
    let mut events = Vec::with_capacity(parsed.modifiers.len() * 2 + parsed.keys.len());
    for modifier in &parsed.modifiers {
        events.push(InputEvent::KeyDown(modifier.clone()));
    }
    for key in &parsed.keys {
        events.push(InputEvent::KeyTap(key.clone()));
    }
    for modifier in parsed.modifiers.iter().rev() {
        events.push(InputEvent::KeyUp(modifier.clone()));
    }
    events
}

fn scroll_amount(state: &BrowserState) -> i32 {
    (state.height as f64 * SCROLL_VIEWPORT_FRACTION) as i32
}
