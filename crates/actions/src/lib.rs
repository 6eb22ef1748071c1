//! Action translation: turns the oracle's declarative [`BrowserAction`]s
//! into ordered input-primitive plans and dispatches them through the
//! injected driver.
//!
//! All policy lives in the planning phase — jitter suppression, key
//! combinator parsing, coordinate conversion, tab-id resolution — so plans
//! can be asserted on in tests without any I/O. Dispatch is a mechanical
//! walk over the plan.
//!
//! [`BrowserAction`]: webhelm_core_types::BrowserAction

mod events;
mod keymap;
mod translator;

pub use events::{dispatch, InputEvent};
pub use keymap::{parse_key_combo, KeyCombo};
pub use translator::{ActionTranslator, TranslateError};
