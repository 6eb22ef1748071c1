//! xdotool-style key combinator parsing.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Tokens that act as held modifiers rather than tapped keys.
const MODIFIER_TOKENS: [&str; 6] = ["ctrl", "alt", "shift", "super", "command", "meta"];

/// xdotool token -> DOM `KeyboardEvent` code-style name.
static KEY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ctrl", "Control"),
        ("alt", "Alt"),
        ("shift", "Shift"),
        ("super", "Meta"),
        ("command", "Meta"),
        ("meta", "Meta"),
        ("cancel", "Cancel"),
        ("help", "Help"),
        ("backspace", "Backspace"),
        ("back_space", "Backspace"),
        ("tab", "Tab"),
        ("clear", "Clear"),
        ("return", "Enter"),
        ("enter", "Enter"),
        ("pause", "Pause"),
        ("escape", "Escape"),
        ("space", "Space"),
        ("pageup", "PageUp"),
        ("page_up", "PageUp"),
        ("pagedown", "PageDown"),
        ("page_down", "PageDown"),
        ("end", "End"),
        ("home", "Home"),
        ("left", "ArrowLeft"),
        ("arrowleft", "ArrowLeft"),
        ("arrow_left", "ArrowLeft"),
        ("up", "ArrowUp"),
        ("arrowup", "ArrowUp"),
        ("arrow_up", "ArrowUp"),
        ("right", "ArrowRight"),
        ("arrowright", "ArrowRight"),
        ("arrow_right", "ArrowRight"),
        ("down", "ArrowDown"),
        ("arrowdown", "ArrowDown"),
        ("arrow_down", "ArrowDown"),
        ("insert", "Insert"),
        ("delete", "Delete"),
        ("semicolon", "Semicolon"),
        ("equals", "Equal"),
        ("kp_0", "Numpad0"),
        ("kp_1", "Numpad1"),
        ("kp_2", "Numpad2"),
        ("kp_3", "Numpad3"),
        ("kp_4", "Numpad4"),
        ("kp_5", "Numpad5"),
        ("kp_6", "Numpad6"),
        ("kp_7", "Numpad7"),
        ("kp_8", "Numpad8"),
        ("kp_9", "Numpad9"),
        ("multiply", "NumpadMultiply"),
        ("add", "NumpadAdd"),
        ("separator", "NumpadComma"),
        ("subtract", "NumpadSubtract"),
        ("decimal", "NumpadDecimal"),
        ("divide", "NumpadDivide"),
        ("f1", "F1"),
        ("f2", "F2"),
        ("f3", "F3"),
        ("f4", "F4"),
        ("f5", "F5"),
        ("f6", "F6"),
        ("f7", "F7"),
        ("f8", "F8"),
        ("f9", "F9"),
        ("f10", "F10"),
        ("f11", "F11"),
        ("f12", "F12"),
    ])
});

/// Parsed combinator: modifiers to hold and keys to tap between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub modifiers: Vec<String>,
    pub keys: Vec<String>,
}

/// Parse an xdotool-style combinator like `"ctrl+shift+a"`.
///
/// Tokens are `+`-separated, whitespace-tolerant and case-insensitive.
/// Modifier tokens are collected in order; everything else becomes a tapped
/// key. Unknown tokens pass through verbatim (lowercased) so unmapped
/// symbols still reach the driver instead of erroring.
pub fn parse_key_combo(combo: &str) -> KeyCombo {
    let mut modifiers = Vec::new();
    let mut keys = Vec::new();

    for token in combo.split('+') {
        let token = token.trim().to_ascii_lowercase();
        if token.is_empty() {
            continue;
        }
        let canonical = KEY_NAMES
            .get(token.as_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| token.clone());
        if MODIFIER_TOKENS.contains(&token.as_str()) {
            modifiers.push(canonical);
        } else {
            keys.push(canonical);
        }
    }

    KeyCombo { modifiers, keys }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_modifiers_from_keys() {
        let combo = parse_key_combo("ctrl+shift+a");
        assert_eq!(combo.modifiers, vec!["Control", "Shift"]);
        assert_eq!(combo.keys, vec!["a"]);
    }

    #[test]
    fn is_case_insensitive_and_trims() {
        let combo = parse_key_combo(" CTRL + Return ");
        assert_eq!(combo.modifiers, vec!["Control"]);
        assert_eq!(combo.keys, vec!["Enter"]);
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let combo = parse_key_combo("ctrl+odiaeresis");
        assert_eq!(combo.modifiers, vec!["Control"]);
        assert_eq!(combo.keys, vec!["odiaeresis"]);
    }

    #[test]
    fn bare_key_has_no_modifiers() {
        let combo = parse_key_combo("Page_Down");
        assert!(combo.modifiers.is_empty());
        assert_eq!(combo.keys, vec!["PageDown"]);
    }

    #[test]
    fn meta_aliases_collapse() {
        for alias in ["super+l", "command+l", "meta+l"] {
            let combo = parse_key_combo(alias);
            assert_eq!(combo.modifiers, vec!["Meta"]);
            assert_eq!(combo.keys, vec!["l"]);
        }
    }
}
