//! Modifier keys and keyboard shortcuts understood by the editor.

use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Whether a click should toggle membership instead of replacing.
    pub fn is_additive(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Editor commands bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    SelectAll,
    Copy,
    Paste,
    ToggleBold,
    Delete,
    Undo,
}

impl Shortcut {
    /// Resolve a key press. `typing` is true while a text field has focus,
    /// which suppresses everything except select-all and undo.
    pub fn from_key(key: &str, modifiers: Modifiers, typing: bool) -> Option<Self> {
        let command = modifiers.command() && !modifiers.shift;
        let shortcut = match key.to_ascii_lowercase().as_str() {
            "a" if command => Shortcut::SelectAll,
            "z" if command => Shortcut::Undo,
            "c" if command => Shortcut::Copy,
            "v" if command => Shortcut::Paste,
            "b" if command => Shortcut::ToggleBold,
            "delete" | "backspace" => Shortcut::Delete,
            _ => return None,
        };
        if typing && !matches!(shortcut, Shortcut::SelectAll | Shortcut::Undo) {
            return None;
        }
        Some(shortcut)
    }

    /// Display form, e.g. "Ctrl+Z".
    pub fn format(&self) -> &'static str {
        match self {
            Shortcut::SelectAll => "Ctrl+A",
            Shortcut::Copy => "Ctrl+C",
            Shortcut::Paste => "Ctrl+V",
            Shortcut::ToggleBold => "Ctrl+B",
            Shortcut::Delete => "Delete",
            Shortcut::Undo => "Ctrl+Z",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_modifiers() {
        assert!(!Modifiers::NONE.is_additive());
        assert!(Modifiers::SHIFT.is_additive());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.is_additive());
        assert!(!Modifiers { alt: true, ..Modifiers::NONE }.is_additive());
    }

    #[test]
    fn test_shortcut_resolution() {
        assert_eq!(Shortcut::from_key("Z", Modifiers::CTRL, false), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key("z", Modifiers::NONE, false), None);
        let ctrl_shift = Modifiers { shift: true, ..Modifiers::CTRL };
        assert_eq!(Shortcut::from_key("z", ctrl_shift, false), None);
        assert_eq!(Shortcut::from_key("Backspace", Modifiers::NONE, false), Some(Shortcut::Delete));
        assert_eq!(Shortcut::from_key("Backspace", Modifiers::NONE, true), None);
        assert_eq!(Shortcut::from_key("c", Modifiers::CTRL, true), None);
        assert_eq!(Shortcut::from_key("a", Modifiers::CTRL, true), Some(Shortcut::SelectAll));
    }
}
