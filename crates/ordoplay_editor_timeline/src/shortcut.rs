// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard shortcuts: key combinations, parsing and platform overrides.

use egui::Key;

/// Modifier keys for shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Control key (Cmd on macOS)
    pub ctrl: bool,
    /// Shift key
    pub shift: bool,
    /// Alt key (Option on macOS)
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers
    pub const NONE: Self = Self { ctrl: false, shift: false, alt: false };
    /// Control only
    pub const CTRL: Self = Self { ctrl: true, shift: false, alt: false };
    /// Shift only
    pub const SHIFT: Self = Self { ctrl: false, shift: true, alt: false };
    /// Alt only
    pub const ALT: Self = Self { ctrl: false, shift: false, alt: true };

    /// Create from egui modifiers
    pub fn from_egui(mods: &egui::Modifiers) -> Self {
        Self {
            ctrl: mods.ctrl || mods.command,
            shift: mods.shift,
            alt: mods.alt,
        }
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A keyboard shortcut (key + modifiers); also used for key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// The main key
    pub key: Key,
    /// Modifier keys
    pub modifiers: Modifiers,
}

impl Shortcut {
    /// Create a new shortcut with no modifiers
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a shortcut with Ctrl modifier
    pub const fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::CTRL,
        }
    }

    /// Create a shortcut with Shift modifier
    pub const fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }

    /// Create a shortcut with Alt modifier
    pub const fn alt(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::ALT,
        }
    }

    /// Key press read from an egui key event
    pub fn from_egui(key: Key, mods: &egui::Modifiers) -> Self {
        Self {
            key,
            modifiers: Modifiers::from_egui(mods),
        }
    }

    /// Get display string for this shortcut
    pub fn display(&self) -> String {
        let key_name = format!("{:?}", self.key);
        if self.modifiers == Modifiers::NONE {
            key_name
        } else {
            format!("{}+{}", self.modifiers, key_name)
        }
    }

    /// Parse a shortcut from a display string (e.g., "Ctrl+D", "F2", "Shift+Comma")
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let mut modifiers = Modifiers::NONE;
        let mut key_part = "";

        for (i, part) in parts.iter().enumerate() {
            let lower = part.to_lowercase();
            if lower == "ctrl" || lower == "control" || lower == "cmd" {
                modifiers.ctrl = true;
            } else if lower == "shift" {
                modifiers.shift = true;
            } else if lower == "alt" || lower == "option" {
                modifiers.alt = true;
            } else if i == parts.len() - 1 {
                key_part = part;
            } else {
                return None;
            }
        }

        let key = Self::parse_key(key_part)?;
        Some(Self { key, modifiers })
    }

    /// Parse a key name to `egui::Key`
    fn parse_key(s: &str) -> Option<Key> {
        let lower = s.to_lowercase();
        let key = match lower.as_str() {
            "a" => Key::A,
            "b" => Key::B,
            "c" => Key::C,
            "d" => Key::D,
            "e" => Key::E,
            "f" => Key::F,
            "g" => Key::G,
            "h" => Key::H,
            "i" => Key::I,
            "j" => Key::J,
            "k" => Key::K,
            "l" => Key::L,
            "m" => Key::M,
            "n" => Key::N,
            "o" => Key::O,
            "p" => Key::P,
            "q" => Key::Q,
            "r" => Key::R,
            "s" => Key::S,
            "t" => Key::T,
            "u" => Key::U,
            "v" => Key::V,
            "w" => Key::W,
            "x" => Key::X,
            "y" => Key::Y,
            "z" => Key::Z,
            "f1" => Key::F1,
            "f2" => Key::F2,
            "f3" => Key::F3,
            "f4" => Key::F4,
            "f5" => Key::F5,
            "f6" => Key::F6,
            "f7" => Key::F7,
            "f8" => Key::F8,
            "f9" => Key::F9,
            "f10" => Key::F10,
            "f11" => Key::F11,
            "f12" => Key::F12,
            "delete" | "del" => Key::Delete,
            "backspace" => Key::Backspace,
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "up" | "arrowup" => Key::ArrowUp,
            "down" | "arrowdown" => Key::ArrowDown,
            "left" | "arrowleft" => Key::ArrowLeft,
            "right" | "arrowright" => Key::ArrowRight,
            "comma" | "," => Key::Comma,
            "period" | "." => Key::Period,
            "equals" | "=" => Key::Equals,
            "minus" | "-" => Key::Minus,
            "0" => Key::Num0,
            "1" => Key::Num1,
            "2" => Key::Num2,
            "3" => Key::Num3,
            "4" => Key::Num4,
            "5" => Key::Num5,
            "6" => Key::Num6,
            "7" => Key::Num7,
            "8" => Key::Num8,
            "9" => Key::Num9,
            _ => return None,
        };
        Some(key)
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Host platform, for per-platform shortcut overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows
    Windows,
    /// macOS
    MacOs,
    /// Linux and everything else
    Linux,
}

impl Platform {
    /// Platform the editor was built for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }
}

/// Default key combination of an action, with optional platform overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    /// Primary binding
    pub primary: Shortcut,
    /// Per-platform replacements for the primary binding
    pub overrides: &'static [(Platform, Shortcut)],
}

impl KeyBinding {
    /// Binding without overrides
    pub const fn new(primary: Shortcut) -> Self {
        Self {
            primary,
            overrides: &[],
        }
    }

    /// Binding with platform overrides
    pub const fn with_overrides(primary: Shortcut, overrides: &'static [(Platform, Shortcut)]) -> Self {
        Self { primary, overrides }
    }

    /// Shortcut in effect on `platform`
    pub fn resolve(&self, platform: Platform) -> Shortcut {
        self.overrides
            .iter()
            .find(|(p, _)| *p == platform)
            .map_or(self.primary, |(_, s)| *s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_modifiers() {
        let shortcut = Shortcut::parse("Ctrl+Shift+D").unwrap();
        assert_eq!(shortcut.key, Key::D);
        assert!(shortcut.modifiers.ctrl);
        assert!(shortcut.modifiers.shift);
        assert!(!shortcut.modifiers.alt);
    }

    #[test]
    fn test_parse_punctuation() {
        assert_eq!(Shortcut::parse("Alt+Comma"), Some(Shortcut::alt(Key::Comma)));
        assert_eq!(Shortcut::parse("Period"), Some(Shortcut::new(Key::Period)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Shortcut::parse(""), None);
        assert_eq!(Shortcut::parse("Ctrl+Banana"), None);
        assert_eq!(Shortcut::parse("Hyper+A"), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let shortcut = Shortcut::ctrl(Key::V);
        assert_eq!(shortcut.display(), "Ctrl+V");
        assert_eq!(Shortcut::parse(&shortcut.display()), Some(shortcut));
    }

    #[test]
    fn test_platform_override() {
        const OVERRIDES: &[(Platform, Shortcut)] = &[(Platform::MacOs, Shortcut::ctrl(Key::Backspace))];
        let binding = KeyBinding::with_overrides(Shortcut::new(Key::Delete), OVERRIDES);
        assert_eq!(binding.resolve(Platform::Windows), Shortcut::new(Key::Delete));
        assert_eq!(binding.resolve(Platform::MacOs), Shortcut::ctrl(Key::Backspace));
    }

    #[test]
    fn test_from_egui_treats_command_as_ctrl() {
        let mods = egui::Modifiers {
            command: true,
            ..Default::default()
        };
        assert_eq!(Shortcut::from_egui(Key::C, &mods), Shortcut::ctrl(Key::C));
    }
}
