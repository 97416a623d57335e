//! Input events routed into the editing session
//!
//! Hosts translate their native pointer and keyboard events into these
//! types. Pointer coordinates are client coordinates, the same space the
//! render surfaces' client rectangles are expressed in.

use pdf_annotate_core::ElementId;

/// What an input event landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// The selection overlay itself
    Overlay,
    /// The overlay's delete control
    DeleteControl,
    /// A rendered annotation element
    Element(ElementId),
    /// A text entry field (`input`, `textarea`)
    TextInput,
    /// Anything else in the document
    Document,
}

/// Pointer event in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub target: EventTarget,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, target: EventTarget) -> Self {
        Self { x, y, target }
    }
}

/// Logical key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Other(String),
}

impl Key {
    /// Parse a key name, case-insensitively
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "delete" => Key::Delete,
            "backspace" => Key::Backspace,
            "escape" | "esc" => Key::Escape,
            _ => Key::Other(name.to_string()),
        }
    }

    /// Map a legacy numeric key code
    pub fn from_code(code: u32) -> Self {
        match code {
            8 => Key::Backspace,
            46 => Key::Delete,
            27 => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}

/// Key release event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub target: EventTarget,
}

impl KeyEvent {
    pub fn new(key: Key, target: EventTarget) -> Self {
        Self { key, target }
    }
}

/// Result of routing an event
///
/// `Consumed` tells the host to suppress the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Consumed,
    Ignored,
}

impl Handled {
    pub fn is_consumed(&self) -> bool {
        matches!(self, Handled::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_and_codes_agree() {
        assert_eq!(Key::from_name("Delete"), Key::from_code(46));
        assert_eq!(Key::from_name("BACKSPACE"), Key::from_code(8));
        assert!(Key::from_name("backspace").is_delete());
        assert!(!Key::from_name("Enter").is_delete());
        assert_eq!(Key::from_code(13), Key::Other("13".to_string()));
    }
}
