//! Edit session configuration
//!
//! Visual constants for the selection overlay and the drag boundary policy.
//! Serializable so hosts can persist overrides next to their preferences.

use serde::{Deserialize, Serialize};

/// Configuration for the edit session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Border drawn around the selected annotation, in display pixels
    pub overlay_border: f64,

    /// Side length of the square delete control, in display pixels
    pub delete_control_size: f64,

    /// How far the delete control sticks out past the overlay's top-right corner
    pub delete_control_offset: f64,

    /// Stacking order hosts should give the overlay
    pub overlay_z_index: i32,

    /// Whether the overlay may touch the surface edge while dragging
    pub inclusive_bounds: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            overlay_border: 3.0,
            delete_control_size: 25.0,
            delete_control_offset: 13.0,
            overlay_z_index: 20100,
            inclusive_bounds: true,
        }
    }
}

impl EditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overlay border width
    pub fn with_overlay_border(mut self, border: f64) -> Self {
        self.overlay_border = border;
        self
    }

    /// Set the delete control geometry
    pub fn with_delete_control(mut self, size: f64, offset: f64) -> Self {
        self.delete_control_size = size;
        self.delete_control_offset = offset;
        self
    }

    /// Set whether the overlay may touch the surface edge
    pub fn with_inclusive_bounds(mut self, inclusive: bool) -> Self {
        self.inclusive_bounds = inclusive;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EditConfig =
            serde_json::from_str(r#"{"overlay_border": 5.0}"#).expect("config should parse");
        assert_eq!(config.overlay_border, 5.0);
        assert_eq!(config.delete_control_size, 25.0);
        assert!(config.inclusive_bounds);
    }

    #[test]
    fn test_builders() {
        let config = EditConfig::new()
            .with_overlay_border(1.0)
            .with_delete_control(20.0, 10.0)
            .with_inclusive_bounds(false);
        assert_eq!(config.overlay_border, 1.0);
        assert_eq!(config.delete_control_size, 20.0);
        assert_eq!(config.delete_control_offset, 10.0);
        assert!(!config.inclusive_bounds);
    }
}
