//! Editor configuration
//!
//! All tunables of an editing session in one serde struct. Missing keys
//! fall back to the values in [`defaults`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::LayoutConfig;

/// Default values for every setting
pub mod defaults {
    /// Maximum distance (px) between a drop point and an anchor centre
    pub const ANCHOR_RADIUS: f64 = 320.0;
    /// Number of undo snapshots kept
    pub const UNDO_DEPTH: usize = 100;
    /// Quiet period before an autosave is written
    pub const AUTOSAVE_DEBOUNCE_MS: u64 = 500;
    /// Version tag written into exported snapshots
    pub const SNAPSHOT_VERSION: &str = "1.0";
}

/// Settings for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    /// Anchor search radius for drops and drags
    pub anchor_radius: f64,
    pub undo_depth: usize,
    pub autosave_debounce_ms: u64,
    /// Run the layout engine after every structural commit
    pub auto_layout: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            anchor_radius: defaults::ANCHOR_RADIUS,
            undo_depth: defaults::UNDO_DEPTH,
            autosave_debounce_ms: defaults::AUTOSAVE_DEBOUNCE_MS,
            auto_layout: true,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config, filling gaps with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.anchor_radius, 320.0);
        assert_eq!(config.undo_depth, 100);
        assert_eq!(config.autosave_debounce(), Duration::from_millis(500));
        assert_eq!(config.layout.node_sep, 100.0);
        assert_eq!(config.layout.rank_sep, 150.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EditorConfig::from_json_str(r#"{"anchorRadius": 200, "layout": {"rankSep": 80}}"#).unwrap();
        assert_eq!(config.anchor_radius, 200.0);
        assert_eq!(config.layout.rank_sep, 80.0);
        assert_eq!(config.layout.node_sep, 100.0);
        assert_eq!(config.undo_depth, defaults::UNDO_DEPTH);
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        let err = EditorConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.kind(), "serialization");
    }
}
