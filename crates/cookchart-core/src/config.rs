//! Board dimensions and editor tuning.

use serde::{Deserialize, Serialize};

/// Board width in board units.
pub const BOARD_WIDTH: f64 = 3200.0;
/// Board height in board units.
pub const BOARD_HEIGHT: f64 = 4000.0;
/// Fixed node card width.
pub const NODE_WIDTH: f64 = 220.0;
/// Default node height before measurement.
pub const NODE_HEIGHT: f64 = 100.0;
/// Smallest height a measured node may take.
pub const NODE_MIN_HEIGHT: f64 = 56.0;
/// Fixed text item width.
pub const TEXT_WIDTH: f64 = 220.0;
/// Default text item height before measurement.
pub const TEXT_HEIGHT: f64 = 22.0;
/// Grid pitch used for snapping.
pub const GRID_SIZE: f64 = 20.0;
/// Maximum number of undo snapshots to keep.
pub const HISTORY_LIMIT: usize = 120;
/// Distance between a source node and its auto-placed child.
pub const AUTO_CHILD_DY: f64 = 50.0;
/// Pointer travel below which a connector drag counts as a click.
pub const LINK_DRAG_THRESHOLD: f64 = 6.0;
/// Marquee extent below which a release counts as a background click.
pub const MARQUEE_CLICK_TOLERANCE: f64 = 4.0;
/// Paste offset in grid steps, multiplied by the paste count.
pub const PASTE_OFFSET_STEPS: f64 = 3.0;
/// Maximum number of tags on a node.
pub const MAX_TAGS: usize = 3;
/// Maximum number of memos on a node.
pub const MAX_MEMOS: usize = 1;

/// Tunable board geometry and gesture thresholds.
///
/// Every field has a default, so a partial JSON file only overrides what it
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    pub board_width: f64,
    pub board_height: f64,
    pub node_width: f64,
    pub node_height: f64,
    pub node_min_height: f64,
    pub text_width: f64,
    pub text_height: f64,
    pub grid_size: f64,
    pub history_limit: usize,
    pub auto_child_dy: f64,
    pub link_drag_threshold: f64,
    pub marquee_click_tolerance: f64,
    pub paste_offset_steps: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            node_min_height: NODE_MIN_HEIGHT,
            text_width: TEXT_WIDTH,
            text_height: TEXT_HEIGHT,
            grid_size: GRID_SIZE,
            history_limit: HISTORY_LIMIT,
            auto_child_dy: AUTO_CHILD_DY,
            link_drag_threshold: LINK_DRAG_THRESHOLD,
            marquee_click_tolerance: MARQUEE_CLICK_TOLERANCE,
            paste_offset_steps: PASTE_OFFSET_STEPS,
        }
    }
}

impl BoardConfig {
    /// Parse a configuration from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
