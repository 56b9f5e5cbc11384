//! Entity definitions for the chart board.

mod edge;
mod node;
mod step_line;
mod text;

pub use edge::{Edge, EdgeArrow, EdgeKey, ParseEdgeKeyError};
pub use node::{Node, NodeColor, normalize_memos, normalize_tags};
pub use step_line::StepLine;
pub use text::TextItem;

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier of a node card.
pub type NodeId = u64;
/// Identifier of a step line.
pub type StepLineId = u64;
/// Identifier of a free text item.
pub type TextId = u64;

/// Side of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Side {
    /// The side facing this one.
    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Outward unit vector of this side (y grows downward).
    pub fn outward(self) -> Vec2 {
        match self {
            Side::Top => Vec2::new(0.0, -1.0),
            Side::Bottom => Vec2::new(0.0, 1.0),
            Side::Left => Vec2::new(-1.0, 0.0),
            Side::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Vertical direction (+1 down, -1 up) used when auto-placing children.
    pub fn y_direction(self) -> f64 {
        if self == Side::Top { -1.0 } else { 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_round_trip() {
        for side in [Side::Top, Side::Bottom, Side::Left, Side::Right] {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.outward(), -side.opposite().outward());
        }
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Bottom).unwrap(), "\"bottom\"");
        let side: Side = serde_json::from_str("\"top\"").unwrap();
        assert_eq!(side, Side::Top);
    }
}
