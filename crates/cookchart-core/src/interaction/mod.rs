//! Pointer gestures as explicit state machines.
//!
//! Each gesture is `Idle → <active> → Idle`; the editor session owns the
//! single active [`Gesture`] and feeds it board-space pointer positions.

pub mod drag;
pub mod edit;
pub mod link;
pub mod marquee;

pub use drag::{DragGroup, DragOutcome, DragState};
pub use edit::{FieldEdit, FieldTarget};
pub use link::{LinkAction, LinkState, auto_child_position};
pub use marquee::{MarqueeState, hit_test};

use crate::config::BoardConfig;
use crate::document::Document;
use crate::model::{EdgeKey, NodeId, Side, StepLineId, TextId};
use kurbo::Point;

/// Distance from a step line within which it can be grabbed.
pub const STEP_LINE_GRAB_TOLERANCE: f64 = 6.0;

/// What lies under the pointer when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTarget {
    /// A node's connector handle.
    Connector { node: NodeId, side: Side },
    Node(NodeId),
    Text(TextId),
    StepLine(StepLineId),
    Edge(EdgeKey),
    Background,
}

impl PointerTarget {
    /// Resolve the target under `point`, topmost first: nodes, texts, edges,
    /// then step lines.
    ///
    /// Connector handles are UI affordances the host hit-tests itself.
    pub fn at(doc: &Document, point: Point, config: &BoardConfig) -> Self {
        if let Some(id) = doc.node_at(point, config) {
            return PointerTarget::Node(id);
        }
        if let Some(id) = doc.text_at(point) {
            return PointerTarget::Text(id);
        }
        if let Some(key) = doc.edge_at(point, config) {
            return PointerTarget::Edge(key);
        }
        if let Some(id) = doc.step_line_at(point, STEP_LINE_GRAB_TOLERANCE) {
            return PointerTarget::StepLine(id);
        }
        PointerTarget::Background
    }
}

/// The active gesture.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragState),
    Linking(LinkState),
    Marqueeing(MarqueeState),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Dragging(_) => "dragging",
            Gesture::Linking(_) => "linking",
            Gesture::Marqueeing(_) => "marqueeing",
        }
    }
}
