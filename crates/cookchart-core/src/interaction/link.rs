//! Link drag from a node's connector handle.

use crate::config::BoardConfig;
use crate::document::Document;
use crate::geometry::{anchor_for, edge_curve, find_nearby_free_position};
use crate::model::{EdgeKey, Node, NodeId, Side};
use kurbo::{CubicBez, Point};

/// What a released link drag asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Short press: create a child node on `side` wired from `from`.
    CreateChild { from: NodeId, side: Side },
    /// Dropped on another node with no edge from `from` yet.
    Edge { from: NodeId, to: NodeId, side: Side },
    /// Dropped on an existing edge.
    EdgeArrow { from: NodeId, to_edge_key: EdgeKey },
    Nothing,
}

/// An in-progress link drag.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkState {
    pub from: NodeId,
    pub from_side: Side,
    start: Point,
    /// Current pointer position in board coordinates.
    pub cursor: Point,
    moved: bool,
    /// Node under the pointer, other than the source.
    pub target_node: Option<NodeId>,
    /// Edge under the pointer.
    pub target_edge: Option<EdgeKey>,
}

impl LinkState {
    pub fn begin(doc: &Document, from: NodeId, from_side: Side, start: Point, config: &BoardConfig) -> Option<Self> {
        let node = doc.node(from)?;
        Some(Self {
            from,
            from_side,
            start,
            cursor: anchor_for(node, from_side, config.node_width),
            moved: false,
            target_node: None,
            target_edge: None,
        })
    }

    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Track the pointer and the hovered node or edge.
    pub fn update(&mut self, doc: &Document, point: Point, config: &BoardConfig) {
        if !self.moved && point.distance(self.start) > config.link_drag_threshold {
            self.moved = true;
        }
        self.cursor = point;
        self.target_node = doc.node_at(point, config).filter(|id| *id != self.from);
        self.target_edge = doc.edge_at(point, config);
    }

    /// Decide what the release means.
    pub fn release(mut self, doc: &Document, point: Point, config: &BoardConfig) -> LinkAction {
        self.update(doc, point, config);
        if !self.moved {
            return LinkAction::CreateChild {
                from: self.from,
                side: self.from_side,
            };
        }
        if let Some(to) = self.target_node.filter(|to| !doc.edge_exists(self.from, *to)) {
            return LinkAction::Edge {
                from: self.from,
                to,
                side: self.from_side,
            };
        }
        match self.target_edge {
            Some(to_edge_key) => LinkAction::EdgeArrow {
                from: self.from,
                to_edge_key,
            },
            None => LinkAction::Nothing,
        }
    }

    /// Live preview from the source anchor to the pointer.
    pub fn preview_curve(&self, doc: &Document, config: &BoardConfig) -> Option<CubicBez> {
        let node = doc.node(self.from)?;
        let from = anchor_for(node, self.from_side, config.node_width);
        Some(edge_curve(from, self.from_side, self.cursor, self.from_side.opposite()))
    }
}

/// Where a child created from `parent`'s `side` connector goes: a fixed
/// distance past the parent in the side's vertical direction, searched for
/// free space.
pub fn auto_child_position(doc: &Document, parent: &Node, side: Side, config: &BoardConfig) -> Option<Point> {
    let y_dir = side.y_direction();
    let preferred = Point::new(parent.x, parent.y + y_dir * config.auto_child_dy);
    find_nearby_free_position(&doc.nodes, preferred, parent.y, y_dir, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Edge;

    fn setup() -> (Document, BoardConfig, NodeId, NodeId) {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let a = doc.add_node(Point::new(100.0, 100.0), &config);
        let b = doc.add_node(Point::new(600.0, 100.0), &config);
        (doc, config, a, b)
    }

    #[test]
    fn test_short_press_creates_child() {
        let (doc, config, a, _) = setup();
        let start = Point::new(210.0, 200.0);
        let link = LinkState::begin(&doc, a, Side::Bottom, start, &config).unwrap();
        let action = link.release(&doc, Point::new(213.0, 203.0), &config);
        assert_eq!(action, LinkAction::CreateChild { from: a, side: Side::Bottom });
    }

    #[test]
    fn test_drop_on_node_creates_edge_once() {
        let (mut doc, config, a, b) = setup();
        let start = Point::new(210.0, 200.0);
        let link = LinkState::begin(&doc, a, Side::Bottom, start, &config).unwrap();
        let action = link.release(&doc, Point::new(650.0, 150.0), &config);
        assert_eq!(action, LinkAction::Edge { from: a, to: b, side: Side::Bottom });

        doc.upsert_edge(Edge::new(a, b, Side::Bottom));
        let link = LinkState::begin(&doc, a, Side::Bottom, start, &config).unwrap();
        let action = link.release(&doc, Point::new(650.0, 150.0), &config);
        assert_eq!(action, LinkAction::Nothing);
    }

    #[test]
    fn test_drop_on_edge_creates_arrow() {
        let (mut doc, config, a, b) = setup();
        let c = doc.add_node(Point::new(600.0, 500.0), &config);
        doc.upsert_edge(Edge::new(b, c, Side::Bottom));
        let mid = doc.edge_midpoint(EdgeKey::new(b, c), &config).unwrap();

        let mut link = LinkState::begin(&doc, a, Side::Bottom, Point::new(210.0, 200.0), &config).unwrap();
        link.update(&doc, mid, &config);
        assert_eq!(link.target_edge, Some(EdgeKey::new(b, c)));
        assert!(link.preview_curve(&doc, &config).is_some());
        let action = link.release(&doc, mid, &config);
        assert_eq!(action, LinkAction::EdgeArrow { from: a, to_edge_key: EdgeKey::new(b, c) });
    }

    #[test]
    fn test_drop_on_empty_space_does_nothing() {
        let (doc, config, a, _) = setup();
        let link = LinkState::begin(&doc, a, Side::Bottom, Point::new(210.0, 200.0), &config).unwrap();
        assert_eq!(link.release(&doc, Point::new(1500.0, 1500.0), &config), LinkAction::Nothing);
    }

    #[test]
    fn test_auto_child_position_below_and_above() {
        let (doc, config, a, _) = setup();
        let parent = doc.node(a).unwrap();
        let below = auto_child_position(&doc, parent, Side::Bottom, &config).unwrap();
        assert!(below.y > parent.y);
        assert_eq!(below.x % config.grid_size, 0.0);
        assert_eq!(below.y % config.grid_size, 0.0);

        let above = auto_child_position(&doc, parent, Side::Top, &config);
        assert!(above.is_none_or(|p| p.y < parent.y));
    }
}
