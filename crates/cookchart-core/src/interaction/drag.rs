//! Group drag of nodes, step lines and text items.

use super::PointerTarget;
use crate::config::BoardConfig;
use crate::document::Document;
use crate::geometry::{snap, snap_point};
use crate::history::Snapshot;
use crate::model::{NodeId, StepLineId, TextId};
use crate::selection::Selection;
use kurbo::{Point, Vec2};

/// Entities moved by a drag, reported so the host can refresh only them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragGroup {
    pub nodes: Vec<NodeId>,
    pub step_lines: Vec<StepLineId>,
    pub texts: Vec<TextId>,
}

impl DragGroup {
    /// Group for a drag starting on `target`: the whole relevant selection if
    /// the target is selected, otherwise the target alone.
    ///
    /// Nodes and step lines travel together; text items form their own group.
    pub fn for_target(target: PointerTarget, selection: &Selection) -> Option<Self> {
        let group = match target {
            PointerTarget::Node(id) if selection.nodes.contains(&id) => Self::nodes_and_lines(selection),
            PointerTarget::StepLine(id) if selection.step_lines.contains(&id) => {
                Self::nodes_and_lines(selection)
            }
            PointerTarget::Node(id) => Self {
                nodes: vec![id],
                ..Self::default()
            },
            PointerTarget::StepLine(id) => Self {
                step_lines: vec![id],
                ..Self::default()
            },
            PointerTarget::Text(id) if selection.texts.contains(&id) => Self {
                texts: selection.texts.iter().copied().collect(),
                ..Self::default()
            },
            PointerTarget::Text(id) => Self {
                texts: vec![id],
                ..Self::default()
            },
            _ => return None,
        };
        Some(group)
    }

    fn nodes_and_lines(selection: &Selection) -> Self {
        Self {
            nodes: selection.nodes.iter().copied().collect(),
            step_lines: selection.step_lines.iter().copied().collect(),
            texts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.step_lines.is_empty() && self.texts.is_empty()
    }

    /// Selection equal to this group.
    pub fn to_selection(&self) -> Selection {
        let mut selection = Selection::new();
        if self.texts.is_empty() {
            selection.set_nodes_and_lines(self.nodes.iter().copied(), self.step_lines.iter().copied());
        } else {
            selection.set_texts(self.texts.iter().copied());
        }
        selection
    }
}

/// An in-progress drag.
#[derive(Debug, Clone)]
pub struct DragState {
    /// State before the drag, committed to history only if something moved.
    pub before: Snapshot,
    pub target: PointerTarget,
    pub additive: bool,
    group: DragGroup,
    start: Point,
    /// Step-line drags move only vertically.
    vertical_only: bool,
    node_origins: Vec<(NodeId, Point)>,
    line_origins: Vec<(StepLineId, f64)>,
    text_origins: Vec<(TextId, Point)>,
    moved: bool,
}

/// Result of releasing a drag.
#[derive(Debug, Clone)]
pub struct DragOutcome {
    pub before: Snapshot,
    pub target: PointerTarget,
    pub additive: bool,
    pub group: DragGroup,
    pub moved: bool,
}

impl DragState {
    /// Start dragging `group`, recording every member's start position.
    pub fn begin(
        doc: &Document,
        before: Snapshot,
        target: PointerTarget,
        group: DragGroup,
        start: Point,
        additive: bool,
    ) -> Self {
        let node_origins = group
            .nodes
            .iter()
            .filter_map(|id| doc.node(*id).map(|n| (*id, n.position())))
            .collect();
        let line_origins = group
            .step_lines
            .iter()
            .filter_map(|id| doc.step_line(*id).map(|l| (*id, l.y)))
            .collect();
        let text_origins = group
            .texts
            .iter()
            .filter_map(|id| doc.text(*id).map(|t| (*id, t.position())))
            .collect();
        Self {
            before,
            target,
            additive,
            group,
            start,
            vertical_only: matches!(target, PointerTarget::StepLine(_)),
            node_origins,
            line_origins,
            text_origins,
            moved: false,
        }
    }

    pub fn group(&self) -> &DragGroup {
        &self.group
    }

    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Apply the cumulative delta from the start point to every member.
    pub fn update(&mut self, doc: &mut Document, point: Point, config: &BoardConfig) -> &DragGroup {
        let mut delta = point - self.start;
        if self.vertical_only {
            delta.x = 0.0;
        }
        if delta != Vec2::ZERO {
            self.moved = true;
        }
        for (id, origin) in &self.node_origins {
            if let Some(node) = doc.node_mut(*id) {
                node.x = origin.x + delta.x;
                node.y = origin.y + delta.y;
                node.clamp(config);
            }
        }
        for (id, origin) in &self.line_origins {
            if let Some(line) = doc.step_line_mut(*id) {
                line.y = (origin + delta.y).clamp(0.0, config.board_height);
            }
        }
        for (id, origin) in &self.text_origins {
            if let Some(text) = doc.text_mut(*id) {
                text.x = origin.x + delta.x;
                text.y = origin.y + delta.y;
                text.clamp(config);
            }
        }
        &self.group
    }

    /// Release: snap every member to the grid if anything moved.
    pub fn finish(self, doc: &mut Document, config: &BoardConfig) -> DragOutcome {
        if self.moved {
            for (id, _) in &self.node_origins {
                if let Some(node) = doc.node_mut(*id) {
                    let p = snap_point(node.position(), config.grid_size);
                    node.x = p.x;
                    node.y = p.y;
                    node.clamp(config);
                }
            }
            for (id, _) in &self.line_origins {
                if let Some(line) = doc.step_line_mut(*id) {
                    line.y = snap(line.y, config.grid_size).clamp(0.0, config.board_height);
                }
            }
            for (id, _) in &self.text_origins {
                if let Some(text) = doc.text_mut(*id) {
                    let p = snap_point(text.position(), config.grid_size);
                    text.x = p.x;
                    text.y = p.y;
                    text.clamp(config);
                }
            }
        }
        DragOutcome {
            before: self.before,
            target: self.target,
            additive: self.additive,
            group: self.group,
            moved: self.moved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Document, BoardConfig, NodeId, NodeId, StepLineId) {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let a = doc.add_node(Point::new(100.0, 100.0), &config);
        let b = doc.add_node(Point::new(400.0, 100.0), &config);
        let line = doc.add_step_line(600.0, &config);
        (doc, config, a, b, line)
    }

    #[test]
    fn test_group_for_selected_target() {
        let mut sel = Selection::new();
        sel.set_nodes_and_lines([1, 2], [5]);
        let group = DragGroup::for_target(PointerTarget::Node(2), &sel).unwrap();
        assert_eq!(group.nodes, vec![1, 2]);
        assert_eq!(group.step_lines, vec![5]);

        let group = DragGroup::for_target(PointerTarget::Node(3), &sel).unwrap();
        assert_eq!(group.nodes, vec![3]);
        assert!(group.step_lines.is_empty());

        assert!(DragGroup::for_target(PointerTarget::Background, &sel).is_none());
    }

    #[test]
    fn test_drag_moves_group_and_snaps() {
        let (mut doc, config, a, b, line) = setup();
        let group = DragGroup {
            nodes: vec![a, b],
            step_lines: vec![line],
            texts: vec![],
        };
        let before = Snapshot::capture(&doc, &Selection::new());
        let mut drag = DragState::begin(&doc, before, PointerTarget::Node(a), group, Point::new(150.0, 150.0), false);
        drag.update(&mut doc, Point::new(160.0, 180.0), &config);
        drag.update(&mut doc, Point::new(163.0, 187.0), &config);
        assert_eq!(doc.node(a).unwrap().position(), Point::new(113.0, 137.0));
        assert_eq!(doc.step_line(line).unwrap().y, 637.0);

        let outcome = drag.finish(&mut doc, &config);
        assert!(outcome.moved);
        assert_eq!(doc.node(a).unwrap().position(), Point::new(120.0, 140.0));
        assert_eq!(doc.node(b).unwrap().position(), Point::new(420.0, 140.0));
        assert_eq!(doc.step_line(line).unwrap().y, 640.0);
    }

    #[test]
    fn test_drag_stays_inside_board() {
        let (mut doc, config, a, _, _) = setup();
        let group = DragGroup {
            nodes: vec![a],
            ..DragGroup::default()
        };
        let before = Snapshot::capture(&doc, &Selection::new());
        let mut drag = DragState::begin(&doc, before, PointerTarget::Node(a), group, Point::ZERO, false);
        for p in [Point::new(-5000.0, -5000.0), Point::new(9000.0, 9000.0), Point::new(3.0, -7.0)] {
            drag.update(&mut doc, p, &config);
            let node = doc.node(a).unwrap();
            assert!(node.x >= 0.0 && node.x <= config.board_width - config.node_width);
            assert!(node.y >= 0.0 && node.y <= config.board_height - node.h);
        }
        drag.finish(&mut doc, &config);
        let node = doc.node(a).unwrap();
        assert!(node.x >= 0.0 && node.y >= 0.0);
    }

    #[test]
    fn test_step_line_drag_is_vertical() {
        let (mut doc, config, a, _, line) = setup();
        let group = DragGroup {
            nodes: vec![a],
            step_lines: vec![line],
            texts: vec![],
        };
        let before = Snapshot::capture(&doc, &Selection::new());
        let mut drag = DragState::begin(&doc, before, PointerTarget::StepLine(line), group, Point::new(0.0, 600.0), false);
        drag.update(&mut doc, Point::new(300.0, 640.0), &config);
        assert_eq!(doc.node(a).unwrap().position(), Point::new(100.0, 140.0));
    }

    #[test]
    fn test_no_movement_is_not_moved() {
        let (mut doc, config, a, _, _) = setup();
        let group = DragGroup {
            nodes: vec![a],
            ..DragGroup::default()
        };
        let before = Snapshot::capture(&doc, &Selection::new());
        let mut drag = DragState::begin(&doc, before, PointerTarget::Node(a), group, Point::new(10.0, 10.0), false);
        drag.update(&mut doc, Point::new(10.0, 10.0), &config);
        let outcome = drag.finish(&mut doc, &config);
        assert!(!outcome.moved);
        assert_eq!(doc.node(a).unwrap().position(), Point::new(100.0, 100.0));
    }
}
