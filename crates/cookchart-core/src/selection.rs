//! Editor selection state.
//!
//! Four independent ordered sets. Selection lives in the editor session and
//! is never persisted with the document.

use crate::document::Document;
use crate::model::{EdgeKey, NodeId, StepLineId, TextId};
use std::collections::BTreeSet;

/// Selected entities by id or edge key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: BTreeSet<NodeId>,
    pub step_lines: BTreeSet<StepLineId>,
    pub texts: BTreeSet<TextId>,
    pub edges: BTreeSet<EdgeKey>,
}

/// Flip membership of `value` in `set`.
fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.step_lines.is_empty()
            && self.texts.is_empty()
            && self.edges.is_empty()
    }

    /// Total number of selected entities.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.step_lines.len() + self.texts.len() + self.edges.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace with a node/step-line selection, clearing texts and edges.
    pub fn set_nodes_and_lines(
        &mut self,
        nodes: impl IntoIterator<Item = NodeId>,
        step_lines: impl IntoIterator<Item = StepLineId>,
    ) {
        *self = Self {
            nodes: nodes.into_iter().collect(),
            step_lines: step_lines.into_iter().collect(),
            ..Self::default()
        };
    }

    /// Replace with a text-only selection.
    pub fn set_texts(&mut self, texts: impl IntoIterator<Item = TextId>) {
        *self = Self {
            texts: texts.into_iter().collect(),
            ..Self::default()
        };
    }

    /// Click on a node. Additive clicks toggle it and keep the step-line set;
    /// plain clicks select it alone.
    pub fn click_node(&mut self, id: NodeId, additive: bool) {
        if additive {
            let mut nodes = std::mem::take(&mut self.nodes);
            toggle(&mut nodes, id);
            let lines = std::mem::take(&mut self.step_lines);
            self.set_nodes_and_lines(nodes, lines);
        } else {
            self.set_nodes_and_lines([id], []);
        }
    }

    /// Click on a step line, mirroring [`Selection::click_node`].
    pub fn click_step_line(&mut self, id: StepLineId, additive: bool) {
        if additive {
            let nodes = std::mem::take(&mut self.nodes);
            let mut lines = std::mem::take(&mut self.step_lines);
            toggle(&mut lines, id);
            self.set_nodes_and_lines(nodes, lines);
        } else {
            self.set_nodes_and_lines([], [id]);
        }
    }

    /// Click on a text item. Additive clicks touch only the text set.
    pub fn click_text(&mut self, id: TextId, additive: bool) {
        if additive {
            toggle(&mut self.texts, id);
        } else {
            self.set_texts([id]);
        }
    }

    /// Click on an edge. Additive clicks toggle it and keep everything else;
    /// plain clicks select it alone.
    pub fn click_edge(&mut self, key: EdgeKey, additive: bool) {
        if additive {
            toggle(&mut self.edges, key);
        } else {
            *self = Self {
                edges: BTreeSet::from([key]),
                ..Self::default()
            };
        }
    }

    /// Select every entity in the document.
    pub fn select_all(&mut self, doc: &Document) {
        self.nodes = doc.nodes.iter().map(|n| n.id).collect();
        self.step_lines = doc.step_lines.iter().map(|l| l.id).collect();
        self.texts = doc.texts.iter().map(|t| t.id).collect();
        self.edges = doc.edges.iter().map(|e| e.key()).collect();
    }

    /// Merge another selection into this one.
    pub fn extend(&mut self, other: &Selection) {
        self.nodes.extend(other.nodes.iter().copied());
        self.step_lines.extend(other.step_lines.iter().copied());
        self.texts.extend(other.texts.iter().copied());
        self.edges.extend(other.edges.iter().copied());
    }

    /// Drop ids that no longer exist in `doc`.
    pub fn prune(&mut self, doc: &Document) {
        self.nodes.retain(|id| doc.node(*id).is_some());
        self.step_lines.retain(|id| doc.step_line(*id).is_some());
        self.texts.retain(|id| doc.text(*id).is_some());
        self.edges.retain(|key| doc.edge(*key).is_some());
    }

    /// First selected node, by id order.
    pub fn primary_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::model::{Edge, Side};
    use kurbo::Point;

    #[test]
    fn test_plain_click_replaces() {
        let mut sel = Selection::new();
        sel.click_text(4, false);
        sel.click_edge(EdgeKey::new(1, 2), true);
        sel.click_node(1, false);
        assert_eq!(sel.nodes, BTreeSet::from([1]));
        assert!(sel.texts.is_empty() && sel.edges.is_empty());
    }

    #[test]
    fn test_node_toggle_keeps_step_lines() {
        let mut sel = Selection::new();
        sel.click_step_line(9, false);
        sel.click_text(3, true);
        sel.click_node(1, true);
        sel.click_node(2, true);
        assert_eq!(sel.nodes, BTreeSet::from([1, 2]));
        assert_eq!(sel.step_lines, BTreeSet::from([9]));
        assert!(sel.texts.is_empty());

        sel.click_node(1, true);
        assert_eq!(sel.nodes, BTreeSet::from([2]));
    }

    #[test]
    fn test_text_toggle_touches_only_texts() {
        let mut sel = Selection::new();
        sel.click_node(1, false);
        sel.click_text(5, true);
        sel.click_text(6, true);
        sel.click_text(5, true);
        assert_eq!(sel.nodes, BTreeSet::from([1]));
        assert_eq!(sel.texts, BTreeSet::from([6]));
    }

    #[test]
    fn test_edge_selection_exclusive_unless_additive() {
        let mut sel = Selection::new();
        sel.click_node(1, false);
        sel.click_edge(EdgeKey::new(1, 2), true);
        assert_eq!(sel.len(), 2);
        sel.click_edge(EdgeKey::new(2, 3), false);
        assert_eq!(sel.len(), 1);
        assert!(sel.nodes.is_empty());
    }

    #[test]
    fn test_select_all_and_prune() {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let a = doc.add_node(Point::new(0.0, 0.0), &config);
        let b = doc.add_node(Point::new(0.0, 300.0), &config);
        doc.upsert_edge(Edge::new(a, b, Side::Bottom));
        doc.add_step_line(100.0, &config);
        doc.add_text(Point::new(500.0, 500.0), &config);

        let mut sel = Selection::new();
        sel.select_all(&doc);
        assert_eq!(sel.len(), 5);

        doc.remove_node(a);
        sel.prune(&doc);
        assert_eq!(sel.nodes, BTreeSet::from([b]));
        assert!(sel.edges.is_empty());
        assert_eq!(sel.len(), 3);
    }
}
