//! Chart document: entity collections and id counters.

use crate::config::BoardConfig;
use crate::geometry::{
    EDGE_HIT_TOLERANCE, anchor_for, curve_hit, curve_midpoint, edge_arrow_curve, edge_curve, snap,
};
use crate::model::{
    Edge, EdgeArrow, EdgeKey, Node, NodeId, Side, StepLine, StepLineId, TextId, TextItem,
};
use kurbo::{CubicBez, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How far the step-line placement search walks before giving up.
const STEP_LINE_SEARCH_LIMIT: usize = 400;

/// The persisted board content.
///
/// Every collection is kept in insertion order; ids come from the three
/// counters, which only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub edge_arrows: Vec<EdgeArrow>,
    pub step_lines: Vec<StepLine>,
    pub texts: Vec<TextItem>,
    pub next_id: NodeId,
    pub next_step_line_id: StepLineId,
    pub next_text_id: TextId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Entities removed by a delete operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Removed {
    pub nodes: Vec<NodeId>,
    pub step_lines: Vec<StepLineId>,
    pub texts: Vec<TextId>,
    pub edges: Vec<EdgeKey>,
    pub edge_arrows: usize,
}

impl Removed {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.step_lines.is_empty()
            && self.texts.is_empty()
            && self.edges.is_empty()
            && self.edge_arrows == 0
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_arrows: Vec::new(),
            step_lines: Vec::new(),
            texts: Vec::new(),
            next_id: 1,
            next_step_line_id: 1,
            next_text_id: 1,
        }
    }

    /// Whether the board has no entities at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.step_lines.is_empty() && self.texts.is_empty()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Stable signature of the content, used for dirty tracking.
    pub fn signature(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    // --- id allocation -------------------------------------------------

    fn allocate_node_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn allocate_step_line_id(&mut self) -> StepLineId {
        let id = self.next_step_line_id;
        self.next_step_line_id += 1;
        id
    }

    fn allocate_text_id(&mut self) -> TextId {
        let id = self.next_text_id;
        self.next_text_id += 1;
        id
    }

    // --- nodes ---------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Add an empty node at `position` (clamped into the board).
    pub fn add_node(&mut self, position: Point, config: &BoardConfig) -> NodeId {
        let id = self.allocate_node_id();
        let mut node = Node::new(id, position, config);
        node.clamp(config);
        self.nodes.push(node);
        id
    }

    /// Add a copy of `template` under a fresh id, clamped into the board.
    pub fn add_node_from(&mut self, template: &Node, config: &BoardConfig) -> NodeId {
        let id = self.allocate_node_id();
        let mut node = template.clone();
        node.id = id;
        node.clamp(config);
        self.nodes.push(node);
        id
    }

    /// Remove a node together with every edge touching it and every edge
    /// arrow sourced from it or aimed at one of those edges.
    pub fn remove_node(&mut self, id: NodeId) -> Removed {
        self.remove_many(&BTreeSet::from([id]), &BTreeSet::new(), &BTreeSet::new(), &BTreeSet::new())
    }

    // --- edges ---------------------------------------------------------

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.iter().find(|e| e.key() == key)
    }

    pub fn edge_exists(&self, from: NodeId, to: NodeId) -> bool {
        self.edge(EdgeKey::new(from, to)).is_some()
    }

    /// Insert an edge, replacing any edge with the same ordered pair.
    pub fn upsert_edge(&mut self, edge: Edge) {
        match self.edges.iter_mut().find(|e| e.key() == edge.key()) {
            Some(existing) => *existing = edge,
            None => self.edges.push(edge),
        }
    }

    /// Add an edge-arrow decoration unless an identical one exists or the
    /// target edge is missing. Returns whether it was added.
    pub fn add_edge_arrow(&mut self, from: NodeId, to_edge_key: EdgeKey) -> bool {
        if self.edge(to_edge_key).is_none() || self.node(from).is_none() {
            return false;
        }
        if self.edge_arrows.iter().any(|a| a.from == from && a.to_edge_key == to_edge_key) {
            return false;
        }
        self.edge_arrows.push(EdgeArrow { from, to_edge_key });
        true
    }

    /// Layout curve of an edge, from the live node positions and heights.
    pub fn edge_curve(&self, edge: &Edge, config: &BoardConfig) -> Option<CubicBez> {
        let from = self.node(edge.from)?;
        let to = self.node(edge.to)?;
        let (from_side, to_side) = edge.layout_sides();
        Some(edge_curve(
            anchor_for(from, from_side, config.node_width),
            from_side,
            anchor_for(to, to_side, config.node_width),
            to_side,
        ))
    }

    /// Visual midpoint of an edge.
    pub fn edge_midpoint(&self, key: EdgeKey, config: &BoardConfig) -> Option<Point> {
        let edge = self.edge(key)?;
        self.edge_curve(edge, config).map(|c| curve_midpoint(&c))
    }

    /// Layout curve of an edge arrow.
    pub fn edge_arrow_curve(&self, arrow: &EdgeArrow, config: &BoardConfig) -> Option<CubicBez> {
        let from = self.node(arrow.from)?;
        let to = self.edge_midpoint(arrow.to_edge_key, config)?;
        Some(edge_arrow_curve(anchor_for(from, Side::Bottom, config.node_width), to))
    }

    // --- step lines ----------------------------------------------------

    pub fn step_line(&self, id: StepLineId) -> Option<&StepLine> {
        self.step_lines.iter().find(|l| l.id == id)
    }

    pub fn step_line_mut(&mut self, id: StepLineId) -> Option<&mut StepLine> {
        self.step_lines.iter_mut().find(|l| l.id == id)
    }

    /// Snap and clamp `y`, then move outward (down first) in grid steps until
    /// no other step line occupies it.
    pub fn free_step_line_y(&self, y: f64, config: &BoardConfig) -> f64 {
        let clamp_y = |v: f64| v.min(config.board_height).max(0.0);
        let occupied = |v: f64| self.step_lines.iter().any(|l| l.y == v);
        let start = clamp_y(snap(y, config.grid_size));
        if !occupied(start) {
            return start;
        }
        for i in 1..STEP_LINE_SEARCH_LIMIT {
            let offset = i as f64 * config.grid_size;
            let down = clamp_y(start + offset);
            if !occupied(down) {
                return down;
            }
            let up = clamp_y(start - offset);
            if !occupied(up) {
                return up;
            }
        }
        start
    }

    /// Add a step line at the nearest free grid position to `y`.
    pub fn add_step_line(&mut self, y: f64, config: &BoardConfig) -> StepLineId {
        let y = self.free_step_line_y(y, config);
        let id = self.allocate_step_line_id();
        self.step_lines.push(StepLine::new(id, y));
        id
    }

    /// Step lines in ascending y order, paired with their rank.
    pub fn ranked_step_lines(&self) -> Vec<(usize, &StepLine)> {
        let mut sorted: Vec<&StepLine> = self.step_lines.iter().collect();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
        sorted.into_iter().enumerate().collect()
    }

    // --- texts ---------------------------------------------------------

    pub fn text(&self, id: TextId) -> Option<&TextItem> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn text_mut(&mut self, id: TextId) -> Option<&mut TextItem> {
        self.texts.iter_mut().find(|t| t.id == id)
    }

    /// Add an empty text item at `position` (clamped into the board).
    pub fn add_text(&mut self, position: Point, config: &BoardConfig) -> TextId {
        let id = self.allocate_text_id();
        let mut text = TextItem::new(id, position, config);
        text.clamp(config);
        self.texts.push(text);
        id
    }

    /// Add a copy of `template` under a fresh id, clamped into the board.
    pub fn add_text_from(&mut self, template: &TextItem, config: &BoardConfig) -> TextId {
        let id = self.allocate_text_id();
        let mut text = template.clone();
        text.id = id;
        text.clamp(config);
        self.texts.push(text);
        id
    }

    // --- hit testing ---------------------------------------------------

    /// Topmost node whose box contains `point`.
    pub fn node_at(&self, point: Point, config: &BoardConfig) -> Option<NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.rect(config.node_width).contains(point))
            .map(|n| n.id)
    }

    /// Topmost text item whose box contains `point`.
    pub fn text_at(&self, point: Point) -> Option<TextId> {
        self.texts.iter().rev().find(|t| t.rect().contains(point)).map(|t| t.id)
    }

    /// Step line whose y lies within `tolerance` of `point.y`.
    pub fn step_line_at(&self, point: Point, tolerance: f64) -> Option<StepLineId> {
        self.step_lines
            .iter()
            .filter(|l| (l.y - point.y).abs() <= tolerance)
            .min_by(|a, b| (a.y - point.y).abs().total_cmp(&(b.y - point.y).abs()))
            .map(|l| l.id)
    }

    /// Topmost edge whose hit stroke covers `point`.
    pub fn edge_at(&self, point: Point, config: &BoardConfig) -> Option<EdgeKey> {
        self.edges
            .iter()
            .rev()
            .find(|e| {
                self.edge_curve(e, config)
                    .is_some_and(|c| curve_hit(&c, point, EDGE_HIT_TOLERANCE))
            })
            .map(Edge::key)
    }

    // --- bulk removal --------------------------------------------------

    /// Remove the given entities with the node → edge → edge-arrow cascade.
    pub fn remove_many(
        &mut self,
        nodes: &BTreeSet<NodeId>,
        step_lines: &BTreeSet<StepLineId>,
        texts: &BTreeSet<TextId>,
        edges: &BTreeSet<EdgeKey>,
    ) -> Removed {
        let removed_edges: BTreeSet<EdgeKey> = self
            .edges
            .iter()
            .map(Edge::key)
            .filter(|k| nodes.contains(&k.from) || nodes.contains(&k.to) || edges.contains(k))
            .collect();

        let mut removed = Removed::default();
        self.nodes.retain(|n| {
            let gone = nodes.contains(&n.id);
            if gone {
                removed.nodes.push(n.id);
            }
            !gone
        });
        self.step_lines.retain(|l| {
            let gone = step_lines.contains(&l.id);
            if gone {
                removed.step_lines.push(l.id);
            }
            !gone
        });
        self.texts.retain(|t| {
            let gone = texts.contains(&t.id);
            if gone {
                removed.texts.push(t.id);
            }
            !gone
        });
        self.edges.retain(|e| !removed_edges.contains(&e.key()));
        let arrows_before = self.edge_arrows.len();
        self.edge_arrows
            .retain(|a| !nodes.contains(&a.from) && !removed_edges.contains(&a.to_edge_key));
        removed.edge_arrows = arrows_before - self.edge_arrows.len();
        removed.edges = removed_edges.into_iter().collect();
        removed
    }
}
