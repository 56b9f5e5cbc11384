//! Display list projected from the document.
//!
//! [`Scene::build`] is a pure function of the render context: calling it
//! twice without a mutation in between yields equal scenes. During a drag,
//! [`Scene::patch`] refreshes only the moved entities and the edges attached
//! to them.

use crate::renderer::RenderContext;
use cookchart_core::interaction::{DragGroup, FieldTarget};
use cookchart_core::model::{EdgeArrow, EdgeKey, Node, NodeColor, NodeId, StepLineId, TextId, TextItem};
use kurbo::{CubicBez, Rect};
use peniko::Color;

/// Ink used for titles, body text and edges.
pub const INK: Color = Color::from_rgba8(20, 50, 58, 255);
/// Stroke color of edges and edge arrows.
pub const EDGE_COLOR: Color = Color::from_rgba8(9, 99, 126, 255);
/// Stroke color of step lines.
pub const STEP_LINE_COLOR: Color = Color::from_rgba8(107, 114, 128, 140);
/// Grid stroke color.
pub const GRID_COLOR: Color = Color::from_rgba8(215, 234, 237, 255);

/// Fill and border of a node card.
pub fn node_palette(color: NodeColor) -> (Color, Color) {
    match color {
        NodeColor::Gray => (Color::from_rgba8(252, 253, 255, 255), Color::from_rgba8(183, 208, 214, 255)),
        NodeColor::Green => (Color::from_rgba8(200, 228, 233, 255), Color::from_rgba8(8, 131, 149, 255)),
        NodeColor::Orange => (Color::from_rgba8(248, 216, 227, 255), Color::from_rgba8(179, 9, 63, 255)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub id: NodeId,
    pub rect: Rect,
    pub fill: Color,
    pub border: Color,
    pub title: String,
    pub time: String,
    pub tags: Vec<String>,
    pub memo: String,
    pub selected: bool,
    /// Hovered as the target of a connector drag.
    pub link_target: bool,
    /// One of its fields is being edited.
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeVisual {
    pub key: EdgeKey,
    pub curve: CubicBez,
    pub selected: bool,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeArrowVisual {
    pub from: NodeId,
    pub to_edge_key: EdgeKey,
    pub curve: CubicBez,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepLineVisual {
    pub id: StepLineId,
    pub y: f64,
    pub label: String,
    pub selected: bool,
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextVisual {
    pub id: TextId,
    pub rect: Rect,
    pub text: String,
    pub bold: bool,
    pub selected: bool,
    pub editing: bool,
}

/// Everything to draw for one frame, in paint order: step lines, edges,
/// edge arrows, nodes, texts, then overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub board: Rect,
    pub grid_size: Option<f64>,
    pub background: Color,
    pub selection_color: Color,
    pub step_lines: Vec<StepLineVisual>,
    pub edges: Vec<EdgeVisual>,
    pub edge_arrows: Vec<EdgeArrowVisual>,
    pub nodes: Vec<NodeVisual>,
    pub texts: Vec<TextVisual>,
    pub marquee: Option<Rect>,
    pub link_preview: Option<CubicBez>,
}

impl Scene {
    /// Project the whole document.
    pub fn build(ctx: &RenderContext) -> Self {
        let doc = ctx.document;
        let config = ctx.config;
        Self {
            board: Rect::new(0.0, 0.0, config.board_width, config.board_height),
            grid_size: ctx.show_grid.then_some(config.grid_size),
            background: ctx.background_color,
            selection_color: ctx.selection_color,
            step_lines: step_line_visuals(ctx),
            edges: doc
                .edges
                .iter()
                .filter_map(|e| edge_visual(ctx, e.key()))
                .collect(),
            edge_arrows: doc
                .edge_arrows
                .iter()
                .filter_map(|a| edge_arrow_visual(ctx, a))
                .collect(),
            nodes: doc.nodes.iter().map(|n| node_visual(ctx, n)).collect(),
            texts: doc.texts.iter().map(|t| text_visual(ctx, t)).collect(),
            marquee: ctx.marquee,
            link_preview: ctx.link_preview,
        }
    }

    /// Refresh the entities in `group` after a drag move.
    ///
    /// Step line labels depend on the y order of every line, so all step
    /// lines are relabeled when any of them moved.
    pub fn patch(&mut self, ctx: &RenderContext, group: &DragGroup) {
        let doc = ctx.document;
        for visual in self.nodes.iter_mut().filter(|v| group.nodes.contains(&v.id)) {
            if let Some(node) = doc.node(visual.id) {
                *visual = node_visual(ctx, node);
            }
        }
        for visual in self.texts.iter_mut().filter(|v| group.texts.contains(&v.id)) {
            if let Some(text) = doc.text(visual.id) {
                *visual = text_visual(ctx, text);
            }
        }
        if !group.step_lines.is_empty() {
            self.step_lines = step_line_visuals(ctx);
        }
        if group.nodes.is_empty() {
            return;
        }

        let moved = |key: &EdgeKey| group.nodes.iter().any(|&id| key.touches(id));
        for visual in self.edges.iter_mut().filter(|v| moved(&v.key)) {
            if let Some(updated) = edge_visual(ctx, visual.key) {
                *visual = updated;
            }
        }
        for visual in &mut self.edge_arrows {
            if group.nodes.contains(&visual.from) || moved(&visual.to_edge_key) {
                let arrow = EdgeArrow {
                    from: visual.from,
                    to_edge_key: visual.to_edge_key,
                };
                if let Some(updated) = edge_arrow_visual(ctx, &arrow) {
                    *visual = updated;
                }
            }
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeVisual> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeVisual> {
        self.edges.iter().find(|e| e.key == key)
    }
}

fn node_visual(ctx: &RenderContext, node: &Node) -> NodeVisual {
    let (fill, border) = node_palette(node.color);
    NodeVisual {
        id: node.id,
        rect: node.rect(ctx.config.node_width),
        fill,
        border,
        title: node.title.clone(),
        time: node.time.clone(),
        tags: node.tags.clone(),
        memo: node.memo().to_string(),
        selected: ctx.selection.nodes.contains(&node.id),
        link_target: ctx.link_target == Some(node.id),
        editing: ctx.editing.and_then(|t| t.node()) == Some(node.id),
    }
}

fn text_visual(ctx: &RenderContext, text: &TextItem) -> TextVisual {
    TextVisual {
        id: text.id,
        rect: text.rect(),
        text: text.text.clone(),
        bold: text.bold,
        selected: ctx.selection.texts.contains(&text.id),
        editing: ctx.editing == Some(FieldTarget::TextBody(text.id)),
    }
}

fn step_line_visuals(ctx: &RenderContext) -> Vec<StepLineVisual> {
    ctx.document
        .ranked_step_lines()
        .into_iter()
        .map(|(rank, line)| StepLineVisual {
            id: line.id,
            y: line.y,
            label: line.display_label(rank),
            selected: ctx.selection.step_lines.contains(&line.id),
            editing: ctx.editing == Some(FieldTarget::StepLabel(line.id)),
        })
        .collect()
}

fn edge_visual(ctx: &RenderContext, key: EdgeKey) -> Option<EdgeVisual> {
    let edge = ctx.document.edge(key)?;
    Some(EdgeVisual {
        key,
        curve: ctx.document.edge_curve(edge, ctx.config)?,
        selected: ctx.selection.edges.contains(&key),
        hovered: ctx.hovered_edge == Some(key),
    })
}

fn edge_arrow_visual(ctx: &RenderContext, arrow: &EdgeArrow) -> Option<EdgeArrowVisual> {
    Some(EdgeArrowVisual {
        from: arrow.from,
        to_edge_key: arrow.to_edge_key,
        curve: ctx.document.edge_arrow_curve(arrow, ctx.config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookchart_core::config::BoardConfig;
    use cookchart_core::document::Document;
    use cookchart_core::model::{Edge, Side};
    use cookchart_core::selection::Selection;
    use kurbo::{Point, Vec2};

    fn sample() -> (Document, BoardConfig) {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let a = doc.add_node(Point::new(100.0, 100.0), &config);
        let b = doc.add_node(Point::new(100.0, 400.0), &config);
        let c = doc.add_node(Point::new(600.0, 100.0), &config);
        doc.upsert_edge(Edge::new(a, b, Side::Bottom));
        doc.add_edge_arrow(c, EdgeKey::new(a, b));
        doc.add_step_line(300.0, &config);
        doc.add_step_line(100.0, &config);
        doc.add_text(Point::new(900.0, 900.0), &config);
        (doc, config)
    }

    #[test]
    fn test_build_is_idempotent() {
        let (doc, config) = sample();
        let selection = Selection::new();
        let ctx = RenderContext::new(&doc, &selection, &config);
        let first = Scene::build(&ctx);
        assert_eq!(first, Scene::build(&ctx));
        assert_eq!(first.nodes.len(), 3);
        assert_eq!(first.edges.len(), 1);
        assert_eq!(first.edge_arrows.len(), 1);
        assert_eq!(first.texts.len(), 1);
    }

    #[test]
    fn test_step_line_labels_follow_y_order() {
        let (mut doc, config) = sample();
        doc.step_lines[0].label = "  ".to_string();
        let selection = Selection::new();
        let scene = Scene::build(&RenderContext::new(&doc, &selection, &config));
        let labels: Vec<(f64, &str)> = scene.step_lines.iter().map(|l| (l.y, l.label.as_str())).collect();
        assert_eq!(labels, vec![(100.0, "STEP 1"), (300.0, "STEP 2")]);
    }

    #[test]
    fn test_selection_and_overlays() {
        let (doc, config) = sample();
        let mut selection = Selection::new();
        selection.click_edge(EdgeKey::new(1, 2), false);
        let ctx = RenderContext::new(&doc, &selection, &config)
            .with_marquee(Some(Rect::new(0.0, 0.0, 10.0, 10.0)))
            .with_editing(Some(FieldTarget::Title(3)))
            .with_grid(false);
        let scene = Scene::build(&ctx);
        assert!(scene.edge(EdgeKey::new(1, 2)).unwrap().selected);
        assert!(!scene.node(1).unwrap().selected);
        assert!(scene.node(3).unwrap().editing);
        assert!(scene.marquee.is_some());
        assert!(scene.grid_size.is_none());
    }

    #[test]
    fn test_palette() {
        let (doc, config) = sample();
        let mut doc = doc;
        doc.node_mut(2).unwrap().color = NodeColor::Orange;
        let selection = Selection::new();
        let scene = Scene::build(&RenderContext::new(&doc, &selection, &config));
        assert_eq!(scene.node(2).unwrap().fill, node_palette(NodeColor::Orange).0);
        assert_eq!(scene.node(1).unwrap().border, node_palette(NodeColor::Gray).1);
    }

    #[test]
    fn test_patch_matches_full_build() {
        let (mut doc, config) = sample();
        let selection = Selection::new();
        let mut scene = Scene::build(&RenderContext::new(&doc, &selection, &config));

        let node = doc.node_mut(1).unwrap();
        let p = node.position() + Vec2::new(40.0, 60.0);
        node.x = p.x;
        node.y = p.y;
        doc.step_lines[1].y = 500.0;
        let group = DragGroup {
            nodes: vec![1],
            step_lines: vec![2],
            texts: vec![],
        };
        let ctx = RenderContext::new(&doc, &selection, &config);
        scene.patch(&ctx, &group);
        assert_eq!(scene, Scene::build(&ctx));
    }
}
