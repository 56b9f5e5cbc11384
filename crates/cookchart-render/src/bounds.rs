//! Content bounds for image export.

use cookchart_core::config::BoardConfig;
use cookchart_core::document::Document;
use cookchart_core::geometry::curve_control_bounds;
use kurbo::Rect;

/// Padding around exported content.
pub const EXPORT_PADDING: f64 = 30.0;
/// Stroke allowance around edge control points.
const EDGE_STROKE_MARGIN: f64 = 2.0;
/// Half the vertical extent reserved for a step line and its label.
const STEP_LINE_HALF_HEIGHT: f64 = 8.0;
/// Width used for step lines when nothing else gives a horizontal extent.
const LONE_STEP_LINE_WIDTH: f64 = 320.0;

fn union(acc: Option<Rect>, rect: Rect) -> Option<Rect> {
    Some(acc.map_or(rect, |a| a.union(rect)))
}

/// Tight bounds of every entity, unpadded.
///
/// Step lines only extend the vertical range; they span the horizontal
/// extent of the other content, or `0..320` on a board with nothing else.
pub fn content_bounds(doc: &Document, config: &BoardConfig) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    for node in &doc.nodes {
        bounds = union(bounds, node.rect(config.node_width));
    }
    for text in &doc.texts {
        bounds = union(bounds, text.rect());
    }
    for edge in &doc.edges {
        if let Some(curve) = doc.edge_curve(edge, config) {
            bounds = union(bounds, curve_control_bounds(&curve, EDGE_STROKE_MARGIN));
        }
    }

    let (x0, x1) = match bounds {
        Some(b) if b.width() > 0.0 => (b.x0, b.x1),
        _ => (0.0, LONE_STEP_LINE_WIDTH),
    };
    for line in &doc.step_lines {
        let band = Rect::new(x0, line.y - STEP_LINE_HALF_HEIGHT, x1, line.y + STEP_LINE_HALF_HEIGHT);
        bounds = union(bounds, band);
    }
    bounds
}

/// Export rectangle: content bounds padded by `padding`, snapped outward to
/// whole units and clamped to the board. `None` for an empty board.
pub fn export_bounds(doc: &Document, config: &BoardConfig, padding: f64) -> Option<Rect> {
    let b = content_bounds(doc, config)?;
    let x0 = (b.x0 - padding).floor().max(0.0);
    let y0 = (b.y0 - padding).floor().max(0.0);
    let x1 = (b.x1 + padding).ceil().min(config.board_width);
    let y1 = (b.y1 + padding).ceil().min(config.board_height);
    Some(Rect::new(x0, y0, x1.max(x0 + 1.0), y1.max(y0 + 1.0)))
}
