//! Rubber-band selection from empty board space.

use crate::config::BoardConfig;
use crate::document::Document;
use crate::geometry::{EDGE_MARQUEE_MARGIN, curve_control_bounds, rects_touch};
use crate::selection::Selection;
use kurbo::{Point, Rect};

/// Entities touched by `rect`.
///
/// Nodes and texts by box overlap, step lines by y in the vertical range,
/// edges by their inflated control-point bounds.
pub fn hit_test(doc: &Document, rect: Rect, config: &BoardConfig) -> Selection {
    let rect = rect.abs();
    Selection {
        nodes: doc
            .nodes
            .iter()
            .filter(|n| rects_touch(n.rect(config.node_width), rect))
            .map(|n| n.id)
            .collect(),
        step_lines: doc
            .step_lines
            .iter()
            .filter(|l| l.y >= rect.y0 && l.y <= rect.y1)
            .map(|l| l.id)
            .collect(),
        texts: doc
            .texts
            .iter()
            .filter(|t| rects_touch(t.rect(), rect))
            .map(|t| t.id)
            .collect(),
        edges: doc
            .edges
            .iter()
            .filter(|e| {
                doc.edge_curve(e, config)
                    .is_some_and(|c| rects_touch(curve_control_bounds(&c, EDGE_MARQUEE_MARGIN), rect))
            })
            .map(|e| e.key())
            .collect(),
    }
}

/// An in-progress marquee.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeState {
    start: Point,
    end: Point,
    additive: bool,
    /// Selection when the marquee started, kept for additive mode.
    base: Selection,
}

impl MarqueeState {
    pub fn begin(start: Point, additive: bool, base: Selection) -> Self {
        Self {
            start,
            end: start,
            additive,
            base,
        }
    }

    /// Current rectangle, normalized.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    pub fn is_additive(&self) -> bool {
        self.additive
    }

    /// Move the free corner and compute the resulting selection.
    pub fn update(&mut self, doc: &Document, point: Point, config: &BoardConfig) -> Selection {
        self.end = point;
        let hits = hit_test(doc, self.rect(), config);
        if self.additive {
            let mut selection = self.base.clone();
            selection.extend(&hits);
            selection
        } else {
            hits
        }
    }

    /// Release. A tiny non-additive marquee is a background click and clears
    /// the selection.
    pub fn finish(mut self, doc: &Document, point: Point, config: &BoardConfig) -> Selection {
        let selection = self.update(doc, point, config);
        let rect = self.rect();
        let tolerance = config.marquee_click_tolerance;
        if !self.additive && rect.width() < tolerance && rect.height() < tolerance {
            return Selection::new();
        }
        selection
    }
}
