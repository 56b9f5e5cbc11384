//! SVG backend.
//!
//! Writes a [`Scene`] as a standalone SVG document: the full board for live
//! frames, or the padded content bounds for export.

use crate::bounds::{EXPORT_PADDING, export_bounds};
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use crate::scene::{
    EDGE_COLOR, EdgeArrowVisual, EdgeVisual, GRID_COLOR, INK, NodeVisual, STEP_LINE_COLOR, Scene, StepLineVisual,
    TextVisual,
};
use cookchart_core::config::BoardConfig;
use cookchart_core::document::Document;
use cookchart_core::selection::Selection;
use kurbo::{CubicBez, Rect};
use peniko::Color;
use std::fmt::{self, Write};

const FONT_FAMILY: &str = r#""Hiragino Kaku Gothic ProN", "Yu Gothic", sans-serif"#;
const CARD_RADIUS: f64 = 10.0;
const EDGE_WIDTH: f64 = 1.7;
const SELECTED_EDGE_WIDTH: f64 = 3.0;

/// CSS color notation.
pub fn css(color: Color) -> String {
    let c = color.to_rgba8();
    if c.a == 255 {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    } else {
        format!("rgba({}, {}, {}, {:.3})", c.r, c.g, c.b, f64::from(c.a) / 255.0)
    }
}

/// Escape text for element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn path_data(curve: &CubicBez) -> String {
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        curve.p0.x, curve.p0.y, curve.p1.x, curve.p1.y, curve.p2.x, curve.p2.y, curve.p3.x, curve.p3.y
    )
}

/// Renders scenes to SVG text.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    output: String,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output of the last frame.
    pub fn svg(&self) -> &str {
        &self.output
    }

    /// Take the output of the last frame, leaving the renderer empty.
    pub fn take_svg(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Export the document's content without selection or gesture overlays,
    /// cropped to the padded content bounds.
    pub fn export(document: &Document, config: &BoardConfig) -> RenderResult<String> {
        let view = export_bounds(document, config, EXPORT_PADDING).ok_or(RendererError::EmptyBoard)?;
        let selection = Selection::new();
        let scene = Scene::build(&RenderContext::new(document, &selection, config));
        let mut out = String::new();
        write_scene(&mut out, &scene, view).map_err(|e| RendererError::RenderFailed(e.to_string()))?;
        log::info!("exported {}x{} board region", view.width(), view.height());
        Ok(out)
    }
}

impl Renderer for SvgRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let scene = Scene::build(ctx);
        self.output.clear();
        write_scene(&mut self.output, &scene, scene.board).map_err(|e| RendererError::RenderFailed(e.to_string()))
    }
}

/// Write `scene` clipped to `view` (board coordinates).
pub fn write_scene(out: &mut String, scene: &Scene, view: Rect) -> fmt::Result {
    writeln!(
        out,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}" font-family='{font}'>"#,
        x = view.x0,
        y = view.y0,
        w = view.width(),
        h = view.height(),
        font = FONT_FAMILY,
    )?;
    writeln!(
        out,
        r#"  <defs>
    <marker id="arrowhead" markerWidth="8" markerHeight="6" refX="7" refY="3" orient="auto" fill="{}">
      <polygon points="0 0, 8 3, 0 6" />
    </marker>"#,
        css(EDGE_COLOR)
    )?;
    if let Some(grid) = scene.grid_size {
        writeln!(
            out,
            r#"    <pattern id="grid" width="{g}" height="{g}" patternUnits="userSpaceOnUse">
      <path d="M {g} 0 L 0 0 0 {g}" fill="none" stroke="{}" stroke-width="1" />
    </pattern>"#,
            css(GRID_COLOR),
            g = grid,
        )?;
    }
    writeln!(out, "  </defs>")?;

    write_rect(out, view, &format!(r#"fill="{}""#, css(scene.background)))?;
    if scene.grid_size.is_some() {
        write_rect(out, view, r#"fill="url(#grid)""#)?;
    }

    for line in &scene.step_lines {
        write_step_line(out, line, view, scene.selection_color)?;
    }
    for edge in &scene.edges {
        write_edge(out, edge, scene.selection_color)?;
    }
    for arrow in &scene.edge_arrows {
        write_edge_arrow(out, arrow)?;
    }
    for node in &scene.nodes {
        write_node(out, node, scene.selection_color)?;
    }
    for text in &scene.texts {
        write_text(out, text, scene.selection_color)?;
    }

    if let Some(curve) = &scene.link_preview {
        writeln!(
            out,
            r#"  <path d="{}" fill="none" stroke="{}" stroke-width="2" stroke-dasharray="6 4" />"#,
            path_data(curve),
            css(scene.selection_color)
        )?;
    }
    if let Some(rect) = scene.marquee {
        write_rect(
            out,
            rect,
            &format!(
                r#"fill="{}" stroke="{}" stroke-dasharray="4 3""#,
                css(scene.selection_color.with_alpha(0.1)),
                css(scene.selection_color)
            ),
        )?;
    }

    writeln!(out, "</svg>")
}

fn write_rect(out: &mut String, rect: Rect, attrs: &str) -> fmt::Result {
    writeln!(
        out,
        r#"  <rect x="{}" y="{}" width="{}" height="{}" {} />"#,
        rect.x0,
        rect.y0,
        rect.width(),
        rect.height(),
        attrs
    )
}

fn write_step_line(out: &mut String, line: &StepLineVisual, view: Rect, selected: Color) -> fmt::Result {
    let stroke = if line.selected { selected } else { STEP_LINE_COLOR };
    writeln!(
        out,
        r#"  <line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1.5" stroke-dasharray="8 6" />"#,
        view.x0,
        view.x1,
        css(stroke),
        y = line.y,
    )?;
    if !line.editing {
        writeln!(
            out,
            r#"  <text x="{}" y="{}" font-size="11" fill="{}">{}</text>"#,
            view.x0 + 8.0,
            line.y - 4.0,
            css(EDGE_COLOR),
            escape(&line.label)
        )?;
    }
    Ok(())
}

fn write_edge(out: &mut String, edge: &EdgeVisual, selected: Color) -> fmt::Result {
    let (stroke, width) = if edge.selected || edge.hovered {
        (selected, SELECTED_EDGE_WIDTH)
    } else {
        (EDGE_COLOR, EDGE_WIDTH)
    };
    writeln!(
        out,
        r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{}" data-key="{}" />"#,
        path_data(&edge.curve),
        css(stroke),
        width,
        edge.key
    )
}

fn write_edge_arrow(out: &mut String, arrow: &EdgeArrowVisual) -> fmt::Result {
    writeln!(
        out,
        r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-dasharray="5 4" marker-end="url(#arrowhead)" />"#,
        path_data(&arrow.curve),
        css(EDGE_COLOR),
        EDGE_WIDTH
    )
}

fn write_node(out: &mut String, node: &NodeVisual, selected: Color) -> fmt::Result {
    let r = node.rect;
    let (border, width) = if node.selected || node.link_target {
        (selected, 2.0)
    } else {
        (node.border, 1.0)
    };
    writeln!(out, r#"  <g data-node="{}">"#, node.id)?;
    writeln!(
        out,
        r#"    <rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" stroke="{}" stroke-width="{}" />"#,
        r.x0,
        r.y0,
        r.width(),
        r.height(),
        CARD_RADIUS,
        css(node.fill),
        css(border),
        width
    )?;
    if node.editing {
        return writeln!(out, "  </g>");
    }

    let mut y = r.y0 + 26.0;
    for line in node.title.split('\n') {
        writeln!(
            out,
            r#"    <text x="{}" y="{}" font-size="13" fill="{}">{}</text>"#,
            r.x0 + 10.0,
            y,
            css(INK),
            escape(line)
        )?;
        y += 18.0;
    }
    let time = node.time.trim();
    let mut meta = Vec::new();
    if !time.is_empty() {
        meta.push(time.to_string());
    }
    meta.extend(node.tags.iter().map(|t| format!("#{}", t)));
    if !meta.is_empty() {
        writeln!(
            out,
            r#"    <text x="{}" y="{}" font-size="9" fill="{}">{}</text>"#,
            r.x0 + 10.0,
            y,
            css(EDGE_COLOR),
            escape(&meta.join("  "))
        )?;
        y += 16.0;
    }
    if !node.memo.is_empty() {
        writeln!(
            out,
            r#"    <text x="{}" y="{}" font-size="9" fill="{}">{}</text>"#,
            r.x0 + 10.0,
            y,
            css(INK),
            escape(&node.memo)
        )?;
    }
    writeln!(out, "  </g>")
}

fn write_text(out: &mut String, text: &TextVisual, selected: Color) -> fmt::Result {
    let r = text.rect;
    if text.selected {
        write_rect(
            out,
            r,
            &format!(r#"fill="none" stroke="{}" stroke-dasharray="3 2""#, css(selected)),
        )?;
    }
    if text.editing {
        return Ok(());
    }
    let lines: Vec<&str> = text.text.split('\n').collect();
    let line_height = 16.0;
    let first = r.center().y - (lines.len() as f64 - 1.0) * line_height / 2.0;
    let weight = if text.bold { 700 } else { 400 };
    writeln!(
        out,
        r#"  <text x="{}" y="{}" font-size="13" font-weight="{}" text-anchor="middle" dominant-baseline="middle" fill="{}">"#,
        r.center().x,
        first,
        weight,
        css(INK)
    )?;
    for (i, line) in lines.iter().enumerate() {
        let dy = if i == 0 { 0.0 } else { line_height };
        writeln!(out, r#"    <tspan x="{}" dy="{}">{}</tspan>"#, r.center().x, dy, escape(line))?;
    }
    writeln!(out, "  </text>")
}
