//! Tolerant document loading.
//!
//! Accepts the current document shape as well as the older `cards` shape
//! (grid `col`/`row` coordinates, no tags, memos, step lines or texts) and
//! normalizes either into a [`Document`]. Missing or malformed fields fall
//! back to defaults rather than failing the load.

use crate::config::BoardConfig;
use crate::document::Document;
use crate::geometry::snap;
use crate::model::{
    Edge, EdgeArrow, EdgeKey, Node, NodeColor, Side, StepLine, TextItem, normalize_memos,
    normalize_tags,
};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Horizontal pitch of a legacy card column.
const LEGACY_COLUMN_PITCH: f64 = 240.0;
/// Vertical pitch of a legacy card row.
const LEGACY_ROW_PITCH: f64 = 110.0;
/// Offset applied to legacy grid coordinates and missing positions.
const DEFAULT_OFFSET: f64 = 24.0;

/// Errors loading a document from text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,
}

/// Parse `text` and normalize it into a document.
pub fn load_str(text: &str, config: &BoardConfig) -> Result<Document, LoadError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(LoadError::NotAnObject);
    }
    Ok(normalize(&value, config))
}

/// Normalize an already-parsed JSON object.
pub fn normalize(data: &Value, config: &BoardConfig) -> Document {
    match data.get("nodes").and_then(Value::as_array) {
        Some(nodes) => normalize_current(data, nodes, config),
        None => normalize_cards(data, config),
    }
}

/// Numbers, or strings that parse as numbers.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn id_or(value: Option<&Value>, fallback: usize) -> u64 {
    number(value)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as u64)
        .unwrap_or(fallback as u64 + 1)
}

fn counter(value: Option<&Value>) -> Option<u64> {
    value.and_then(Value::as_u64)
}

fn string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|v| string(Some(v))).collect())
        .unwrap_or_default()
}

fn edges(data: &Value, node_ids: &BTreeSet<u64>) -> Vec<Edge> {
    let mut seen = BTreeSet::new();
    data.get("edges")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|e| {
            let from = number(e.get("from"))? as u64;
            let to = number(e.get("to"))? as u64;
            let from_side = match e.get("fromSide").and_then(Value::as_str) {
                Some("top") => Side::Top,
                _ => Side::Bottom,
            };
            let to_side = match e.get("toSide").and_then(Value::as_str) {
                Some("bottom") => Side::Bottom,
                _ => Side::Top,
            };
            Some(Edge { from, to, from_side, to_side })
        })
        .filter(|e| node_ids.contains(&e.from) && node_ids.contains(&e.to))
        .filter(|e| seen.insert(e.key()))
        .collect()
}

/// Keep a loaded counter only if it stays ahead of every existing id.
fn next_counter(value: Option<&Value>, max_id: u64) -> u64 {
    counter(value).filter(|n| *n > max_id).unwrap_or(max_id + 1)
}

fn normalize_current(data: &Value, raw_nodes: &[Value], config: &BoardConfig) -> Document {
    let nodes: Vec<Node> = raw_nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let mut node = Node {
                id: id_or(n.get("id"), i),
                x: number(n.get("x")).unwrap_or(DEFAULT_OFFSET),
                y: number(n.get("y")).unwrap_or(DEFAULT_OFFSET),
                h: number(n.get("h")).unwrap_or(config.node_height),
                title: string(n.get("title")),
                color: NodeColor::from_name(n.get("color").and_then(Value::as_str).unwrap_or("")),
                time: string(n.get("time")).trim().to_string(),
                tags: normalize_tags(strings(n.get("tags"))),
                memos: normalize_memos(strings(n.get("memos"))),
            };
            node.clamp(config);
            node
        })
        .collect();
    let node_ids: BTreeSet<u64> = nodes.iter().map(|n| n.id).collect();

    let step_lines: Vec<StepLine> = data
        .get("stepLines")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, l)| StepLine {
            id: id_or(l.get("id"), i),
            y: snap(number(l.get("y")).unwrap_or(0.0), config.grid_size),
            label: string(l.get("label")).trim().to_string(),
        })
        .filter(|l| l.y >= 0.0 && l.y <= config.board_height)
        .collect();

    let texts: Vec<TextItem> = data
        .get("texts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, t)| {
            let mut text = TextItem {
                id: id_or(t.get("id"), i),
                x: number(t.get("x")).unwrap_or(DEFAULT_OFFSET),
                y: number(t.get("y")).unwrap_or(DEFAULT_OFFSET),
                w: number(t.get("w")).unwrap_or(config.text_width),
                h: number(t.get("h")).unwrap_or(config.text_height),
                text: string(t.get("text")),
                bold: t.get("bold").and_then(Value::as_bool).unwrap_or(false),
            };
            text.clamp(config);
            text
        })
        .collect();

    let edges = edges(data, &node_ids);
    let edge_keys: BTreeSet<EdgeKey> = edges.iter().map(Edge::key).collect();
    let mut seen_arrows = BTreeSet::new();
    let edge_arrows: Vec<EdgeArrow> = data
        .get("edgeArrows")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|a| {
            let from = number(a.get("from"))? as u64;
            let to_edge_key: EdgeKey = a.get("toEdgeKey")?.as_str()?.parse().ok()?;
            Some(EdgeArrow { from, to_edge_key })
        })
        .filter(|a| node_ids.contains(&a.from) && edge_keys.contains(&a.to_edge_key))
        .filter(|a| seen_arrows.insert((a.from, a.to_edge_key)))
        .collect();

    let max_node = nodes.iter().map(|n| n.id).max().unwrap_or(0);
    let max_line = step_lines.iter().map(|l| l.id).max().unwrap_or(0);
    let max_text = texts.iter().map(|t| t.id).max().unwrap_or(0);

    Document {
        next_id: next_counter(data.get("nextId"), max_node),
        next_step_line_id: next_counter(data.get("nextStepLineId"), max_line),
        next_text_id: next_counter(data.get("nextTextId"), max_text),
        nodes,
        edges,
        edge_arrows,
        step_lines,
        texts,
    }
}

fn normalize_cards(data: &Value, config: &BoardConfig) -> Document {
    let nodes: Vec<Node> = data
        .get("cards")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, c)| {
            let col = number(c.get("col")).unwrap_or(0.0);
            let row = number(c.get("row")).unwrap_or(0.0);
            let mut node = Node {
                id: c.get("id").and_then(Value::as_u64).unwrap_or(i as u64 + 1),
                x: number(c.get("x")).unwrap_or(col * LEGACY_COLUMN_PITCH + DEFAULT_OFFSET),
                y: number(c.get("y")).unwrap_or(row * LEGACY_ROW_PITCH + DEFAULT_OFFSET),
                h: config.node_height,
                title: string(c.get("title")),
                color: NodeColor::Gray,
                time: String::new(),
                tags: Vec::new(),
                memos: Vec::new(),
            };
            node.clamp(config);
            node
        })
        .collect();
    let node_ids: BTreeSet<u64> = nodes.iter().map(|n| n.id).collect();
    let max_node = node_ids.iter().next_back().copied().unwrap_or(0);

    Document {
        next_id: next_counter(data.get("nextId"), max_node),
        next_step_line_id: 1,
        next_text_id: 1,
        edges: edges(data, &node_ids),
        nodes,
        edge_arrows: Vec::new(),
        step_lines: Vec::new(),
        texts: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use serde_json::json;

    fn config() -> BoardConfig {
        BoardConfig::default()
    }

    #[test]
    fn test_round_trip_current_shape() {
        let config = config();
        let mut doc = Document::new();
        let a = doc.add_node(Point::new(100.0, 100.0), &config);
        let b = doc.add_node(Point::new(100.0, 300.0), &config);
        let c = doc.add_node(Point::new(400.0, 300.0), &config);
        {
            let node = doc.node_mut(a).unwrap();
            node.title = "Onion".to_string();
            node.color = NodeColor::Orange;
            node.time = "5 min".to_string();
            node.tags = vec!["dice".to_string()];
            node.set_memo("fine");
            node.h = 132.0;
        }
        doc.upsert_edge(Edge::new(a, b, Side::Bottom));
        doc.add_edge_arrow(c, EdgeKey::new(a, b));
        doc.add_step_line(500.0, &config);
        let t = doc.add_text(Point::new(600.0, 40.0), &config);
        doc.text_mut(t).unwrap().bold = true;
        doc.remove_node(c);
        doc.add_node(Point::new(800.0, 800.0), &config);

        let json = doc.to_json().unwrap();
        let loaded = load_str(&json, &config).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_round_trip_keeps_text_pinned_to_board_edge() {
        let config = config();
        let mut doc = Document::new();
        let t = doc.add_text(Point::new(600.0, 3960.0), &config);

        // Height sync grows the text and pins it back inside the board.
        let text = doc.text_mut(t).unwrap();
        text.h = 34.0;
        text.clamp(&config);
        assert_eq!(text.y, 3966.0);

        let loaded = load_str(&doc.to_json().unwrap(), &config).unwrap();
        assert_eq!(loaded.text(t).unwrap().y, 3966.0);
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_legacy_cards_shape() {
        let config = config();
        let data = json!({
            "cards": [
                {"id": 1, "title": "Rice", "col": 0, "row": 0},
                {"id": 2, "title": "Water", "col": 2, "row": 1},
                {"title": "Salt", "x": 500, "y": 900}
            ],
            "edges": [{"from": 1, "to": 2}, {"from": 2, "to": 9}]
        });
        let doc = normalize(&data, &config);
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.nodes[0].position(), Point::new(24.0, 24.0));
        assert_eq!(doc.nodes[1].position(), Point::new(504.0, 134.0));
        assert_eq!(doc.nodes[2].id, 3);
        assert_eq!(doc.nodes[2].position(), Point::new(500.0, 900.0));
        assert_eq!(doc.edges, vec![Edge::new(1, 2, Side::Bottom)]);
        assert_eq!(doc.next_id, 4);
        assert_eq!(doc.next_step_line_id, 1);
        assert!(doc.step_lines.is_empty() && doc.texts.is_empty());
    }

    #[test]
    fn test_defaults_and_filtering() {
        let config = config();
        let data = json!({
            "nodes": [
                {"id": "7", "tags": [" a ", "", "b", "c", "d"], "memos": ["", "m1", "m2"], "color": "blue"},
                {"id": 3, "x": -50, "y": 99999, "h": 80}
            ],
            "edges": [{"from": 7, "to": 3, "fromSide": "left", "toSide": "bottom"}],
            "edgeArrows": [{"from": 3, "toEdgeKey": "7:3"}, {"from": 3, "toEdgeKey": "1:2"}],
            "stepLines": [{"y": 507}, {"id": 4, "y": 9000}, {"id": 5, "y": 1200, "label": " Boil "}],
            "texts": [{"x": 33, "y": 47, "text": "hi"}],
            "nextId": 2
        });
        let doc = normalize(&data, &config);

        let first = &doc.nodes[0];
        assert_eq!(first.id, 7);
        assert_eq!(first.position(), Point::new(24.0, 24.0));
        assert_eq!(first.h, config.node_height);
        assert_eq!(first.tags, vec!["a", "b", "c"]);
        assert_eq!(first.memos, vec!["m1"]);
        assert_eq!(first.color, NodeColor::Gray);

        let second = &doc.nodes[1];
        assert_eq!(second.position(), Point::new(0.0, config.board_height - 80.0));

        assert_eq!(doc.edges[0].from_side, Side::Bottom);
        assert_eq!(doc.edges[0].to_side, Side::Bottom);
        assert_eq!(doc.edge_arrows.len(), 1);

        assert_eq!(doc.step_lines.len(), 2);
        assert_eq!(doc.step_lines[0].id, 1);
        assert_eq!(doc.step_lines[0].y, 500.0);
        assert_eq!(doc.step_lines[1].label, "Boil");

        assert_eq!(doc.texts[0].position(), Point::new(33.0, 47.0));
        assert_eq!(doc.texts[0].w, config.text_width);

        // A stale counter is bumped past the largest id.
        assert_eq!(doc.next_id, 8);
        assert_eq!(doc.next_step_line_id, 6);
        assert_eq!(doc.next_text_id, 2);
    }

    #[test]
    fn test_load_str_errors() {
        let config = config();
        assert!(matches!(load_str("{nope", &config), Err(LoadError::InvalidJson(_))));
        assert!(matches!(load_str("[1, 2]", &config), Err(LoadError::NotAnObject)));
        assert!(load_str("{}", &config).unwrap().is_empty());
    }
}
