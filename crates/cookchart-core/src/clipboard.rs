//! In-session copy and paste of nodes and text items.

use crate::config::BoardConfig;
use crate::document::Document;
use crate::model::{Edge, Node, NodeId, TextItem};
use crate::selection::Selection;
use kurbo::Vec2;
use std::collections::BTreeMap;

/// Copied entities plus the number of times they have been pasted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    nodes: Vec<Node>,
    /// Edges whose both ends were copied, still in source ids.
    edges: Vec<Edge>,
    texts: Vec<TextItem>,
    paste_count: u32,
}

impl Clipboard {
    /// Capture the selected nodes, the edges between them, and the selected
    /// texts. Returns `None` when there is nothing to copy.
    pub fn copy(doc: &Document, selection: &Selection) -> Option<Self> {
        let nodes: Vec<Node> = doc
            .nodes
            .iter()
            .filter(|n| selection.nodes.contains(&n.id))
            .cloned()
            .collect();
        let texts: Vec<TextItem> = doc
            .texts
            .iter()
            .filter(|t| selection.texts.contains(&t.id))
            .cloned()
            .collect();
        if nodes.is_empty() && texts.is_empty() {
            return None;
        }
        let edges = doc
            .edges
            .iter()
            .filter(|e| selection.nodes.contains(&e.from) && selection.nodes.contains(&e.to))
            .copied()
            .collect();
        Some(Self {
            nodes,
            edges,
            texts,
            paste_count: 0,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.texts.is_empty()
    }

    pub fn paste_count(&self) -> u32 {
        self.paste_count
    }

    /// Insert fresh copies offset by `steps × grid × paste count`, remapping
    /// copied edges to the new ids. Returns the selection of pasted entities.
    pub fn paste(&mut self, doc: &mut Document, config: &BoardConfig) -> Selection {
        self.paste_count += 1;
        let offset = config.grid_size * config.paste_offset_steps * f64::from(self.paste_count);
        let offset = Vec2::new(offset, offset);

        let mut id_map: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut pasted = Selection::new();
        for node in &self.nodes {
            let mut copy = node.clone();
            let p = node.position() + offset;
            copy.x = p.x;
            copy.y = p.y;
            let id = doc.add_node_from(&copy, config);
            id_map.insert(node.id, id);
            pasted.nodes.insert(id);
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) = (id_map.get(&edge.from), id_map.get(&edge.to)) {
                doc.upsert_edge(Edge { from, to, ..*edge });
            }
        }
        for text in &self.texts {
            let mut copy = text.clone();
            let p = text.position() + offset;
            copy.x = p.x;
            copy.y = p.y;
            pasted.texts.insert(doc.add_text_from(&copy, config));
        }
        pasted
    }
}
