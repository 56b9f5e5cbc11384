//! Content measurement and height synchronization.
//!
//! Node and text heights are stored in the document because edge anchors
//! depend on them. Hosts that can measure real layout implement [`Measure`];
//! [`EstimatedMeasure`] approximates it from character counts.

use cookchart_core::config::BoardConfig;
use cookchart_core::document::Document;
use cookchart_core::editor::Editor;
use cookchart_core::model::{Node, TextItem};

/// Natural content heights, before clamping.
pub trait Measure {
    /// Height of a node card laid out at `width`.
    fn node_height(&self, node: &Node, width: f64) -> f64;

    /// Height of a text item laid out at its own width.
    fn text_height(&self, text: &TextItem) -> f64;
}

/// Character-count based layout estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedMeasure {
    /// Advance of an ASCII character.
    pub narrow_char: f64,
    /// Advance of any other character (kana, kanji, symbols).
    pub wide_char: f64,
    pub title_line_height: f64,
    pub body_line_height: f64,
    pub memo_line_height: f64,
    /// Height of the time badge / tag row.
    pub meta_row_height: f64,
    /// Inner padding on each side of a card.
    pub padding: f64,
}

impl Default for EstimatedMeasure {
    fn default() -> Self {
        Self {
            narrow_char: 7.5,
            wide_char: 13.0,
            title_line_height: 18.0,
            body_line_height: 16.0,
            memo_line_height: 13.0,
            meta_row_height: 20.0,
            padding: 10.0,
        }
    }
}

impl EstimatedMeasure {
    fn advance(&self, c: char) -> f64 {
        if c.is_ascii() { self.narrow_char } else { self.wide_char }
    }

    /// Lines `text` wraps to at `max_width`, breaking between characters.
    /// Every hard line counts, even an empty one.
    pub fn wrapped_lines(&self, text: &str, max_width: f64) -> usize {
        text.split('\n')
            .map(|line| {
                let mut lines = 1;
                let mut width = 0.0;
                for c in line.chars() {
                    let advance = self.advance(c);
                    if width > 0.0 && width + advance > max_width {
                        lines += 1;
                        width = 0.0;
                    }
                    width += advance;
                }
                lines
            })
            .sum()
    }
}

impl Measure for EstimatedMeasure {
    fn node_height(&self, node: &Node, width: f64) -> f64 {
        let inner = width - 2.0 * self.padding;
        let mut height = 2.0 * self.padding;
        height += self.wrapped_lines(&node.title, inner) as f64 * self.title_line_height;
        if !node.tags.is_empty() || !node.time.trim().is_empty() {
            height += self.meta_row_height;
        }
        let memo = node.memo();
        if !memo.is_empty() {
            height += self.wrapped_lines(memo, inner) as f64 * self.memo_line_height + self.padding / 2.0;
        }
        height
    }

    fn text_height(&self, text: &TextItem) -> f64 {
        let lines = self.wrapped_lines(&text.text, text.w) as f64;
        (lines * self.body_line_height + 2.0).max(self.body_line_height + 4.0)
    }
}

/// Store measured heights, clamping nodes to the configured minimum and
/// re-clamping anything that grew past the board edge. Returns whether any
/// height changed, in which case edges need a re-layout.
pub fn sync_heights(doc: &mut Document, measure: &impl Measure, config: &BoardConfig) -> bool {
    let mut changed = false;
    for node in &mut doc.nodes {
        let measured = measure.node_height(node, config.node_width).ceil().max(config.node_min_height);
        if node.h != measured {
            node.h = measured;
            node.clamp(config);
            changed = true;
        }
    }
    for text in &mut doc.texts {
        let measured = measure.text_height(text).ceil();
        if text.h != measured {
            text.h = measured;
            text.clamp(config);
            changed = true;
        }
    }
    if changed {
        log::debug!("synced heights of {} nodes, {} texts", doc.nodes.len(), doc.texts.len());
    }
    changed
}

/// [`sync_heights`] on the editor's live document.
pub fn sync_editor_heights(editor: &mut Editor, measure: &impl Measure) -> bool {
    let config = *editor.config();
    sync_heights(editor.document_mut(), measure, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_wrapped_lines() {
        let m = EstimatedMeasure::default();
        assert_eq!(m.wrapped_lines("", 200.0), 1);
        assert_eq!(m.wrapped_lines("a\n\nb", 200.0), 3);
        // 20 wide chars at 13 each need 260 units.
        assert_eq!(m.wrapped_lines(&"煮".repeat(20), 200.0), 2);
        assert_eq!(m.wrapped_lines(&"x".repeat(26), 200.0), 1);
    }

    #[test]
    fn test_node_minimum_height() {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let id = doc.add_node(Point::new(100.0, 100.0), &config);
        assert_eq!(doc.node(id).unwrap().h, config.node_height);

        assert!(sync_heights(&mut doc, &EstimatedMeasure::default(), &config));
        assert_eq!(doc.node(id).unwrap().h, config.node_min_height);
        assert!(!sync_heights(&mut doc, &EstimatedMeasure::default(), &config));
    }

    #[test]
    fn test_node_grows_with_content() {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let id = doc.add_node(Point::new(100.0, 100.0), &config);
        {
            let node = doc.node_mut(id).unwrap();
            node.title = "玉ねぎをみじん切りにして、あめ色になるまでじっくり炒める".to_string();
            node.time = "15 min".to_string();
            node.set_memo("弱火で");
        }
        sync_heights(&mut doc, &EstimatedMeasure::default(), &config);
        // 2 title lines, time row, 1 memo line, padding.
        assert_eq!(doc.node(id).unwrap().h, 20.0 + 36.0 + 20.0 + 13.0 + 5.0);
    }

    #[test]
    fn test_growth_reclamps_to_board() {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let id = doc.add_node(Point::new(100.0, config.board_height), &config);
        doc.node_mut(id).unwrap().title = "line\n".repeat(10);
        sync_heights(&mut doc, &EstimatedMeasure::default(), &config);
        let node = doc.node(id).unwrap();
        assert_eq!(node.y + node.h, config.board_height);
    }

    #[test]
    fn test_text_height() {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let id = doc.add_text(Point::new(100.0, 100.0), &config);
        doc.text_mut(id).unwrap().text = "one\ntwo".to_string();
        sync_heights(&mut doc, &EstimatedMeasure::default(), &config);
        assert_eq!(doc.text(id).unwrap().h, 34.0);
    }

    #[test]
    fn test_sync_editor_heights() {
        let mut editor = Editor::default();
        editor.add_node();
        assert!(sync_editor_heights(&mut editor, &EstimatedMeasure::default()));
        assert_eq!(editor.document().nodes[0].h, 56.0);
    }
}
