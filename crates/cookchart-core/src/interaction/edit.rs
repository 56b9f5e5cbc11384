//! Inline editing of a single text field.
//!
//! Every keystroke is applied to the document right away, but history only
//! sees one entry per edit session: the focus-time snapshot, pushed on commit
//! when the value actually changed.

use crate::config::MAX_TAGS;
use crate::document::Document;
use crate::history::Snapshot;
use crate::model::{NodeId, StepLineId, TextId, normalize_tags};

/// The field being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    Title(NodeId),
    Memo(NodeId),
    /// An existing tag by index, or a new tag when `index` is `None`.
    Tag { node: NodeId, index: Option<usize> },
    Time(NodeId),
    TextBody(TextId),
    StepLabel(StepLineId),
}

impl FieldTarget {
    /// Node owning the field, if any.
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            FieldTarget::Title(id) | FieldTarget::Memo(id) | FieldTarget::Time(id) => Some(id),
            FieldTarget::Tag { node, .. } => Some(node),
            FieldTarget::TextBody(_) | FieldTarget::StepLabel(_) => None,
        }
    }

    /// Current editable value, or `None` if the target no longer exists.
    pub fn read(&self, doc: &Document) -> Option<String> {
        let value = match *self {
            FieldTarget::Title(id) => doc.node(id)?.title.clone(),
            FieldTarget::Memo(id) => doc.node(id)?.memo().to_string(),
            FieldTarget::Time(id) => doc.node(id)?.time.clone(),
            FieldTarget::Tag { node, index } => {
                let tags = &doc.node(node)?.tags;
                index.and_then(|i| tags.get(i)).cloned().unwrap_or_default()
            }
            FieldTarget::TextBody(id) => doc.text(id)?.text.clone(),
            FieldTarget::StepLabel(id) => doc.step_line(id)?.label.clone(),
        };
        Some(value)
    }

    /// Comparable value used to decide whether a session changed anything.
    fn fingerprint(&self, doc: &Document) -> Option<String> {
        match *self {
            FieldTarget::Tag { node, .. } => Some(doc.node(node)?.tags.join("\n")),
            _ => self.read(doc),
        }
    }

    /// Write `value`. `commit` applies the final normalization (trimming,
    /// dropping blank tags, appending a new tag).
    fn write(&self, doc: &mut Document, value: &str, commit: bool) {
        match *self {
            FieldTarget::Title(id) => {
                if let Some(node) = doc.node_mut(id) {
                    node.title = value.to_string();
                }
            }
            FieldTarget::Memo(id) => {
                if let Some(node) = doc.node_mut(id) {
                    node.set_memo(value);
                }
            }
            FieldTarget::Time(id) => {
                if let Some(node) = doc.node_mut(id) {
                    node.time = if commit { value.trim().to_string() } else { value.to_string() };
                }
            }
            FieldTarget::Tag { node, index } => {
                let Some(node) = doc.node_mut(node) else { return };
                match index {
                    Some(i) if i < node.tags.len() => {
                        if commit {
                            let mut tags = node.tags.clone();
                            tags[i] = value.to_string();
                            node.tags = normalize_tags(tags);
                        } else {
                            node.tags[i] = value.to_string();
                        }
                    }
                    Some(_) => {}
                    None => {
                        if commit && node.tags.len() < MAX_TAGS && !value.trim().is_empty() {
                            let mut tags = node.tags.clone();
                            tags.push(value.to_string());
                            node.tags = normalize_tags(tags);
                        }
                    }
                }
            }
            FieldTarget::TextBody(id) => {
                if let Some(text) = doc.text_mut(id) {
                    text.text = value.to_string();
                }
            }
            FieldTarget::StepLabel(id) => {
                if let Some(line) = doc.step_line_mut(id) {
                    line.label = if commit { value.trim().to_string() } else { value.to_string() };
                }
            }
        }
    }
}

/// An in-progress field edit.
#[derive(Debug, Clone)]
pub struct FieldEdit {
    pub target: FieldTarget,
    before: Snapshot,
    initial_value: String,
    fingerprint: Option<String>,
    buffer: String,
}

impl FieldEdit {
    /// Focus a field. `before` is the state at focus time.
    pub fn begin(doc: &Document, target: FieldTarget, before: Snapshot) -> Option<Self> {
        let initial_value = target.read(doc)?;
        Some(Self {
            target,
            fingerprint: target.fingerprint(doc),
            buffer: initial_value.clone(),
            initial_value,
            before,
        })
    }

    /// Text currently in the field.
    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Apply a keystroke's worth of change.
    pub fn input(&mut self, doc: &mut Document, value: &str) {
        self.buffer = value.to_string();
        self.target.write(doc, value, false);
    }

    /// Blur or Enter. Returns the focus-time snapshot when the field changed,
    /// for the caller to push onto history.
    pub fn commit(self, doc: &mut Document) -> Option<Snapshot> {
        self.target.write(doc, &self.buffer, true);
        let changed = self.target.fingerprint(doc) != self.fingerprint;
        changed.then_some(self.before)
    }

    /// Escape. Restores the focus-time value without touching history.
    pub fn cancel(self, doc: &mut Document) {
        match self.target {
            FieldTarget::Tag { node, .. } => {
                if let (Some(node), Some(before)) = (doc.node_mut(node), self.before.document.node(node)) {
                    node.tags = before.tags.clone();
                }
            }
            _ => self.target.write(doc, &self.initial_value, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::selection::Selection;
    use kurbo::Point;

    fn setup() -> (Document, NodeId) {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let id = doc.add_node(Point::new(100.0, 100.0), &config);
        (doc, id)
    }

    fn begin(doc: &Document, target: FieldTarget) -> FieldEdit {
        FieldEdit::begin(doc, target, Snapshot::capture(doc, &Selection::new())).unwrap()
    }

    #[test]
    fn test_live_edit_then_commit() {
        let (mut doc, id) = setup();
        let mut edit = begin(&doc, FieldTarget::Title(id));
        edit.input(&mut doc, "B");
        assert_eq!(doc.node(id).unwrap().title, "B");
        edit.input(&mut doc, "Boil");
        let before = edit.commit(&mut doc).unwrap();
        assert_eq!(before.document.node(id).unwrap().title, "");
        assert_eq!(doc.node(id).unwrap().title, "Boil");
    }

    #[test]
    fn test_unchanged_commit_returns_nothing() {
        let (mut doc, id) = setup();
        let mut edit = begin(&doc, FieldTarget::Title(id));
        edit.input(&mut doc, "x");
        edit.input(&mut doc, "");
        assert!(edit.commit(&mut doc).is_none());
    }

    #[test]
    fn test_cancel_restores() {
        let (mut doc, id) = setup();
        doc.node_mut(id).unwrap().set_memo("keep");
        let mut edit = begin(&doc, FieldTarget::Memo(id));
        edit.input(&mut doc, "changed");
        assert_eq!(doc.node(id).unwrap().memo(), "changed");
        edit.cancel(&mut doc);
        assert_eq!(doc.node(id).unwrap().memo(), "keep");
    }

    #[test]
    fn test_tags_add_edit_remove() {
        let (mut doc, id) = setup();
        let mut edit = begin(&doc, FieldTarget::Tag { node: id, index: None });
        edit.input(&mut doc, " sear ");
        assert!(doc.node(id).unwrap().tags.is_empty());
        assert!(edit.commit(&mut doc).is_some());
        assert_eq!(doc.node(id).unwrap().tags, vec!["sear"]);

        let mut edit = begin(&doc, FieldTarget::Tag { node: id, index: Some(0) });
        edit.input(&mut doc, "grill");
        assert!(edit.commit(&mut doc).is_some());
        assert_eq!(doc.node(id).unwrap().tags, vec!["grill"]);

        let mut edit = begin(&doc, FieldTarget::Tag { node: id, index: Some(0) });
        edit.input(&mut doc, "  ");
        assert!(edit.commit(&mut doc).is_some());
        assert!(doc.node(id).unwrap().tags.is_empty());
    }

    #[test]
    fn test_tag_limit() {
        let (mut doc, id) = setup();
        doc.node_mut(id).unwrap().tags = vec!["a".into(), "b".into(), "c".into()];
        let mut edit = begin(&doc, FieldTarget::Tag { node: id, index: None });
        edit.input(&mut doc, "d");
        assert!(edit.commit(&mut doc).is_none());
        assert_eq!(doc.node(id).unwrap().tags.len(), 3);
    }

    #[test]
    fn test_time_and_label_trim_on_commit() {
        let config = BoardConfig::default();
        let (mut doc, id) = setup();
        let line = doc.add_step_line(400.0, &config);

        let mut edit = begin(&doc, FieldTarget::Time(id));
        edit.input(&mut doc, " 10 min ");
        assert_eq!(doc.node(id).unwrap().time, " 10 min ");
        edit.commit(&mut doc);
        assert_eq!(doc.node(id).unwrap().time, "10 min");

        let mut edit = begin(&doc, FieldTarget::StepLabel(line));
        edit.input(&mut doc, " Prep ");
        edit.commit(&mut doc);
        assert_eq!(doc.step_line(line).unwrap().label, "Prep");
    }

    #[test]
    fn test_missing_target() {
        let (doc, _) = setup();
        let before = Snapshot::capture(&doc, &Selection::new());
        assert!(FieldEdit::begin(&doc, FieldTarget::TextBody(42), before).is_none());
    }
}
