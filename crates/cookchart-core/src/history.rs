//! Bounded undo history of full editor snapshots.

use crate::document::Document;
use crate::selection::Selection;
use uuid::Uuid;

/// A deep copy of the document and selection at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Opaque version token identifying this snapshot.
    pub token: Uuid,
    pub document: Document,
    pub selection: Selection,
}

impl Snapshot {
    /// Capture the current state under a fresh token.
    pub fn capture(document: &Document, selection: &Selection) -> Self {
        Self {
            token: Uuid::new_v4(),
            document: document.clone(),
            selection: selection.clone(),
        }
    }
}

/// Undo-only stack. The oldest entry is evicted once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Snapshot>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Push a pre-mutation snapshot and return its token.
    pub fn push(&mut self, snapshot: Snapshot) -> Uuid {
        let token = snapshot.token;
        self.stack.push(snapshot);
        if self.stack.len() > self.capacity {
            self.stack.remove(0);
        }
        token
    }

    /// Capture and push in one step.
    pub fn record(&mut self, document: &Document, selection: &Selection) -> Uuid {
        self.push(Snapshot::capture(document, selection))
    }

    /// Pop the most recent snapshot.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.stack.pop()
    }

    /// Drop the most recent snapshot if it carries `token`.
    ///
    /// Used to roll back a snapshot recorded for a mutation that was then
    /// abandoned. Returns whether anything was removed.
    pub fn discard(&mut self, token: Uuid) -> bool {
        if self.stack.last().is_some_and(|s| s.token == token) {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use kurbo::Point;

    #[test]
    fn test_push_pop_restores_state() {
        let config = BoardConfig::default();
        let mut doc = Document::new();
        let mut sel = Selection::new();
        let mut history = History::new(10);

        history.record(&doc, &sel);
        let id = doc.add_node(Point::new(40.0, 40.0), &config);
        sel.click_node(id, false);

        let snap = history.pop().unwrap();
        assert_eq!(snap.document, Document::new());
        assert!(snap.selection.is_empty());
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let doc = Document::new();
        let sel = Selection::new();
        let mut history = History::new(3);
        let first = history.record(&doc, &sel);
        for _ in 0..3 {
            history.record(&doc, &sel);
        }
        assert_eq!(history.len(), 3);
        while let Some(snap) = history.pop() {
            assert_ne!(snap.token, first);
        }
    }

    #[test]
    fn test_discard_only_matches_latest() {
        let doc = Document::new();
        let sel = Selection::new();
        let mut history = History::new(5);
        let a = history.record(&doc, &sel);
        let b = history.record(&doc, &sel);
        assert_ne!(a, b);
        assert!(!history.discard(a));
        assert!(history.discard(b));
        assert_eq!(history.len(), 1);
        assert_eq!(history.pop().map(|s| s.token), Some(a));
    }
}
