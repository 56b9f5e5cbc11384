//! The editor session.
//!
//! [`Editor`] owns everything a single open chart needs: the document, the
//! selection, undo history, the clipboard, the viewport and whichever gesture
//! or inline edit is in progress. Hosts translate their input events into
//! calls on it and redraw according to the returned [`Refresh`].

use crate::clipboard::Clipboard;
use crate::config::BoardConfig;
use crate::document::{Document, Removed};
use crate::geometry::{snap, snap_point};
use crate::history::{History, Snapshot};
use crate::input::{Modifiers, Shortcut};
use crate::interaction::{
    DragGroup, DragState, FieldEdit, FieldTarget, Gesture, LinkAction, LinkState, MarqueeState,
    PointerTarget, auto_child_position,
};
use crate::legacy::{LoadError, load_str};
use crate::model::{Edge, EdgeKey, NodeId, Side, StepLineId, TextId};
use crate::selection::Selection;
use crate::viewport::Viewport;
use kurbo::{CubicBez, Point, Rect, Vec2};
use thiserror::Error;

/// Stagger applied to consecutive root entities so they do not stack exactly.
const SPAWN_STAGGER: Vec2 = Vec2::new(26.0, 22.0);

/// Errors surfaced to the user by editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no free space on the {side:?} side of node {node}")]
    NoFreeSpace { node: NodeId, side: Side },

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("field {0:?} cannot be edited")]
    FieldUnavailable(FieldTarget),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// How much of the view the host should redraw after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    None,
    /// Only the moved entities (and their edges) changed.
    Partial(DragGroup),
    /// Selection or gesture overlays changed; entity geometry did not.
    Overlay,
    Full,
}

/// A single editing session.
#[derive(Debug, Clone)]
pub struct Editor {
    config: BoardConfig,
    document: Document,
    selection: Selection,
    history: History,
    clipboard: Option<Clipboard>,
    gesture: Gesture,
    edit: Option<FieldEdit>,
    viewport: Viewport,
    status: Option<String>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Editor {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            document: Document::new(),
            selection: Selection::new(),
            history: History::new(config.history_limit),
            clipboard: None,
            gesture: Gesture::Idle,
            edit: None,
            viewport: Viewport::default(),
            status: None,
        }
    }

    /// Open an existing document.
    pub fn with_document(config: BoardConfig, document: Document) -> Self {
        let mut editor = Self::new(config);
        editor.document = document;
        editor
    }

    // --- accessors -----------------------------------------------------

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct document access for measurement passes. Bypasses history.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn active_edit(&self) -> Option<&FieldEdit> {
        self.edit.as_ref()
    }

    /// Last non-fatal status message, such as a JSON parse error.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Live link drag, if one is in progress.
    pub fn link_draft(&self) -> Option<&LinkState> {
        match &self.gesture {
            Gesture::Linking(link) => Some(link),
            _ => None,
        }
    }

    /// Preview curve of the live link drag.
    pub fn link_preview(&self) -> Option<CubicBez> {
        self.link_draft()
            .and_then(|link| link.preview_curve(&self.document, &self.config))
    }

    /// Rectangle of the live marquee.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Marqueeing(marquee) => Some(marquee.rect()),
            _ => None,
        }
    }

    // --- history -------------------------------------------------------

    fn record(&mut self) -> uuid::Uuid {
        self.history.record(&self.document, &self.selection)
    }

    /// Restore the most recent snapshot. No-op on empty history.
    pub fn undo(&mut self) -> bool {
        self.gesture = Gesture::Idle;
        self.edit = None;
        match self.history.pop() {
            Some(snapshot) => {
                log::debug!("undo to {}", snapshot.token);
                self.document = snapshot.document;
                self.selection = snapshot.selection;
                true
            }
            None => false,
        }
    }

    /// Replace the document wholesale, clearing selection and history.
    pub fn load_document(&mut self, document: Document) {
        self.document = document;
        self.selection.clear();
        self.history.clear();
        self.gesture = Gesture::Idle;
        self.edit = None;
    }

    /// Parse manually edited JSON and, if valid, load it.
    ///
    /// Invalid input leaves the document untouched and sets the status.
    pub fn apply_json_text(&mut self, text: &str) -> Result<(), EditorError> {
        match load_str(text, &self.config) {
            Ok(document) => {
                self.load_document(document);
                self.status = Some("JSON applied".to_string());
                Ok(())
            }
            Err(err) => {
                log::warn!("rejected JSON edit: {err}");
                self.status = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Current document as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.document.to_json()
    }

    // --- creation ------------------------------------------------------

    fn next_root_position(&self) -> Point {
        let stagger = (self.document.nodes.len() % 3) as f64;
        self.viewport.spawn_position(&self.config) + SPAWN_STAGGER * stagger
    }

    /// Add a node at the viewport spawn point and select it.
    pub fn add_node(&mut self) -> NodeId {
        self.add_node_at(self.next_root_position())
    }

    /// Add a node at a grid-snapped `point` and select it.
    pub fn add_node_at(&mut self, point: Point) -> NodeId {
        self.record();
        let id = self
            .document
            .add_node(snap_point(point, self.config.grid_size), &self.config);
        self.selection.set_nodes_and_lines([id], []);
        id
    }

    /// Add a text item at the viewport spawn point and select it.
    pub fn add_text(&mut self) -> TextId {
        self.add_text_at(self.next_root_position())
    }

    /// Add a text item at a grid-snapped `point` and select it.
    pub fn add_text_at(&mut self, point: Point) -> TextId {
        self.record();
        let id = self
            .document
            .add_text(snap_point(point, self.config.grid_size), &self.config);
        self.selection.set_texts([id]);
        id
    }

    /// Add a step line near `y`, moving off occupied grid rows.
    pub fn add_step_line_at(&mut self, y: f64) -> StepLineId {
        self.record();
        let id = self.document.add_step_line(y, &self.config);
        self.selection.set_nodes_and_lines([], [id]);
        id
    }

    /// Create a child of `from` on `side`, wired with a new edge.
    ///
    /// When no free spot exists the history entry is rolled back and nothing
    /// is created.
    pub fn create_connected_node(&mut self, from: NodeId, side: Side) -> Result<NodeId, EditorError> {
        let parent = self.document.node(from).ok_or(EditorError::NodeNotFound(from))?;
        let position = auto_child_position(&self.document, parent, side, &self.config);
        let token = self.record();
        let Some(position) = position else {
            self.history.discard(token);
            log::warn!("no room for a child {side:?} of node {from}");
            return Err(EditorError::NoFreeSpace { node: from, side });
        };
        let id = self.document.add_node(position, &self.config);
        self.document.upsert_edge(Edge::new(from, id, side));
        self.selection.set_nodes_and_lines([id], []);
        Ok(id)
    }

    // --- whole-selection operations -----------------------------------

    /// Delete everything selected, cascading to edges and edge arrows.
    pub fn delete_selection(&mut self) -> Removed {
        if self.selection.is_empty() {
            return Removed::default();
        }
        self.record();
        let removed = self.document.remove_many(
            &self.selection.nodes,
            &self.selection.step_lines,
            &self.selection.texts,
            &self.selection.edges,
        );
        self.selection.clear();
        removed
    }

    /// Delete one node (its own delete button).
    pub fn delete_node(&mut self, id: NodeId) -> Result<Removed, EditorError> {
        if self.document.node(id).is_none() {
            return Err(EditorError::NodeNotFound(id));
        }
        self.record();
        let removed = self.document.remove_node(id);
        self.selection.prune(&self.document);
        Ok(removed)
    }

    /// Advance a node's color gray → green → orange → gray.
    pub fn cycle_color(&mut self, id: NodeId) -> Result<(), EditorError> {
        if self.document.node(id).is_none() {
            return Err(EditorError::NodeNotFound(id));
        }
        self.record();
        if let Some(node) = self.document.node_mut(id) {
            node.color = node.color.next();
        }
        Ok(())
    }

    /// Toggle bold on every selected text item.
    pub fn toggle_bold(&mut self) -> bool {
        if self.selection.texts.is_empty() {
            return false;
        }
        self.record();
        for text in self.document.texts.iter_mut() {
            if self.selection.texts.contains(&text.id) {
                text.bold = !text.bold;
            }
        }
        true
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.document);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Copy the selected nodes and texts. Resets the paste offset.
    pub fn copy(&mut self) -> bool {
        match Clipboard::copy(&self.document, &self.selection) {
            Some(clipboard) => {
                self.clipboard = Some(clipboard);
                true
            }
            None => false,
        }
    }

    /// Paste the clipboard as one history entry and select the copies.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.as_ref().is_none_or(Clipboard::is_empty) {
            return false;
        }
        self.record();
        if let Some(clipboard) = self.clipboard.as_mut() {
            self.selection = clipboard.paste(&mut self.document, &self.config);
        }
        true
    }

    /// Run a keyboard command. `typing` is true while a text field has focus.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers, typing: bool) -> Refresh {
        match Shortcut::from_key(key, modifiers, typing) {
            Some(shortcut) => self.run_shortcut(shortcut),
            None => Refresh::None,
        }
    }

    pub fn run_shortcut(&mut self, shortcut: Shortcut) -> Refresh {
        let changed = match shortcut {
            Shortcut::SelectAll => {
                self.commit_edit();
                self.select_all();
                true
            }
            Shortcut::Copy => {
                self.copy();
                false
            }
            Shortcut::Paste => self.paste(),
            Shortcut::ToggleBold => self.toggle_bold(),
            Shortcut::Delete => !self.delete_selection().is_empty(),
            Shortcut::Undo => self.undo(),
        };
        if changed { Refresh::Full } else { Refresh::None }
    }

    // --- pointer gestures ---------------------------------------------

    /// Resolve what lies under a board point.
    pub fn target_at(&self, point: Point) -> PointerTarget {
        PointerTarget::at(&self.document, point, &self.config)
    }

    /// Pointer pressed at board `point` over `target`.
    pub fn pointer_down(&mut self, point: Point, target: PointerTarget, modifiers: Modifiers) -> Refresh {
        self.commit_edit();
        let additive = modifiers.is_additive();
        self.gesture = match target {
            PointerTarget::Connector { node, side } => {
                match LinkState::begin(&self.document, node, side, point, &self.config) {
                    Some(link) => Gesture::Linking(link),
                    None => Gesture::Idle,
                }
            }
            PointerTarget::Edge(key) => {
                self.selection.click_edge(key, additive);
                Gesture::Idle
            }
            PointerTarget::Background => {
                Gesture::Marqueeing(MarqueeState::begin(point, additive, self.selection.clone()))
            }
            PointerTarget::Node(_) | PointerTarget::StepLine(_) | PointerTarget::Text(_) => {
                match DragGroup::for_target(target, &self.selection) {
                    Some(group) => {
                        let before = Snapshot::capture(&self.document, &self.selection);
                        Gesture::Dragging(DragState::begin(&self.document, before, target, group, point, additive))
                    }
                    None => Gesture::Idle,
                }
            }
        };
        log::debug!("pointer down on {target:?}: {}", self.gesture.name());
        Refresh::Overlay
    }

    /// Pointer moved to board `point`.
    pub fn pointer_move(&mut self, point: Point) -> Refresh {
        match &mut self.gesture {
            Gesture::Idle => Refresh::None,
            Gesture::Dragging(drag) => {
                Refresh::Partial(drag.update(&mut self.document, point, &self.config).clone())
            }
            Gesture::Linking(link) => {
                link.update(&self.document, point, &self.config);
                Refresh::Overlay
            }
            Gesture::Marqueeing(marquee) => {
                self.selection = marquee.update(&self.document, point, &self.config);
                Refresh::Overlay
            }
        }
    }

    /// Pointer released (or the gesture was cancelled) at board `point`.
    pub fn pointer_up(&mut self, point: Point) -> Result<Refresh, EditorError> {
        let gesture = std::mem::take(&mut self.gesture);
        log::debug!("pointer up: leaving {}", gesture.name());
        match gesture {
            Gesture::Idle => Ok(Refresh::None),
            Gesture::Dragging(drag) => {
                let outcome = drag.finish(&mut self.document, &self.config);
                if outcome.moved {
                    self.history.push(outcome.before);
                    self.selection = outcome.group.to_selection();
                } else {
                    self.click(outcome.target, outcome.additive);
                }
                Ok(Refresh::Full)
            }
            Gesture::Linking(link) => {
                let action = link.release(&self.document, point, &self.config);
                self.apply_link_action(action)?;
                Ok(Refresh::Full)
            }
            Gesture::Marqueeing(marquee) => {
                self.selection = marquee.finish(&self.document, point, &self.config);
                Ok(Refresh::Overlay)
            }
        }
    }

    fn click(&mut self, target: PointerTarget, additive: bool) {
        match target {
            PointerTarget::Node(id) => self.selection.click_node(id, additive),
            PointerTarget::StepLine(id) => self.selection.click_step_line(id, additive),
            PointerTarget::Text(id) => self.selection.click_text(id, additive),
            PointerTarget::Edge(key) => self.selection.click_edge(key, additive),
            PointerTarget::Connector { .. } => {}
            PointerTarget::Background => {
                if !additive {
                    self.selection.clear();
                }
            }
        }
    }

    fn apply_link_action(&mut self, action: LinkAction) -> Result<(), EditorError> {
        match action {
            LinkAction::CreateChild { from, side } => {
                self.create_connected_node(from, side)?;
            }
            LinkAction::Edge { from, to, side } => {
                self.record();
                self.document.upsert_edge(Edge::new(from, to, side));
            }
            LinkAction::EdgeArrow { from, to_edge_key } => {
                self.add_edge_arrow(from, to_edge_key);
            }
            LinkAction::Nothing => {}
        }
        Ok(())
    }

    /// Add an edge arrow unless it already exists.
    pub fn add_edge_arrow(&mut self, from: NodeId, to_edge_key: EdgeKey) -> bool {
        let token = self.record();
        let added = self.document.add_edge_arrow(from, to_edge_key);
        if !added {
            self.history.discard(token);
        }
        added
    }

    // --- inline editing -------------------------------------------------

    /// Focus a field. Any other active edit is committed first.
    pub fn begin_edit(&mut self, target: FieldTarget) -> Result<(), EditorError> {
        self.commit_edit();
        let before = Snapshot::capture(&self.document, &self.selection);
        let edit = FieldEdit::begin(&self.document, target, before)
            .ok_or(EditorError::FieldUnavailable(target))?;
        match target {
            FieldTarget::TextBody(id) => self.selection.set_texts([id]),
            other => {
                if let Some(node) = other.node() {
                    self.selection.set_nodes_and_lines([node], []);
                }
            }
        }
        self.edit = Some(edit);
        Ok(())
    }

    /// Apply the field's current text live.
    pub fn edit_input(&mut self, value: &str) {
        if let Some(edit) = self.edit.as_mut() {
            edit.input(&mut self.document, value);
        }
    }

    /// Commit the active edit, recording history if the value changed.
    pub fn commit_edit(&mut self) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };
        match edit.commit(&mut self.document) {
            Some(before) => {
                self.history.push(before);
                true
            }
            None => false,
        }
    }

    /// Abandon the active edit, restoring the focus-time value.
    pub fn cancel_edit(&mut self) {
        if let Some(edit) = self.edit.take() {
            edit.cancel(&mut self.document);
        }
    }

    /// Snap helper exposed for hosts placing step lines from raw input.
    pub fn snap(&self, value: f64) -> f64 {
        snap(value, self.config.grid_size)
    }
}
