//! Renderer trait abstraction.

use cookchart_core::config::BoardConfig;
use cookchart_core::document::Document;
use cookchart_core::editor::Editor;
use cookchart_core::interaction::{FieldTarget, Gesture};
use cookchart_core::model::{EdgeKey, NodeId};
use cookchart_core::selection::Selection;
use kurbo::{CubicBez, Rect};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Nothing to export: the board is empty")]
    EmptyBoard,
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Everything a renderer reads for one frame.
pub struct RenderContext<'a> {
    pub document: &'a Document,
    pub selection: &'a Selection,
    pub config: &'a BoardConfig,
    /// Background color.
    pub background_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Whether to draw the grid.
    pub show_grid: bool,
    /// Marquee rectangle in board coordinates.
    pub marquee: Option<Rect>,
    /// Curve following the pointer during a connector drag.
    pub link_preview: Option<CubicBez>,
    /// Node under the pointer during a connector drag.
    pub link_target: Option<NodeId>,
    /// Edge under the pointer during a connector drag.
    pub hovered_edge: Option<EdgeKey>,
    /// Field currently being edited; the host draws its own input over it.
    pub editing: Option<FieldTarget>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context with no overlays.
    pub fn new(document: &'a Document, selection: &'a Selection, config: &'a BoardConfig) -> Self {
        Self {
            document,
            selection,
            config,
            background_color: Color::from_rgba8(255, 255, 255, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            show_grid: true,
            marquee: None,
            link_preview: None,
            link_target: None,
            hovered_edge: None,
            editing: None,
        }
    }

    /// Context for the editor's current state, gesture overlays included.
    pub fn from_editor(editor: &'a Editor) -> Self {
        let mut ctx = Self::new(editor.document(), editor.selection(), editor.config())
            .with_marquee(editor.marquee_rect())
            .with_link_preview(editor.link_preview())
            .with_editing(editor.active_edit().map(|e| e.target));
        if let Gesture::Linking(link) = editor.gesture() {
            ctx.link_target = link.target_node;
            ctx.hovered_edge = link.target_edge;
        }
        ctx
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Show or hide the grid.
    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Set the marquee rectangle.
    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }

    /// Set the connector drag preview.
    pub fn with_link_preview(mut self, curve: Option<CubicBez>) -> Self {
        self.link_preview = curve;
        self
    }

    /// Set the field being edited.
    pub fn with_editing(mut self, target: Option<FieldTarget>) -> Self {
        self.editing = target;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the output for a frame.
    ///
    /// Called after every mutation; must not depend on the previous frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
