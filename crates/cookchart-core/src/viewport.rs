//! Scrollable, zoomable view onto the board.

use crate::config::BoardConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed view scale.
pub const MIN_VIEW_SCALE: f64 = 0.5;
/// Largest allowed view scale.
pub const MAX_VIEW_SCALE: f64 = 2.5;
/// Minimum distance of the spawn point from the visible top-left.
const SPAWN_INSET: f64 = 24.0;
/// Viewport size assumed before the host reports one.
const FALLBACK_SIZE: Size = Size::new(900.0, 500.0);

/// The host's view of the board.
///
/// `scroll` is the scroll offset in client pixels and `size` is the visible
/// client area; board coordinates are client coordinates divided by `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll: Vec2,
    pub size: Size,
    scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            size: FALLBACK_SIZE,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale, clamped to the allowed range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_VIEW_SCALE, MAX_VIEW_SCALE);
    }

    /// Board → visible-area transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(-self.scroll) * Affine::scale(self.scale)
    }

    /// Convert a point relative to the visible area into board coordinates.
    pub fn client_to_board(&self, client: Point) -> Point {
        ((client.to_vec2() + self.scroll) / self.scale).to_point()
    }

    /// Convert a board point into a point relative to the visible area.
    pub fn board_to_client(&self, board: Point) -> Point {
        self.transform() * board
    }

    /// Convert a pointer delta in client pixels into board units.
    pub fn board_delta(&self, client_delta: Vec2) -> Vec2 {
        client_delta / self.scale
    }

    /// Change the scale keeping the board point under `client` fixed.
    pub fn zoom_at(&mut self, client: Point, scale: f64) {
        let next = scale.clamp(MIN_VIEW_SCALE, MAX_VIEW_SCALE);
        if (next - self.scale).abs() < 1e-4 {
            return;
        }
        let content = self.client_to_board(client);
        self.scale = next;
        self.scroll = content.to_vec2() * next - client.to_vec2();
    }

    /// Visible area in board coordinates.
    pub fn visible_rect(&self) -> Rect {
        let origin = (self.scroll / self.scale).to_point();
        Rect::from_origin_size(origin, self.size / self.scale)
    }

    /// Where a new root entity appears: centred in the visible area, at least
    /// a small inset from its top-left corner.
    pub fn spawn_position(&self, config: &BoardConfig) -> Point {
        let visible = self.visible_rect();
        Point::new(
            visible.x0 + ((visible.width() - config.node_width) / 2.0).max(SPAWN_INSET),
            visible.y0 + ((visible.height() - config.node_height) / 2.0).max(SPAWN_INSET),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_clamped() {
        let mut view = Viewport::default();
        view.set_scale(10.0);
        assert_eq!(view.scale(), MAX_VIEW_SCALE);
        view.set_scale(0.01);
        assert_eq!(view.scale(), MIN_VIEW_SCALE);
    }

    #[test]
    fn test_client_board_round_trip() {
        let mut view = Viewport::default();
        view.set_scale(2.0);
        view.scroll = Vec2::new(100.0, 40.0);
        let board = view.client_to_board(Point::new(60.0, 60.0));
        assert_eq!(board, Point::new(80.0, 50.0));
        let client = view.board_to_client(board);
        assert!((client - Point::new(60.0, 60.0)).hypot() < 1e-9);
        assert_eq!(view.board_delta(Vec2::new(10.0, -4.0)), Vec2::new(5.0, -2.0));
    }

    #[test]
    fn test_zoom_keeps_point_fixed() {
        let mut view = Viewport::default();
        view.scroll = Vec2::new(30.0, 70.0);
        let anchor = Point::new(200.0, 150.0);
        let before = view.client_to_board(anchor);
        view.zoom_at(anchor, 1.5);
        let after = view.client_to_board(anchor);
        assert!((before - after).hypot() < 1e-9);
        assert_eq!(view.scale(), 1.5);
    }

    #[test]
    fn test_spawn_position() {
        let config = BoardConfig::default();
        let view = Viewport::default();
        assert_eq!(view.spawn_position(&config), Point::new(340.0, 200.0));

        let small = Viewport::new(Size::new(100.0, 100.0));
        assert_eq!(small.spawn_position(&config), Point::new(24.0, 24.0));
    }
}
