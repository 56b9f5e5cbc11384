//! Free-floating text annotations.

use super::TextId;
use crate::config::BoardConfig;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A text annotation with fixed width and content-fitted height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub id: TextId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bold: bool,
}

impl TextItem {
    pub fn new(id: TextId, position: Point, config: &BoardConfig) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            w: config.text_width,
            h: config.text_height,
            text: String::new(),
            bold: false,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Keep the item fully inside the board.
    pub fn clamp(&mut self, config: &BoardConfig) {
        self.x = self.x.min(config.board_width - self.w).max(0.0);
        self.y = self.y.min(config.board_height - self.h).max(0.0);
    }
}
