//! Node cards.

use super::NodeId;
use crate::config::{BoardConfig, MAX_MEMOS, MAX_TAGS};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Card tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    #[default]
    Gray,
    Green,
    Orange,
}

impl NodeColor {
    /// Cycle gray → green → orange → gray.
    pub fn next(self) -> Self {
        match self {
            NodeColor::Gray => NodeColor::Green,
            NodeColor::Green => NodeColor::Orange,
            NodeColor::Orange => NodeColor::Gray,
        }
    }

    /// Parse a loosely-typed color name; anything unknown is gray.
    pub fn from_name(name: &str) -> Self {
        match name {
            "green" => NodeColor::Green,
            "orange" => NodeColor::Orange,
            _ => NodeColor::Gray,
        }
    }
}

/// A labeled card on the board.
///
/// Width is fixed by [`BoardConfig::node_width`]; `h` is the last measured
/// height and feeds anchor computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub h: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: NodeColor,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub memos: Vec<String>,
}

impl Node {
    /// Create an empty gray card with the default height.
    pub fn new(id: NodeId, position: Point, config: &BoardConfig) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            h: config.node_height,
            title: String::new(),
            color: NodeColor::Gray,
            time: String::new(),
            tags: Vec::new(),
            memos: Vec::new(),
        }
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bounding box for a card of the given width.
    pub fn rect(&self, width: f64) -> Rect {
        Rect::new(self.x, self.y, self.x + width, self.y + self.h)
    }

    /// Keep the card fully inside the board.
    pub fn clamp(&mut self, config: &BoardConfig) {
        self.x = self.x.min(config.board_width - config.node_width).max(0.0);
        self.y = self.y.min(config.board_height - self.h).max(0.0);
    }

    /// Whether the card carries neither tags nor memos.
    pub fn is_meta_empty(&self) -> bool {
        self.tags.is_empty() && self.memos.is_empty()
    }

    /// The single memo, or an empty string.
    pub fn memo(&self) -> &str {
        self.memos.first().map(String::as_str).unwrap_or("")
    }

    /// Replace the memo; blank input clears it.
    pub fn set_memo(&mut self, memo: &str) {
        self.memos = normalize_memos([memo]);
    }
}

/// Trim tags, drop blanks, and keep at most [`MAX_TAGS`].
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect()
}

/// Trim memos, drop blanks, and keep at most [`MAX_MEMOS`].
pub fn normalize_memos<I, S>(memos: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    memos
        .into_iter()
        .map(|m| m.as_ref().trim().to_string())
        .filter(|m| !m.is_empty())
        .take(MAX_MEMOS)
        .collect()
}
