//! Node-to-node edges and edge-arrow decorations.

use super::{NodeId, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identity of an edge: the ordered `(from, to)` pair, written `"from:to"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
}

/// Error parsing an edge key string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid edge key: {0:?}")]
pub struct ParseEdgeKeyError(pub String);

impl EdgeKey {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    /// Whether the edge touches the given node at either end.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

impl FromStr for EdgeKey {
    type Err = ParseEdgeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s.split_once(':').ok_or_else(|| ParseEdgeKeyError(s.to_string()))?;
        let from = from.trim().parse().map_err(|_| ParseEdgeKeyError(s.to_string()))?;
        let to = to.trim().parse().map_err(|_| ParseEdgeKeyError(s.to_string()))?;
        Ok(Self { from, to })
    }
}

impl TryFrom<String> for EdgeKey {
    type Error = ParseEdgeKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EdgeKey> for String {
    fn from(key: EdgeKey) -> Self {
        key.to_string()
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default = "default_from_side")]
    pub from_side: Side,
    #[serde(default = "default_to_side")]
    pub to_side: Side,
}

fn default_from_side() -> Side {
    Side::Bottom
}

fn default_to_side() -> Side {
    Side::Top
}

impl Edge {
    /// Edge leaving `from` on `from_side` and entering `to` on the opposite side.
    pub fn new(from: NodeId, to: NodeId, from_side: Side) -> Self {
        Self {
            from,
            to,
            from_side,
            to_side: from_side.opposite(),
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }

    /// Sides used for layout.
    ///
    /// Every edge is laid out bottom → top regardless of the stored hint.
    pub fn layout_sides(&self) -> (Side, Side) {
        (Side::Bottom, Side::Top)
    }
}

/// Arrow from a node to the visual midpoint of another edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeArrow {
    pub from: NodeId,
    pub to_edge_key: EdgeKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_format_and_parse() {
        let key = EdgeKey::new(3, 12);
        assert_eq!(key.to_string(), "3:12");
        assert_eq!("3:12".parse::<EdgeKey>().unwrap(), key);
        assert!("3-12".parse::<EdgeKey>().is_err());
        assert!("a:1".parse::<EdgeKey>().is_err());
    }

    #[test]
    fn test_edge_key_is_directional() {
        assert_ne!(EdgeKey::new(1, 2), EdgeKey::new(2, 1));
        assert!(EdgeKey::new(1, 2).touches(2));
        assert!(!EdgeKey::new(1, 2).touches(3));
    }

    #[test]
    fn test_edge_serializes_camel_case() {
        let edge = Edge::new(1, 2, Side::Bottom);
        let json = serde_json::to_value(edge).unwrap();
        assert_eq!(json["fromSide"], "bottom");
        assert_eq!(json["toSide"], "top");

        let arrow = EdgeArrow { from: 4, to_edge_key: edge.key() };
        let json = serde_json::to_value(arrow).unwrap();
        assert_eq!(json["toEdgeKey"], "1:2");
    }
}
