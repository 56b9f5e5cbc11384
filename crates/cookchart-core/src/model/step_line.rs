//! Horizontal step dividers.

use super::StepLineId;
use serde::{Deserialize, Serialize};

/// A horizontal marker at a board y-coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepLine {
    pub id: StepLineId,
    pub y: f64,
    #[serde(default)]
    pub label: String,
}

impl StepLine {
    pub fn new(id: StepLineId, y: f64) -> Self {
        Self { id, y, label: String::new() }
    }

    /// Label shown on the board; `rank` is the zero-based position among all
    /// step lines sorted by y.
    pub fn display_label(&self, rank: usize) -> String {
        let label = self.label.trim();
        if label.is_empty() {
            format!("STEP {}", rank + 1)
        } else {
            label.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_defaults_to_rank() {
        let mut line = StepLine::new(7, 200.0);
        assert_eq!(line.display_label(0), "STEP 1");
        assert_eq!(line.display_label(2), "STEP 3");
        line.label = "  Prep ".to_string();
        assert_eq!(line.display_label(2), "Prep");
    }
}
