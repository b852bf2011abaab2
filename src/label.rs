//! Shape labels shared by both recognizers and the synthesis engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of shapes a recognizer may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeLabel {
    Line,
    Circle,
    Rectangle,
    Square,
    Diamond,
    Triangle,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Star,
    Pentagon,
    Hexagon,
    Unknown,
}

impl ShapeLabel {
    /// Every label, in declaration order
    pub const ALL: [ShapeLabel; 14] = [
        ShapeLabel::Line,
        ShapeLabel::Circle,
        ShapeLabel::Rectangle,
        ShapeLabel::Square,
        ShapeLabel::Diamond,
        ShapeLabel::Triangle,
        ShapeLabel::ArrowLeft,
        ShapeLabel::ArrowRight,
        ShapeLabel::ArrowUp,
        ShapeLabel::ArrowDown,
        ShapeLabel::Star,
        ShapeLabel::Pentagon,
        ShapeLabel::Hexagon,
        ShapeLabel::Unknown,
    ];

    /// The classes the shipped classifier is trained on, in class-index order.
    pub const CLASSIFIER_VOCABULARY: [ShapeLabel; 10] = [
        ShapeLabel::Circle,
        ShapeLabel::Square,
        ShapeLabel::Rectangle,
        ShapeLabel::Triangle,
        ShapeLabel::ArrowLeft,
        ShapeLabel::ArrowRight,
        ShapeLabel::ArrowUp,
        ShapeLabel::ArrowDown,
        ShapeLabel::Diamond,
        ShapeLabel::Line,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeLabel::Line => "line",
            ShapeLabel::Circle => "circle",
            ShapeLabel::Rectangle => "rectangle",
            ShapeLabel::Square => "square",
            ShapeLabel::Diamond => "diamond",
            ShapeLabel::Triangle => "triangle",
            ShapeLabel::ArrowLeft => "arrow-left",
            ShapeLabel::ArrowRight => "arrow-right",
            ShapeLabel::ArrowUp => "arrow-up",
            ShapeLabel::ArrowDown => "arrow-down",
            ShapeLabel::Star => "star",
            ShapeLabel::Pentagon => "pentagon",
            ShapeLabel::Hexagon => "hexagon",
            ShapeLabel::Unknown => "unknown",
        }
    }

    /// Shapes drawn as a closed loop
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            ShapeLabel::Circle
                | ShapeLabel::Rectangle
                | ShapeLabel::Square
                | ShapeLabel::Diamond
                | ShapeLabel::Triangle
                | ShapeLabel::Star
                | ShapeLabel::Pentagon
                | ShapeLabel::Hexagon
        )
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a label that is not in [`ShapeLabel::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shape label: {0}")]
pub struct ParseLabelError(pub String);

impl FromStr for ShapeLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        for label in ShapeLabel::ALL {
            assert_eq!(label.to_string().parse::<ShapeLabel>(), Ok(label));
        }
    }

    #[test]
    fn parse_rejects_unlisted_names() {
        assert_eq!(
            "octagon".parse::<ShapeLabel>(),
            Err(ParseLabelError("octagon".to_string()))
        );
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ShapeLabel::ArrowLeft).unwrap();
        assert_eq!(json, "\"arrow-left\"");
        let back: ShapeLabel = serde_json::from_str("\"arrow-down\"").unwrap();
        assert_eq!(back, ShapeLabel::ArrowDown);
    }

    #[test]
    fn vocabulary_excludes_unknown() {
        assert!(!ShapeLabel::CLASSIFIER_VOCABULARY.contains(&ShapeLabel::Unknown));
        assert_eq!(ShapeLabel::CLASSIFIER_VOCABULARY[0], ShapeLabel::Circle);
        assert_eq!(ShapeLabel::CLASSIFIER_VOCABULARY[9], ShapeLabel::Line);
    }
}
