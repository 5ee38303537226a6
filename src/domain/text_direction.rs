//! Text direction tags.
//!
//! A page's text direction is carried through to the result unchanged; only
//! its `-lr` / `-rl` suffix influences reading order.

use crate::core::OCRError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Principal text direction of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextDirection {
    /// Horizontal lines read left to right.
    #[default]
    #[serde(rename = "horizontal-lr")]
    HorizontalLr,
    /// Horizontal lines read right to left.
    #[serde(rename = "horizontal-rl")]
    HorizontalRl,
    /// Vertical lines, columns ordered left to right.
    #[serde(rename = "vertical-lr")]
    VerticalLr,
    /// Vertical lines, columns ordered right to left.
    #[serde(rename = "vertical-rl")]
    VerticalRl,
}

impl TextDirection {
    /// All accepted tags, in declaration order.
    pub const ALL: [TextDirection; 4] = [
        TextDirection::HorizontalLr,
        TextDirection::HorizontalRl,
        TextDirection::VerticalLr,
        TextDirection::VerticalRl,
    ];

    /// Returns the canonical tag string, e.g. `horizontal-lr`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::HorizontalLr => "horizontal-lr",
            TextDirection::HorizontalRl => "horizontal-rl",
            TextDirection::VerticalLr => "vertical-lr",
            TextDirection::VerticalRl => "vertical-rl",
        }
    }

    /// Returns the horizontal reading direction encoded in the tag suffix.
    pub fn reading_direction(&self) -> ReadingDirection {
        match self {
            TextDirection::HorizontalLr | TextDirection::VerticalLr => {
                ReadingDirection::LeftToRight
            }
            TextDirection::HorizontalRl | TextDirection::VerticalRl => {
                ReadingDirection::RightToLeft
            }
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextDirection {
    type Err = OCRError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextDirection::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                OCRError::invalid_input(format!(
                    "invalid text direction '{s}', expected one of: horizontal-lr, horizontal-rl, vertical-lr, vertical-rl"
                ))
            })
    }
}

impl TryFrom<&str> for TextDirection {
    type Error = OCRError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Horizontal reading direction handed to reading order policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReadingDirection {
    /// Left to right (`lr`).
    #[default]
    LeftToRight,
    /// Right to left (`rl`).
    RightToLeft,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_tags() {
        for direction in TextDirection::ALL {
            let parsed: TextDirection = direction.as_str().parse().unwrap();
            assert_eq!(parsed, direction);
        }
    }

    #[test]
    fn test_parse_unknown_tag_is_input_error() {
        let err = "diagonal-lr".parse::<TextDirection>().unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("diagonal-lr"));
    }

    #[test]
    fn test_reading_direction_from_suffix() {
        assert_eq!(
            TextDirection::HorizontalRl.reading_direction(),
            ReadingDirection::RightToLeft
        );
        assert_eq!(
            TextDirection::VerticalLr.reading_direction(),
            ReadingDirection::LeftToRight
        );
        assert_eq!(
            TextDirection::VerticalRl.reading_direction(),
            ReadingDirection::RightToLeft
        );
    }

    #[test]
    fn test_serde_uses_tag_strings() {
        let json = serde_json::to_string(&TextDirection::VerticalRl).unwrap();
        assert_eq!(json, "\"vertical-rl\"");
        let back: TextDirection = serde_json::from_str("\"horizontal-rl\"").unwrap();
        assert_eq!(back, TextDirection::HorizontalRl);
    }
}
