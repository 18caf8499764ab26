//! Visual encoding channels

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named visual encoding slot
///
/// The declaration order doubles as the iteration order of encodings, so
/// primary positional channels always register before their secondary
/// counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    X,
    Y,
    X2,
    Y2,
    Color,
    Fill,
    Stroke,
    Opacity,
    FillOpacity,
    StrokeOpacity,
    Size,
    Shape,
    StrokeWidth,
    Angle,
    Text,
    Search,
    UniqueId,
}

impl Channel {
    /// The primary channel: `x2 -> x`, `y2 -> y`, everything else maps to itself
    pub fn primary(self) -> Channel {
        match self {
            Channel::X2 => Channel::X,
            Channel::Y2 => Channel::Y,
            other => other,
        }
    }

    /// The secondary (range-end) counterpart of a primary positional channel
    pub fn secondary(self) -> Option<Channel> {
        match self {
            Channel::X => Some(Channel::X2),
            Channel::Y => Some(Channel::Y2),
            _ => None,
        }
    }

    pub fn is_secondary(self) -> bool {
        matches!(self, Channel::X2 | Channel::Y2)
    }

    /// x, y, x2 or y2
    pub fn is_positional(self) -> bool {
        matches!(self, Channel::X | Channel::Y | Channel::X2 | Channel::Y2)
    }

    pub fn is_primary_positional(self) -> bool {
        matches!(self, Channel::X | Channel::Y)
    }

    /// Whether values on this channel pass through a scale
    pub fn has_scale(self) -> bool {
        !matches!(self, Channel::Text | Channel::Search | Channel::UniqueId)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::X2 => "x2",
            Channel::Y2 => "y2",
            Channel::Color => "color",
            Channel::Fill => "fill",
            Channel::Stroke => "stroke",
            Channel::Opacity => "opacity",
            Channel::FillOpacity => "fillOpacity",
            Channel::StrokeOpacity => "strokeOpacity",
            Channel::Size => "size",
            Channel::Shape => "shape",
            Channel::StrokeWidth => "strokeWidth",
            Channel::Angle => "angle",
            Channel::Text => "text",
            Channel::Search => "search",
            Channel::UniqueId => "uniqueId",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_of_secondary() {
        assert_eq!(Channel::X2.primary(), Channel::X);
        assert_eq!(Channel::Y2.primary(), Channel::Y);
        assert_eq!(Channel::Color.primary(), Channel::Color);
    }

    #[test]
    fn test_secondary_only_for_positional() {
        assert_eq!(Channel::X.secondary(), Some(Channel::X2));
        assert_eq!(Channel::Size.secondary(), None);
    }

    #[test]
    fn test_scale_less_channels() {
        assert!(!Channel::Text.has_scale());
        assert!(!Channel::UniqueId.has_scale());
        assert!(Channel::Opacity.has_scale());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let channel: Channel = serde_json::from_str("\"fillOpacity\"").unwrap();
        assert_eq!(channel, Channel::FillOpacity);
        assert_eq!(channel.to_string(), "fillOpacity");
    }

    #[test]
    fn test_ordering_puts_primary_first() {
        assert!(Channel::X < Channel::X2);
        assert!(Channel::Y < Channel::Y2);
    }
}
