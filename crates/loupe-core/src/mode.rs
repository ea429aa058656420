#![forbid(unsafe_code)]

//! The inspector's tool modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The active tool. Exactly one is active while the inspector runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    /// Hover outline + click-to-select with hierarchy panel.
    #[default]
    Inspect,
    /// Box-model overlays on hover.
    Spacing,
    /// Click copies the computed text color.
    Color,
    /// Click reports the font stack.
    Font,
}

impl ToolMode {
    /// Every mode, in toolbar order.
    pub const ALL: [ToolMode; 4] = [Self::Inspect, Self::Spacing, Self::Color, Self::Font];

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inspect => "inspect",
            Self::Spacing => "spacing",
            Self::Color => "color",
            Self::Font => "font",
        }
    }

    /// Toolbar glyph.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Inspect => "\u{1F50D}",
            Self::Spacing => "\u{1F4D0}",
            Self::Color => "\u{1F3A8}",
            Self::Font => "\u{1F524}",
        }
    }

    /// Toolbar tooltip.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Inspect => "Inspect Element",
            Self::Spacing => "Spacing",
            Self::Color => "Color Picker",
            Self::Font => "Font Inspector",
        }
    }

    /// Body cursor while the mode is active (`None` leaves the page cursor).
    pub const fn cursor(self) -> Option<&'static str> {
        match self {
            Self::Inspect => Some("crosshair"),
            Self::Color => Some("copy"),
            Self::Spacing | Self::Font => None,
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized tool name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToolMode(pub String);

impl fmt::Display for UnknownToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tool mode: {:?}", self.0)
    }
}

impl std::error::Error for UnknownToolMode {}

impl FromStr for ToolMode {
    type Err = UnknownToolMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownToolMode(s.to_owned()))
    }
}
