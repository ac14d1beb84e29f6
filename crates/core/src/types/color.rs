//! Display color type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DisplayColor`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ColorError {
    /// The input is not a `#RRGGBB` hex string.
    #[error("color must be a #RRGGBB hex string, got {0:?}")]
    InvalidFormat(String),
}

/// Colors assigned to new accounts, cycled through in order.
pub const PALETTE: [&str; 8] = [
    "#1E88E5", // azure
    "#E53935", // terracotta
    "#43A047", // olive
    "#8E24AA", // lavender
    "#FB8C00", // ocher
    "#00ACC1", // sea
    "#FDD835", // mimosa
    "#6D4C41", // bark
];

/// A user's display color, as a `#RRGGBB` hex string.
///
/// Calendar cells derive their appearance from the owning users' colors;
/// entries whose owner is missing from the directory render with
/// [`DisplayColor::fallback`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DisplayColor(String);

impl DisplayColor {
    /// Neutral color used when the owning user is unknown.
    pub const FALLBACK_HEX: &'static str = "#9E9E9E";

    /// Parse a `DisplayColor` from a `#RRGGBB` string.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidFormat`] unless the input is a `#`
    /// followed by exactly six hex digits.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let valid = s.len() == 7
            && s.starts_with('#')
            && s.chars().skip(1).all(|c| c.is_ascii_hexdigit());

        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(ColorError::InvalidFormat(s.to_owned()))
        }
    }

    /// The neutral fallback color.
    #[must_use]
    pub fn fallback() -> Self {
        Self(Self::FALLBACK_HEX.to_owned())
    }

    /// Pick a palette color by index (wraps around).
    #[must_use]
    pub fn from_palette(index: usize) -> Self {
        let hex = PALETTE
            .get(index % PALETTE.len())
            .copied()
            .unwrap_or(Self::FALLBACK_HEX);
        Self(hex.to_owned())
    }

    /// Returns the color as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DisplayColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
