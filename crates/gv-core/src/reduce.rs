use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::{GridCell, Rgb};

/// BT.709 luma coefficients.
pub const LUMA_R: f64 = 0.2126;
pub const LUMA_G: f64 = 0.7152;
pub const LUMA_B: f64 = 0.0722;

/// Binary threshold: strictly above is white.
pub const WHITE_THRESHOLD: f64 = 127.5;

/// Politique de réduction d'une cellule.
///
/// # Example
/// ```
/// use gv_core::reduce::GridMode;
/// use gv_core::frame::GridCell;
/// assert_eq!(GridMode::Binary.reduce((255, 255, 255)), GridCell::Binary(1));
/// assert_eq!(GridMode::Color.reduce((1, 2, 3)), GridCell::Color((1, 2, 3)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    /// Seuil de luminance → 0/1.
    #[default]
    Binary,
    /// RGB conservé tel quel.
    Color,
}

impl GridMode {
    /// Reduce one sampled colour.
    #[inline(always)]
    #[must_use]
    pub fn reduce(self, rgb: Rgb) -> GridCell {
        match self {
            Self::Binary => GridCell::Binary(reduce_binary(rgb)),
            Self::Color => GridCell::Color(reduce_color(rgb)),
        }
    }

    /// Black cell of this mode.
    #[must_use]
    pub fn black(self) -> GridCell {
        match self {
            Self::Binary => GridCell::Binary(0),
            Self::Color => GridCell::Color((0, 0, 0)),
        }
    }

    /// Values stored per cell in the archive.
    #[must_use]
    pub fn channels(self) -> usize {
        match self {
            Self::Binary => 1,
            Self::Color => 3,
        }
    }
}

impl fmt::Display for GridMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Color => f.write_str("color"),
        }
    }
}

impl std::str::FromStr for GridMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bw" => Ok(Self::Binary),
            "color" | "colour" | "rgb" => Ok(Self::Color),
            other => Err(format!("unknown grid mode '{other}' (expected binary or color)")),
        }
    }
}

/// Luminance perceptuelle BT.709, non arrondie.
///
/// # Example
/// ```
/// use gv_core::reduce::luminance;
/// assert!((luminance((255, 255, 255)) - 255.0).abs() < 1e-9);
/// ```
#[inline(always)]
#[must_use]
pub fn luminance(rgb: Rgb) -> f64 {
    LUMA_R * f64::from(rgb.0) + LUMA_G * f64::from(rgb.1) + LUMA_B * f64::from(rgb.2)
}

/// 1 si la luminance dépasse strictement 127.5, sinon 0.
#[inline(always)]
#[must_use]
pub fn reduce_binary(rgb: Rgb) -> u8 {
    u8::from(luminance(rgb) > WHITE_THRESHOLD)
}

#[inline(always)]
#[must_use]
pub fn reduce_color(rgb: Rgb) -> Rgb {
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes() {
        assert_eq!(reduce_binary((0, 0, 0)), 0);
        assert_eq!(reduce_binary((255, 255, 255)), 1);
    }

    #[test]
    fn exact_threshold_is_black() {
        let rgb = (78, 146, 90);
        assert!((luminance(rgb) - WHITE_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(reduce_binary(rgb), 0);
    }

    #[test]
    fn green_dominates() {
        assert_eq!(reduce_binary((0, 200, 0)), 1);
        assert_eq!(reduce_binary((255, 0, 255)), 0);
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("RGB".parse::<GridMode>(), Ok(GridMode::Color));
        assert_eq!("bw".parse::<GridMode>(), Ok(GridMode::Binary));
        assert!("hsv".parse::<GridMode>().is_err());
    }
}
