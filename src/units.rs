//! Unit conversion between user-facing measures and the internal pixel
//! coordinate space (96 dpi).

use serde::{Deserialize, Serialize};

/// Pixels per inch of the internal coordinate space.
pub const PRINT_DPI: f64 = 96.0;

const MM_PER_INCH: f64 = 25.4;

/// Measurement unit of a document. All geometry is stored in pixels;
/// formulas and recipe output use this unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mm,
    #[default]
    Cm,
    Inch,
    Px,
}

impl Unit {
    /// Convert a value expressed in this unit into pixels.
    #[must_use]
    pub fn to_pixel(self, value: f64) -> f64 {
        match self {
            Self::Mm => value / MM_PER_INCH * PRINT_DPI,
            Self::Cm => value / MM_PER_INCH * PRINT_DPI * 10.0,
            Self::Inch => value * PRINT_DPI,
            Self::Px => value,
        }
    }

    /// Convert a pixel value into this unit.
    #[must_use]
    pub fn from_pixel(self, pixels: f64) -> f64 {
        match self {
            Self::Mm => pixels / PRINT_DPI * MM_PER_INCH,
            Self::Cm => pixels / PRINT_DPI * MM_PER_INCH / 10.0,
            Self::Inch => pixels / PRINT_DPI,
            Self::Px => pixels,
        }
    }

    /// Short unit label, used as the postfix of formula display strings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Cm => "cm",
            Self::Inch => "in",
            Self::Px => "px",
        }
    }
}
