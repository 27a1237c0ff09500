//! Glyph colours.
//!
//! The tray icon sits on whatever background the host draws behind it, so the
//! palette follows the background luminance: dark digits on light
//! backgrounds, light digits on dark ones.

use embedded_graphics::pixelcolor::Rgb888;

/// Colours used when drawing a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Canvas fill behind the digits.
    pub background: Rgb888,
    /// Digits for readings at or below the threshold.
    pub normal: Rgb888,
    /// Digits for readings above the threshold.
    pub alert: Rgb888,
    /// Outline drawn around the digits when outlining is enabled.
    pub outline: Rgb888,
    /// Heart shown before the first reading arrives.
    pub placeholder: Rgb888,
}

impl Palette {
    /// Palette for light backgrounds.
    pub const fn light() -> Self {
        Self {
            background: Rgb888::new(255, 255, 255),
            normal: Rgb888::new(0, 0, 0),
            alert: Rgb888::new(139, 0, 0),
            outline: Rgb888::new(200, 200, 200),
            placeholder: Rgb888::new(200, 30, 45),
        }
    }

    /// Palette for dark backgrounds.
    pub const fn dark() -> Self {
        Self {
            background: Rgb888::new(24, 24, 24),
            normal: Rgb888::new(255, 255, 255),
            alert: Rgb888::new(255, 85, 85),
            outline: Rgb888::new(0, 0, 0),
            placeholder: Rgb888::new(230, 50, 60),
        }
    }

    /// Pick a palette from a background luminance in `0.0..=1.0`.
    ///
    /// Unknown luminance falls back to the light palette.
    pub fn from_luma(luma: Option<f32>) -> Self {
        match luma {
            Some(luma) if luma <= 0.5 => Self::dark(),
            _ => Self::light(),
        }
    }

    /// Detect the terminal background and pick a palette for it.
    pub fn auto_detect() -> Self {
        Self::from_luma(terminal_light::luma().ok())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}
