//! Indicator rendering.
//!
//! A reading (or the lack of one) becomes a [`RenderedIndicator`]: a small
//! square [`GlyphBitmap`] with the BPM digits or a heart placeholder, plus the
//! status text the host shows as its tooltip.

pub mod glyph;
pub mod indicator;
pub mod palette;

pub use glyph::GlyphBitmap;
pub use indicator::{
    DisplayZone, IconSize, IndicatorRenderer, RenderOptions, RenderedIndicator, NO_DATA_TEXT,
};
pub use palette::Palette;
