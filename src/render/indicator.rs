//! Turns a measurement into a tray glyph and tooltip.

use std::convert::Infallible;
use std::fmt;

use chrono::FixedOffset;
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_5X8, FONT_6X10, FONT_9X15_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Triangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};

use pulsetray_types::Measurement;

use super::glyph::GlyphBitmap;
use super::palette::Palette;
use crate::host::{Alert, Severity};

/// Status text shown before the first reading arrives.
pub const NO_DATA_TEXT: &str = "No heart rate data yet";

/// Offsets the outline is stamped at before the fill is drawn on top.
const OUTLINE_OFFSETS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Supported tray icon sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconSize {
    /// 16x16, the classic notification-area size.
    #[default]
    Small,
    /// 32x32, for high-DPI hosts.
    Large,
}

impl IconSize {
    pub fn pixels(self) -> u32 {
        match self {
            IconSize::Small => 16,
            IconSize::Large => 32,
        }
    }
}

impl TryFrom<u32> for IconSize {
    type Error = u32;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        match pixels {
            16 => Ok(IconSize::Small),
            32 => Ok(IconSize::Large),
            other => Err(other),
        }
    }
}

impl fmt::Display for IconSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let px = self.pixels();
        write!(f, "{}x{}", px, px)
    }
}

/// Rendering variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub icon_size: IconSize,
    /// Stamp the digits in the outline colour around the fill.
    pub outline: bool,
    /// Append the sample's source label to status and alert text.
    pub include_source_label: bool,
}

/// Zone used for the wall-clock times in status and alert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

/// One rendered state of the tray indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedIndicator {
    pub glyph: GlyphBitmap,
    pub status_text: String,
    pub alert: bool,
    /// Reading shown by the glyph; `None` for the placeholder.
    pub bpm: Option<u32>,
}

impl RenderedIndicator {
    pub fn is_placeholder(&self) -> bool {
        self.bpm.is_none()
    }
}

/// Draws indicator glyphs and formats their text.
///
/// Rendering is deterministic: the same measurement and alert flag always
/// produce the same bitmap and text.
#[derive(Debug, Clone)]
pub struct IndicatorRenderer {
    options: RenderOptions,
    palette: Palette,
    zone: DisplayZone,
}

impl IndicatorRenderer {
    pub fn new(options: RenderOptions, palette: Palette) -> Self {
        Self {
            options,
            palette,
            zone: DisplayZone::Local,
        }
    }

    /// Format times in a fixed zone instead of the local one.
    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render the indicator for a reading, or the placeholder for `None`.
    pub fn render(&self, measurement: Option<&Measurement>, over_threshold: bool) -> RenderedIndicator {
        let size = self.options.icon_size.pixels();
        let mut glyph = GlyphBitmap::new(size, self.palette.background);

        match measurement {
            None => {
                self.draw_heart(&mut glyph);
                RenderedIndicator {
                    glyph,
                    status_text: NO_DATA_TEXT.to_string(),
                    alert: false,
                    bpm: None,
                }
            }
            Some(m) => {
                let fill = if over_threshold {
                    self.palette.alert
                } else {
                    self.palette.normal
                };
                self.draw_digits(&mut glyph, m, fill);
                RenderedIndicator {
                    glyph,
                    status_text: self.status_text(m),
                    alert: over_threshold,
                    bpm: Some(m.bpm),
                }
            }
        }
    }

    /// The placeholder shown before any reading.
    pub fn placeholder(&self) -> RenderedIndicator {
        self.render(None, false)
    }

    /// `"<bpm> at <HH:MM:SS>"`, with `" (<source>)"` when labels are enabled.
    pub fn status_text(&self, measurement: &Measurement) -> String {
        let text = format!("{} at {}", measurement.bpm, self.time_label(measurement));
        match (&measurement.source, self.options.include_source_label) {
            (Some(source), true) => format!("{} ({})", text, source),
            _ => text,
        }
    }

    /// Alert raised for a reading above the threshold.
    pub fn alert_for(&self, measurement: &Measurement) -> Alert {
        let time = self.time_label(measurement);
        let title = match (&measurement.source, self.options.include_source_label) {
            (Some(source), true) => format!("{} heart rate at {}", source, time),
            _ => format!("Heart rate at {}", time),
        };
        Alert {
            title,
            body: measurement.bpm.to_string(),
            severity: Severity::Warning,
        }
    }

    pub fn time_label(&self, measurement: &Measurement) -> String {
        match self.zone {
            DisplayZone::Local => measurement.local_time_label(),
            DisplayZone::Fixed(offset) => measurement.time_label_in(&offset),
        }
    }

    fn draw_digits(&self, glyph: &mut GlyphBitmap, measurement: &Measurement, fill: Rgb888) {
        let label = measurement.bpm.to_string();
        let font = font_for(self.options.icon_size, measurement.digit_count());
        let half = (glyph.size() / 2) as i32;
        let center = Point::new(half, half);

        if self.options.outline {
            let outline = MonoTextStyle::new(font, self.palette.outline);
            for (dx, dy) in OUTLINE_OFFSETS {
                let text = Text::with_text_style(&label, center + Point::new(dx, dy), outline, centered());
                drawn(text.draw(glyph));
            }
        }

        let text = Text::with_text_style(&label, center, MonoTextStyle::new(font, fill), centered());
        drawn(text.draw(glyph));
    }

    fn draw_heart(&self, glyph: &mut GlyphBitmap) {
        let size = glyph.size() as i32;
        let lobe = glyph.size() / 2;
        let top = size / 8;
        let style = PrimitiveStyle::with_fill(self.palette.placeholder);

        drawn(Circle::new(Point::new(0, top), lobe).into_styled(style).draw(glyph));
        drawn(Circle::new(Point::new(size / 2, top), lobe).into_styled(style).draw(glyph));

        let shoulder = top + (lobe / 2) as i32;
        let point = Triangle::new(
            Point::new(0, shoulder),
            Point::new(size - 1, shoulder),
            Point::new(size / 2, size - 1),
        );
        drawn(point.into_styled(style).draw(glyph));
    }
}

/// Font for a reading with `digits` digits; three or more get a narrower face.
pub fn font_for(size: IconSize, digits: usize) -> &'static MonoFont<'static> {
    match (size, digits > 2) {
        (IconSize::Small, false) => &FONT_6X10,
        (IconSize::Small, true) => &FONT_5X8,
        (IconSize::Large, false) => &FONT_10X20,
        (IconSize::Large, true) => &FONT_9X15_BOLD,
    }
}

fn centered() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build()
}

fn drawn<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn utc_renderer(options: RenderOptions, palette: Palette) -> IndicatorRenderer {
        IndicatorRenderer::new(options, palette)
            .with_zone(DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()))
    }

    fn reading(bpm: u32) -> Measurement {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap();
        Measurement::new(ts, bpm).with_source("awake")
    }

    #[test]
    fn test_normal_reading() {
        let renderer = utc_renderer(RenderOptions::default(), Palette::light());
        let indicator = renderer.render(Some(&reading(85)), false);

        assert_eq!(indicator.status_text, "85 at 10:00:00");
        assert!(!indicator.alert);
        assert_eq!(indicator.bpm, Some(85));
        assert_eq!(indicator.glyph.size(), 16);
        assert!(indicator.glyph.count(Palette::light().normal) > 0);
        assert_eq!(indicator.glyph.count(Palette::light().alert), 0);
    }

    #[test]
    fn test_alert_reading_uses_alert_colour() {
        let renderer = utc_renderer(RenderOptions::default(), Palette::light());
        let indicator = renderer.render(Some(&reading(101)), true);

        assert!(indicator.alert);
        assert!(indicator.status_text.starts_with("101 at "));
        assert!(indicator.glyph.count(Palette::light().alert) > 0);
        assert_eq!(indicator.glyph.count(Palette::light().normal), 0);
    }

    #[test]
    fn test_render_is_deterministic() {
        let options = RenderOptions {
            icon_size: IconSize::Large,
            outline: true,
            include_source_label: true,
        };
        let renderer = utc_renderer(options, Palette::dark());

        for bpm in [0, 7, 85, 101, 188] {
            for alert in [false, true] {
                let a = renderer.render(Some(&reading(bpm)), alert);
                let b = renderer.render(Some(&reading(bpm)), alert);
                assert_eq!(a, b);
                assert_eq!(a.glyph.to_rgb_bytes(), b.glyph.to_rgb_bytes());
            }
        }
    }

    #[test]
    fn test_placeholder_is_distinct() {
        let renderer = utc_renderer(RenderOptions::default(), Palette::light());
        let placeholder = renderer.placeholder();

        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.status_text, NO_DATA_TEXT);
        assert!(!placeholder.alert);
        assert!(placeholder.glyph.count(Palette::light().placeholder) > 0);
        assert_ne!(placeholder.glyph, renderer.render(Some(&reading(85)), false).glyph);
    }

    #[test]
    fn test_placeholder_ignores_alert_flag() {
        let renderer = utc_renderer(RenderOptions::default(), Palette::light());
        assert_eq!(renderer.render(None, true), renderer.placeholder());
    }

    #[test]
    fn test_readings_render_differently() {
        let renderer = utc_renderer(RenderOptions::default(), Palette::light());
        let a = renderer.render(Some(&reading(85)), false);
        let b = renderer.render(Some(&reading(86)), false);
        assert_ne!(a.glyph, b.glyph);
    }

    #[test]
    fn test_three_digits_use_narrow_font() {
        for size in [IconSize::Small, IconSize::Large] {
            let wide = font_for(size, 2);
            let narrow = font_for(size, 3);
            assert!(narrow.character_size.width < wide.character_size.width);
            assert!(narrow.character_size.width * 3 <= size.pixels());
            assert!(wide.character_size.width * 2 <= size.pixels());
        }
    }

    #[test]
    fn test_outline_adds_outline_pixels() {
        let plain = utc_renderer(RenderOptions::default(), Palette::dark());
        let outlined = utc_renderer(
            RenderOptions {
                outline: true,
                ..RenderOptions::default()
            },
            Palette::dark(),
        );

        let outline = Palette::dark().outline;
        assert_eq!(plain.render(Some(&reading(72)), false).glyph.count(outline), 0);
        assert!(outlined.render(Some(&reading(72)), false).glyph.count(outline) > 0);
    }

    #[test]
    fn test_source_label() {
        let renderer = utc_renderer(
            RenderOptions {
                include_source_label: true,
                ..RenderOptions::default()
            },
            Palette::light(),
        );
        assert_eq!(
            renderer.status_text(&reading(64)),
            "64 at 10:00:00 (awake)"
        );

        let alert = renderer.alert_for(&reading(140));
        assert_eq!(alert.title, "awake heart rate at 10:00:00");
        assert_eq!(alert.body, "140");
        assert_eq!(alert.severity, Severity::Warning);
    }

    #[test]
    fn test_alert_without_label() {
        let renderer = utc_renderer(RenderOptions::default(), Palette::light());
        let alert = renderer.alert_for(&reading(101));
        assert_eq!(alert.title, "Heart rate at 10:00:00");
        assert_eq!(alert.body, "101");
    }

    #[test]
    fn test_icon_size_conversion() {
        assert_eq!(IconSize::try_from(16), Ok(IconSize::Small));
        assert_eq!(IconSize::try_from(32), Ok(IconSize::Large));
        assert_eq!(IconSize::try_from(24), Err(24));
        assert_eq!(IconSize::Large.to_string(), "32x32");
    }
}
