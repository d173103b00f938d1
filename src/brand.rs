//! Brand palette and styling rules checked against rendered widgets.
//!
//! Colors are compared by Euclidean distance in RGB space. A sampled color
//! within [`COLOR_TOLERANCE`] of any entry in [`BRAND_COLORS`] is on-brand.

use image::{Rgb, RgbImage};
use std::collections::HashMap;

/// Approved palette
pub const BRAND_COLORS: [(&str, Rgb<u8>); 11] = [
    ("royal_blue", Rgb([0x33, 0x2A, 0x86])),
    ("lime_green", Rgb([0x5E, 0x97, 0x32])),
    ("orange", Rgb([0xE3, 0x6F, 0x1E])),
    ("brick_red", Rgb([0x8A, 0x1F, 0x03])),
    ("navy_blue", Rgb([0x21, 0x43, 0x57])),
    ("pine_green", Rgb([0x00, 0x70, 0x4A])),
    ("sky_blue", Rgb([0x48, 0xA4, 0xDD])),
    ("bright_yellow", Rgb([0xFF, 0xD2, 0x00])),
    ("black", Rgb([0x00, 0x00, 0x0A])),
    ("grey", Rgb([0x93, 0x95, 0x98])),
    ("white", Rgb([0xFF, 0xFF, 0xFF])),
];

/// Maximum RGB distance from a brand color
pub const COLOR_TOLERANCE: f64 = 30.0;

/// Every n-th pixel is sampled when extracting a palette
pub const SAMPLE_STEP: usize = 100;

/// Colors below this share of the samples are treated as anti-aliasing noise
pub const MIN_COLOR_SHARE: f64 = 0.02;

/// Palette entries reported at most
pub const MAX_PALETTE: usize = 20;

/// Smallest readable font size on mobile viewports
pub const MIN_MOBILE_FONT_PX: f64 = 14.0;

/// Smallest corner radius for filled buttons
pub const MIN_BUTTON_RADIUS_PX: f64 = 4.0;

/// Smallest rendered logo width
pub const MIN_LOGO_WIDTH_PX: f64 = 100.0;

/// A color found in a screenshot region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: Rgb<u8>,
    /// Fraction of sampled pixels with this color
    pub share: f64,
}

/// Format a color as `#RRGGBB`
pub fn to_hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Parse `#RRGGBB` (the `#` is optional)
pub fn parse_hex(value: &str) -> Option<Rgb<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Parse a computed CSS color such as `rgb(51, 42, 134)` or `rgba(0, 0, 0, 0.5)`.
///
/// Fully transparent colors yield `None`.
pub fn parse_css_color(value: &str) -> Option<Rgb<u8>> {
    let value = value.trim();
    if value.starts_with('#') {
        return parse_hex(value);
    }
    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    if let Some(alpha) = parts.get(3) {
        if alpha.parse::<f64>().ok()? == 0.0 {
            return None;
        }
    }
    Some(Rgb([parts[0].parse().ok()?, parts[1].parse().ok()?, parts[2].parse().ok()?]))
}

pub fn color_distance(a: Rgb<u8>, b: Rgb<u8>) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Closest brand color and its distance
pub fn nearest_brand_color(color: Rgb<u8>) -> (&'static str, f64) {
    BRAND_COLORS
        .iter()
        .map(|&(name, brand)| (name, color_distance(color, brand)))
        .fold(("", f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

/// Whether `color` lies within `tolerance` of a brand color
pub fn is_brand_color(color: Rgb<u8>, tolerance: f64) -> bool {
    nearest_brand_color(color).1 <= tolerance
}

/// Dominant colors of an image, most frequent first.
///
/// Samples every `step`-th pixel, skips pure white and drops colors below
/// `min_share` of the samples.
pub fn dominant_colors(image: &RgbImage, step: usize, min_share: f64) -> Vec<PaletteEntry> {
    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
    let mut sampled = 0usize;
    for pixel in image.pixels().step_by(step.max(1)) {
        sampled += 1;
        if pixel.0 != [0xFF, 0xFF, 0xFF] {
            *counts.entry(pixel.0).or_default() += 1;
        }
    }
    if sampled == 0 {
        return Vec::new();
    }

    let mut palette: Vec<PaletteEntry> = counts
        .into_iter()
        .map(|(rgb, count)| PaletteEntry {
            color: Rgb(rgb),
            share: count as f64 / sampled as f64,
        })
        .filter(|entry| entry.share >= min_share)
        .collect();
    palette.sort_by(|a, b| b.share.total_cmp(&a.share).then_with(|| a.color.0.cmp(&b.color.0)));
    palette.truncate(MAX_PALETTE);
    palette
}

/// Dominant colors outside the brand palette
pub fn off_brand_colors(image: &RgbImage) -> Vec<PaletteEntry> {
    dominant_colors(image, SAMPLE_STEP, MIN_COLOR_SHARE)
        .into_iter()
        .filter(|entry| !is_brand_color(entry.color, COLOR_TOLERANCE))
        .collect()
}

/// Whether a computed `border-radius` rounds corners by at least [`MIN_BUTTON_RADIUS_PX`]
pub fn is_rounded(radius: &str) -> bool {
    let first = radius.split_whitespace().next().unwrap_or("");
    if let Some(percent) = first.strip_suffix('%') {
        return percent.parse::<f64>().is_ok_and(|p| p > 0.0);
    }
    first
        .strip_suffix("px")
        .and_then(|px| px.parse::<f64>().ok())
        .is_some_and(|px| px >= MIN_BUTTON_RADIUS_PX)
}

/// Whether any duration in a computed `transition-duration` list is non-zero
pub fn has_transition(durations: &str) -> bool {
    durations.split(',').any(|d| {
        let d = d.trim();
        let seconds = match d.strip_suffix("ms") {
            Some(ms) => ms.trim().parse::<f64>().map(|v| v / 1000.0),
            None => d.strip_suffix('s').unwrap_or(d).trim().parse::<f64>(),
        };
        seconds.is_ok_and(|s| s > 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_round_trip_of_palette() {
        for (name, color) in BRAND_COLORS {
            assert_eq!(parse_hex(&to_hex(color)), Some(color), "{}", name);
        }
        assert_eq!(parse_hex("#332a86"), Some(Rgb([0x33, 0x2A, 0x86])));
        assert_eq!(parse_hex("#FFF"), None);
        assert_eq!(parse_hex("#GGGGGG"), None);
    }

    #[test]
    fn test_parse_css_color() {
        assert_eq!(parse_css_color("rgb(51, 42, 134)"), Some(Rgb([51, 42, 134])));
        assert_eq!(parse_css_color("rgba(227, 111, 30, 0.8)"), Some(Rgb([227, 111, 30])));
        assert_eq!(parse_css_color("rgba(0, 0, 0, 0)"), None);
        assert_eq!(parse_css_color("#48A4DD"), Some(Rgb([0x48, 0xA4, 0xDD])));
        assert_eq!(parse_css_color("transparent"), None);
    }

    #[test]
    fn test_color_tolerance() {
        let royal_blue = Rgb([0x33, 0x2A, 0x86]);
        assert_eq!(color_distance(royal_blue, royal_blue), 0.0);
        assert_eq!(color_distance(Rgb([0, 0, 0]), Rgb([3, 4, 0])), 5.0);

        // 10 away on every channel: sqrt(300) ~ 17.3
        assert!(is_brand_color(Rgb([0x3D, 0x34, 0x90]), COLOR_TOLERANCE));
        // 20 away on every channel: sqrt(1200) ~ 34.6
        assert!(!is_brand_color(Rgb([0x47, 0x3E, 0x9A]), COLOR_TOLERANCE));

        // light page backgrounds sit close to white
        assert!(is_brand_color(Rgb([0xF5, 0xF5, 0xF7]), COLOR_TOLERANCE));
        assert!(!is_brand_color(Rgb([0xFF, 0x00, 0xFF]), COLOR_TOLERANCE));
    }

    #[test]
    fn test_nearest_brand_color() {
        let (name, distance) = nearest_brand_color(Rgb([0xE0, 0x70, 0x20]));
        assert_eq!(name, "orange");
        assert!(distance < 5.0);
    }

    #[test]
    fn test_dominant_colors_skip_white_and_noise() {
        // 100 pixels: 70 white, 25 royal blue, 5 magenta
        let image = RgbImage::from_fn(10, 10, |x, y| match y * 10 + x {
            0..=69 => Rgb([0xFF, 0xFF, 0xFF]),
            70..=94 => Rgb([0x33, 0x2A, 0x86]),
            _ => Rgb([0xFF, 0x00, 0xFF]),
        });

        let palette = dominant_colors(&image, 1, 0.0);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0].color, Rgb([0x33, 0x2A, 0x86]));
        assert_eq!(palette[0].share, 0.25);

        let palette = dominant_colors(&image, 1, 0.10);
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn test_off_brand_colors() {
        let on_brand = RgbImage::from_pixel(40, 40, Rgb([0x5E, 0x97, 0x32]));
        assert!(off_brand_colors(&on_brand).is_empty());

        let off_brand = RgbImage::from_pixel(40, 40, Rgb([0xFF, 0x00, 0xFF]));
        let found = off_brand_colors(&off_brand);
        assert_eq!(found.len(), 1);
        assert_eq!(to_hex(found[0].color), "#FF00FF");
    }

    #[test]
    fn test_is_rounded() {
        assert!(is_rounded("6px"));
        assert!(is_rounded("4px 4px 0px 0px"));
        assert!(is_rounded("50%"));
        assert!(!is_rounded("2px"));
        assert!(!is_rounded("0px"));
        assert!(!is_rounded(""));
    }

    #[test]
    fn test_has_transition() {
        assert!(has_transition("0.2s"));
        assert!(has_transition("0s, 150ms"));
        assert!(!has_transition("0s"));
        assert!(!has_transition("0s, 0s"));
        assert!(!has_transition(""));
    }
}
