//! Color parsing shared by annotation billboards and the configuration.
//!
//! Accepts the same notations as HTML color attributes: `#RGB`, `#RGBA`,
//! `#RRGGBB`, `#RRGGBBAA` and a set of common color names.

use crate::error::GalleryError;

/// An sRGB color with straight alpha.
pub type Rgba = [u8; 4];

/// Named colors understood by [`parse_html_color`].
const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("red", [255, 0, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("aqua", [0, 255, 255, 255]),
    ("blue", [0, 0, 255, 255]),
    ("darkblue", [0, 0, 160, 255]),
    ("lightblue", [173, 216, 230, 255]),
    ("purple", [128, 0, 128, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("fuchsia", [255, 0, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("white", [255, 255, 255, 255]),
    ("silver", [192, 192, 192, 255]),
    ("grey", [128, 128, 128, 255]),
    ("gray", [128, 128, 128, 255]),
    ("black", [0, 0, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("brown", [165, 42, 42, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("olive", [128, 128, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("teal", [0, 128, 128, 255]),
];

/// Parse an HTML-style color string.
///
/// # Returns
/// * `Ok(Rgba)` - parsed color, alpha defaults to 255
/// * `Err(GalleryError::InvalidColor)` - the string is not a recognised color
pub fn parse_html_color(value: &str) -> Result<Rgba, GalleryError> {
    let trimmed = value.trim();

    let Some(hex) = trimmed.strip_prefix('#') else {
        let lower = trimmed.to_ascii_lowercase();
        return NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgba)| *rgba)
            .ok_or_else(|| GalleryError::invalid_color(value));
    };

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GalleryError::invalid_color(value));
    }

    let digits: Vec<u8> = hex
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| d as u8)
        .collect();

    match digits.len() {
        3 | 4 => {
            // Short form: each digit is doubled (#F80 == #FF8800)
            let mut rgba = [255u8; 4];
            for (channel, digit) in rgba.iter_mut().zip(&digits) {
                *channel = digit * 17;
            }
            Ok(rgba)
        }
        6 | 8 => {
            let mut rgba = [255u8; 4];
            for (channel, pair) in rgba.iter_mut().zip(digits.chunks(2)) {
                *channel = pair[0] * 16 + pair[1];
            }
            Ok(rgba)
        }
        _ => Err(GalleryError::invalid_color(value)),
    }
}

/// Parse a color, falling back to `fallback` and logging when it is invalid.
pub fn parse_color_or(value: &str, fallback: Rgba) -> Rgba {
    match parse_html_color(value) {
        Ok(rgba) => rgba,
        Err(e) => {
            log::warn!("{}, using fallback {:?}", e, fallback);
            fallback
        }
    }
}

/// Convert an 8-bit color to normalized floats for the renderer.
pub fn rgba_to_f32(rgba: Rgba) -> [f32; 4] {
    rgba.map(|c| f32::from(c) / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        assert_eq!(parse_html_color("#FF8000").unwrap(), [255, 128, 0, 255]);
        assert_eq!(parse_html_color("#ff800080").unwrap(), [255, 128, 0, 128]);
    }

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(parse_html_color("#F80").unwrap(), [255, 136, 0, 255]);
        assert_eq!(parse_html_color("#0F08").unwrap(), [0, 255, 0, 136]);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_html_color("Red").unwrap(), [255, 0, 0, 255]);
        assert_eq!(parse_html_color(" white ").unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        let err = parse_html_color("#ZZZZZZ").unwrap_err();
        assert_eq!(err, GalleryError::invalid_color("#ZZZZZZ"));
        assert!(parse_html_color("#12345").is_err());
        assert!(parse_html_color("").is_err());
        assert!(parse_html_color("chartreuse-ish").is_err());
    }

    #[test]
    fn test_parse_color_or_falls_back() {
        assert_eq!(parse_color_or("#ZZZZZZ", [1, 2, 3, 4]), [1, 2, 3, 4]);
        assert_eq!(parse_color_or("#000000", [1, 2, 3, 4]), [0, 0, 0, 255]);
    }

    #[test]
    fn test_rgba_to_f32() {
        let [r, g, b, a] = rgba_to_f32([255, 0, 51, 255]);
        assert!((r - 1.0).abs() < 0.001);
        assert!(g.abs() < 0.001);
        assert!((b - 0.2).abs() < 0.001);
        assert!((a - 1.0).abs() < 0.001);
    }
}
