//! Hex color parsing for drawing operators

use crate::error::{PdfToolsError, Result};

/// RGB color with each channel normalized to 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse `#RRGGBB` (the leading `#` is optional).
    ///
    /// Anything other than exactly six hex digits is rejected rather than
    /// producing undefined channel values.
    pub fn from_hex(color: &str) -> Result<Self> {
        let hex = color.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PdfToolsError::InvalidColor(color.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| -> Result<f32> {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| PdfToolsError::InvalidColor(color.to_string()))
        };

        Ok(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn components(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_black_and_white() {
        assert_eq!(Rgb::from_hex("#000000").unwrap(), Rgb::BLACK);
        assert_eq!(
            Rgb::from_hex("#FFFFFF").unwrap(),
            Rgb {
                r: 1.0,
                g: 1.0,
                b: 1.0
            }
        );
    }

    #[test]
    fn test_parse_without_hash() {
        let c = Rgb::from_hex("ff0000").unwrap();
        assert_eq!(c.components(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_mixed_channels() {
        let c = Rgb::from_hex("#336699").unwrap();
        assert!((c.r - 0x33 as f32 / 255.0).abs() < f32::EPSILON);
        assert!((c.g - 0x66 as f32 / 255.0).abs() < f32::EPSILON);
        assert!((c.b - 0x99 as f32 / 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_digits_rejected() {
        let err = Rgb::from_hex("#zzzzzz").unwrap_err();
        assert!(matches!(err, PdfToolsError::InvalidColor(_)));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(Rgb::from_hex("#fff").is_err());
        assert!(Rgb::from_hex("#1234567").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn test_multibyte_input_rejected() {
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    proptest! {
        #[test]
        fn prop_channels_normalized(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
            let c = Rgb::from_hex(&format!("#{:02x}{:02X}{:02x}", r, g, b)).unwrap();
            for v in c.components() {
                prop_assert!((0.0..=1.0).contains(&v));
            }
            prop_assert!((c.g * 255.0 - g as f32).abs() < 1e-3);
        }
    }
}
