//! Watermark anchor placement

use serde::{Deserialize, Serialize};

/// Distance in points between an edge anchor and the page edge
pub const DEFAULT_MARGIN: f64 = 50.0;

/// Named anchor for watermark text.
///
/// There is no separate `middle-center`: the center is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    #[default]
    #[serde(other)]
    Center,
}

impl WatermarkPosition {
    /// Lenient parse: unknown names fall back to `Center`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "top-left" => Self::TopLeft,
            "top-center" => Self::TopCenter,
            "top-right" => Self::TopRight,
            "middle-left" => Self::MiddleLeft,
            "middle-right" => Self::MiddleRight,
            "bottom-left" => Self::BottomLeft,
            "bottom-center" => Self::BottomCenter,
            "bottom-right" => Self::BottomRight,
            _ => Self::Center,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        }
    }

    /// Anchor point in PDF user space (origin bottom-left) for a page of the
    /// given size. Page rotation is not taken into account.
    pub fn anchor(&self, width: f64, height: f64, margin: f64) -> (f64, f64) {
        let cx = width / 2.0;
        let cy = height / 2.0;
        match self {
            Self::TopLeft => (margin, height - margin),
            Self::TopCenter => (cx, height - margin),
            Self::TopRight => (width - margin, height - margin),
            Self::MiddleLeft => (margin, cy),
            Self::MiddleRight => (width - margin, cy),
            Self::BottomLeft => (margin, margin),
            Self::BottomCenter => (cx, margin),
            Self::BottomRight => (width - margin, margin),
            Self::Center => (cx, cy),
        }
    }
}

/// Text matrix `[a b c d e f]` placing text at `(x, y)` rotated by `degrees`
/// counter-clockwise.
pub fn rotated_text_matrix(x: f64, y: f64, degrees: f64) -> [f64; 6] {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    [cos, sin, -sin, cos, x, y]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const W: f64 = 612.0;
    const H: f64 = 792.0;

    #[test]
    fn test_corner_anchors() {
        assert_eq!(WatermarkPosition::TopLeft.anchor(W, H, 50.0), (50.0, 742.0));
        assert_eq!(WatermarkPosition::TopRight.anchor(W, H, 50.0), (562.0, 742.0));
        assert_eq!(WatermarkPosition::BottomLeft.anchor(W, H, 50.0), (50.0, 50.0));
        assert_eq!(
            WatermarkPosition::BottomRight.anchor(W, H, 50.0),
            (562.0, 50.0)
        );
    }

    #[test]
    fn test_edge_center_anchors() {
        assert_eq!(WatermarkPosition::TopCenter.anchor(W, H, 50.0), (306.0, 742.0));
        assert_eq!(WatermarkPosition::MiddleLeft.anchor(W, H, 50.0), (50.0, 396.0));
        assert_eq!(
            WatermarkPosition::MiddleRight.anchor(W, H, 50.0),
            (562.0, 396.0)
        );
        assert_eq!(
            WatermarkPosition::BottomCenter.anchor(W, H, 50.0),
            (306.0, 50.0)
        );
    }

    #[test]
    fn test_unknown_position_is_center() {
        assert_eq!(WatermarkPosition::parse("middle-center"), WatermarkPosition::Center);
        assert_eq!(WatermarkPosition::parse("diagonal"), WatermarkPosition::Center);
        assert_eq!(WatermarkPosition::parse(""), WatermarkPosition::Center);
        assert_eq!(WatermarkPosition::Center.anchor(W, H, 50.0), (306.0, 396.0));
    }

    #[test]
    fn test_serde_names() {
        let p: WatermarkPosition = serde_json::from_str("\"bottom-right\"").unwrap();
        assert_eq!(p, WatermarkPosition::BottomRight);
        let p: WatermarkPosition = serde_json::from_str("\"nowhere\"").unwrap();
        assert_eq!(p, WatermarkPosition::Center);
        assert_eq!(
            serde_json::to_string(&WatermarkPosition::MiddleLeft).unwrap(),
            "\"middle-left\""
        );
    }

    #[test]
    fn test_parse_roundtrips_names() {
        for p in [
            WatermarkPosition::TopLeft,
            WatermarkPosition::TopCenter,
            WatermarkPosition::TopRight,
            WatermarkPosition::MiddleLeft,
            WatermarkPosition::MiddleRight,
            WatermarkPosition::BottomLeft,
            WatermarkPosition::BottomCenter,
            WatermarkPosition::BottomRight,
            WatermarkPosition::Center,
        ] {
            assert_eq!(WatermarkPosition::parse(p.as_str()), p);
        }
    }

    #[test]
    fn test_rotated_matrix_45() {
        let m = rotated_text_matrix(10.0, 20.0, 45.0);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!((m[0] - s).abs() < 1e-9);
        assert!((m[1] - s).abs() < 1e-9);
        assert!((m[2] + s).abs() < 1e-9);
        assert!((m[3] - s).abs() < 1e-9);
        assert_eq!((m[4], m[5]), (10.0, 20.0));
    }

    proptest! {
        #[test]
        fn prop_anchor_inside_page(w in 101.0f64..5000.0, h in 101.0f64..5000.0, idx in 0usize..9) {
            let positions = [
                WatermarkPosition::TopLeft,
                WatermarkPosition::TopCenter,
                WatermarkPosition::TopRight,
                WatermarkPosition::MiddleLeft,
                WatermarkPosition::MiddleRight,
                WatermarkPosition::BottomLeft,
                WatermarkPosition::BottomCenter,
                WatermarkPosition::BottomRight,
                WatermarkPosition::Center,
            ];
            let (x, y) = positions[idx].anchor(w, h, DEFAULT_MARGIN);
            prop_assert!(x >= DEFAULT_MARGIN.min(w / 2.0) && x <= w - DEFAULT_MARGIN.min(w / 2.0));
            prop_assert!(y >= DEFAULT_MARGIN.min(h / 2.0) && y <= h - DEFAULT_MARGIN.min(h / 2.0));
        }
    }
}
