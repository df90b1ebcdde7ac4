//! Engine configuration
//!
//! All fields have defaults, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! render_scale = 2.0
//! watermark_margin = 50.0
//! watermark_angle = 45.0
//! download_delay_ms = 100
//! default_font = "Helvetica"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::StandardFont;
use crate::error::{PdfToolsError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scale factor applied to each page's native viewport when rasterizing
    pub render_scale: f64,
    /// Distance in points between an edge anchor and the page edge
    pub watermark_margin: f64,
    /// Counter-clockwise rotation of watermark text in degrees
    pub watermark_angle: f64,
    /// Pause between successive downloads of a multi-file result
    pub download_delay_ms: u64,
    /// Standard font used for watermark text
    pub default_font: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            watermark_margin: 50.0,
            watermark_angle: 45.0,
            download_delay_ms: 100,
            default_font: "Helvetica".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| PdfToolsError::InvalidInput(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PdfToolsError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(PdfToolsError::InvalidInput(format!(
                "render_scale must be positive, got {}",
                self.render_scale
            )));
        }
        if !(self.watermark_margin.is_finite() && self.watermark_margin >= 0.0) {
            return Err(PdfToolsError::InvalidInput(format!(
                "watermark_margin must be non-negative, got {}",
                self.watermark_margin
            )));
        }
        if !self.watermark_angle.is_finite() {
            return Err(PdfToolsError::InvalidInput(
                "watermark_angle must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }

    pub fn font(&self) -> StandardFont {
        StandardFont::from_name(&self.default_font)
    }
}
