//! Stamp a line of text onto every page

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::EngineConfig;
use crate::document::{DocumentModel, PdfBackend, SaveOptions, TextDraw};
use crate::error::{OperationKind, PdfToolsError, Result};
use crate::geometry::WatermarkPosition;
use crate::input::{Blob, InputFile};
use crate::progress::Progress;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatermarkOptions {
    /// Fill opacity, clamped to 0.0..=1.0
    pub opacity: f32,
    pub font_size: f64,
    /// `#RRGGBB`
    pub color: String,
    pub position: WatermarkPosition,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            font_size: 24.0,
            color: "#000000".to_string(),
            position: WatermarkPosition::Center,
        }
    }
}

impl WatermarkOptions {
    fn validate(&self, text: &str) -> Result<Rgb> {
        if text.trim().is_empty() {
            return Err(PdfToolsError::InvalidInput(
                "Watermark text is empty".to_string(),
            ));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(PdfToolsError::InvalidInput(format!(
                "Font size must be positive, got {}",
                self.font_size
            )));
        }
        if self.opacity.is_nan() {
            return Err(PdfToolsError::InvalidInput(
                "Opacity is not a number".to_string(),
            ));
        }
        Rgb::from_hex(&self.color)
    }
}

/// Draw `text` on every page at the anchor for `options.position`, rotated
/// by the configured angle. The colour and text are checked before the
/// document is read.
pub fn watermark_document<B: PdfBackend>(
    backend: &B,
    config: &EngineConfig,
    input: &InputFile,
    text: &str,
    options: &WatermarkOptions,
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    let color = options.validate(text)?;

    watermark_stages(backend, config, input, text, options, color, progress)
        .map_err(PdfToolsError::during(OperationKind::Watermark))
}

fn watermark_stages<B: PdfBackend>(
    backend: &B,
    config: &EngineConfig,
    input: &InputFile,
    text: &str,
    options: &WatermarkOptions,
    color: Rgb,
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    let bytes = input.bytes()?;
    progress.report("Reading file", 20);

    let mut doc = backend.load(bytes)?;
    let font = doc.embed_font(config.font())?;
    let count = doc.page_count();
    tracing::debug!(
        file = %input.name,
        pages = count,
        position = options.position.as_str(),
        "watermarking"
    );
    progress.report("Preparing watermark", 60);

    for index in 0..count {
        let page = doc.page_info(index)?;
        let (x, y) = options
            .position
            .anchor(page.width, page.height, config.watermark_margin);
        doc.draw_text(
            index,
            font,
            &TextDraw {
                text,
                x,
                y,
                size: options.font_size,
                rotation: config.watermark_angle,
                color,
                opacity: options.opacity.clamp(0.0, 1.0),
            },
        )?;
        progress.report_step(
            format!("Watermarking page {} of {}", index + 1, count),
            index + 1,
            count,
            60,
            90,
        );
    }

    progress.report("Saving document", 95);
    let output = doc.save(SaveOptions::default())?;
    tracing::info!(file = %input.name, pages = count, "watermark applied");
    progress.finish();

    Ok(Blob::pdf(output))
}
