//! Render pages to PNG images through a host-supplied [`Rasterizer`]

use crate::error::{OperationKind, PdfToolsError, Result};
use crate::input::{Blob, InputFile};
use crate::progress::Progress;
use crate::raster::{RasterDocument, Rasterizer};

/// A rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Zero-based page index
    pub page: usize,
    pub width: u32,
    pub height: u32,
    pub blob: Blob,
}

/// Render every page at `scale`. Pages for which the host cannot supply a
/// drawing surface are skipped.
pub fn rasterize_document<R: Rasterizer>(
    rasterizer: &R,
    input: &InputFile,
    scale: f64,
    progress: &mut Progress<'_>,
) -> Result<Vec<PageImage>> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(PdfToolsError::InvalidInput(format!(
            "Render scale must be positive, got {}",
            scale
        )));
    }

    rasterize_stages(rasterizer, input, scale, progress)
        .map_err(PdfToolsError::during(OperationKind::Rasterize))
}

fn rasterize_stages<R: Rasterizer>(
    rasterizer: &R,
    input: &InputFile,
    scale: f64,
    progress: &mut Progress<'_>,
) -> Result<Vec<PageImage>> {
    let mut doc = rasterizer.load(input.bytes()?)?;
    let count = doc.page_count();
    tracing::debug!(file = %input.name, pages = count, scale, "rasterizing");
    progress.report("Loading document", 10);

    let mut images = Vec::with_capacity(count);
    for index in 0..count {
        let viewport = doc.viewport(index, scale)?;
        match rasterizer.acquire_surface(&viewport) {
            Some(mut surface) => {
                doc.render(index, &viewport, &mut surface)
                    .map_err(|e| match e {
                        e @ PdfToolsError::Render { .. } => e,
                        other => PdfToolsError::Render {
                            page: index,
                            message: other.to_string(),
                        },
                    })?;
                images.push(PageImage {
                    page: index,
                    width: surface.width(),
                    height: surface.height(),
                    blob: Blob::png(surface.encode_png()?),
                });
            }
            None => tracing::warn!(
                page = index,
                width = viewport.width,
                height = viewport.height,
                "no drawing surface available, skipping page"
            ),
        }
        progress.report_step(
            format!("Rendering page {} of {}", index + 1, count),
            index + 1,
            count,
            10,
            90,
        );
    }

    tracing::info!(file = %input.name, images = images.len(), "rasterized");
    progress.finish();
    Ok(images)
}
