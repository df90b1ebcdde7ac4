//! Client-side PDF operations
//!
//! Compress, split, merge, rotate, watermark, extract text and rasterize PDF
//! documents entirely in memory, reporting staged progress along the way.
//!
//! Every pipeline is generic over a [`PdfBackend`]; [`LopdfBackend`] is the
//! built-in one. Rasterization needs a renderer, which the host supplies as a
//! [`Rasterizer`].

pub mod color;
pub mod compress;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod merge;
pub mod progress;
pub mod raster;
pub mod rasterize;
pub mod rotate;
pub mod split;
pub mod text;
pub mod watermark;

#[cfg(test)]
pub(crate) mod fixtures;

pub use color::Rgb;
pub use config::EngineConfig;
pub use document::{
    DocumentModel, LopdfBackend, LopdfDocument, PageInfo, PdfBackend, SaveOptions, StandardFont,
    TextDraw, TextLayer,
};
pub use engine::PdfTools;
pub use error::{OperationKind, PdfToolsError, Result};
pub use export::{bundle, output_name, DownloadScheduler, DownloadTarget, ExportFile};
pub use geometry::WatermarkPosition;
pub use input::{Blob, InputFile};
pub use progress::{Progress, ProgressEvent};
pub use raster::{PixelSurface, RasterDocument, Rasterizer, Viewport};
pub use rasterize::PageImage;
pub use watermark::WatermarkOptions;

/// Number of pages in a document
pub fn get_page_count(bytes: &[u8]) -> Result<usize> {
    Ok(LopdfBackend.load(bytes)?.page_count())
}

/// Highest page number a range may name
pub const MAX_PAGE_NUMBER: u32 = 100_000;

/// Parse page range string like "1-3, 5, 8-10" into sorted unique page numbers
pub fn parse_ranges(input: &str) -> Result<Vec<u32>> {
    use std::collections::BTreeSet;

    let mut pages = BTreeSet::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| PdfToolsError::InvalidInput(format!("Invalid start: {}", start)))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| PdfToolsError::InvalidInput(format!("Invalid end: {}", end)))?;

            if start > end {
                return Err(PdfToolsError::InvalidInput(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }
            check_page_number(start)?;
            check_page_number(end)?;

            pages.extend(start..=end);
        } else {
            let page: u32 = part
                .parse()
                .map_err(|_| PdfToolsError::InvalidInput(format!("Invalid page: {}", part)))?;
            check_page_number(page)?;
            pages.insert(page);
        }
    }

    Ok(pages.into_iter().collect())
}

fn check_page_number(page: u32) -> Result<()> {
    if page == 0 {
        return Err(PdfToolsError::InvalidInput(
            "Page numbers must be >= 1".into(),
        ));
    }
    if page > MAX_PAGE_NUMBER {
        return Err(PdfToolsError::InvalidInput(format!(
            "Page {} exceeds the maximum of {}",
            page, MAX_PAGE_NUMBER
        )));
    }
    Ok(())
}

/// [`parse_ranges`] converted to zero-based page indices
pub fn parse_page_indices(input: &str) -> Result<Vec<usize>> {
    Ok(parse_ranges(input)?
        .into_iter()
        .map(|page| page as usize - 1)
        .collect())
}
