//! The operation service

use crate::compress::compress_document;
use crate::config::EngineConfig;
use crate::document::{LopdfBackend, PdfBackend, TextLayer};
use crate::error::Result;
use crate::input::{Blob, InputFile};
use crate::merge::merge_documents;
use crate::progress::Progress;
use crate::raster::Rasterizer;
use crate::rasterize::{rasterize_document, PageImage};
use crate::rotate::rotate_pages;
use crate::split::{extract_pages, split_document};
use crate::text::extract_text;
use crate::watermark::{watermark_document, WatermarkOptions};

/// Stateless entry point for every document operation.
///
/// Each call owns its inputs and its progress reporter, so one `PdfTools`
/// can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct PdfTools<B = LopdfBackend> {
    backend: B,
    config: EngineConfig,
}

impl PdfTools<LopdfBackend> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_backend(LopdfBackend, config)
    }
}

impl<B: PdfBackend> PdfTools<B> {
    pub fn with_backend(backend: B, config: EngineConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn compress(&self, input: &InputFile, progress: &mut Progress<'_>) -> Result<Blob> {
        compress_document(&self.backend, input, progress)
    }

    pub fn split(&self, input: &InputFile, progress: &mut Progress<'_>) -> Result<Vec<Blob>> {
        split_document(&self.backend, input, progress)
    }

    /// Copy a zero-based page selection into a single document
    pub fn extract_pages(
        &self,
        input: &InputFile,
        pages: &[usize],
        progress: &mut Progress<'_>,
    ) -> Result<Blob> {
        extract_pages(&self.backend, input, pages, progress)
    }

    pub fn merge(&self, inputs: &[InputFile], progress: &mut Progress<'_>) -> Result<Blob> {
        merge_documents(&self.backend, inputs, progress)
    }

    pub fn rotate(
        &self,
        input: &InputFile,
        degrees: i32,
        pages: Option<&[usize]>,
        progress: &mut Progress<'_>,
    ) -> Result<Blob> {
        rotate_pages(&self.backend, input, degrees, pages, progress)
    }

    pub fn watermark(
        &self,
        input: &InputFile,
        text: &str,
        options: &WatermarkOptions,
        progress: &mut Progress<'_>,
    ) -> Result<Blob> {
        watermark_document(&self.backend, &self.config, input, text, options, progress)
    }

    pub fn extract_text(&self, input: &InputFile, progress: &mut Progress<'_>) -> Result<String>
    where
        B::Document: TextLayer,
    {
        extract_text(&self.backend, input, progress)
    }

    /// Render every page at the configured scale
    pub fn rasterize<R: Rasterizer>(
        &self,
        rasterizer: &R,
        input: &InputFile,
        progress: &mut Progress<'_>,
    ) -> Result<Vec<PageImage>> {
        rasterize_document(rasterizer, input, self.config.render_scale, progress)
    }
}
