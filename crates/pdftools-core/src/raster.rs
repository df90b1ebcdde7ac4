//! Rasterization adapter
//!
//! The renderer itself lives outside this crate. A [`Rasterizer`] loads a
//! document, reports the viewport of a page at a scale, and paints a page
//! into a [`PixelSurface`]; this module owns surface allocation limits and
//! PNG encoding.

use png::{BitDepth, ColorType, Encoder};

use crate::document::PageInfo;
use crate::error::{PdfToolsError, Result};

/// Largest edge a surface may have, matching common canvas limits
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Largest pixel area a surface may have
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// Pixel dimensions of a page rendered at `scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    /// Page rotation already applied to `width`/`height`
    pub rotation: i32,
}

impl Viewport {
    /// Viewport for a page, swapping axes for quarter-turn rotations
    pub fn for_page(page: &PageInfo, scale: f64) -> Self {
        let (w, h) = if page.rotation % 180 == 0 {
            (page.width, page.height)
        } else {
            (page.height, page.width)
        };
        Self {
            width: (w * scale).ceil().max(0.0) as u32,
            height: (h * scale).ceil().max(0.0) as u32,
            scale,
            rotation: page.rotation,
        }
    }
}

/// An RGBA8 bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelSurface {
    /// Allocate a transparent surface, or `None` if the dimensions are zero
    /// or beyond the surface limits.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
            return None;
        }
        let area = width as u64 * height as u64;
        if area > MAX_SURFACE_AREA {
            return None;
        }
        Some(Self {
            width,
            height,
            data: vec![0; area as usize * 4],
        })
    }

    /// Wrap existing RGBA8 pixels
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(PdfToolsError::InvalidInput(format!(
                "expected {} bytes of RGBA data for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite the surface with `data`, which must be exactly the same size
    pub fn copy_from(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.data.len() {
            return Err(PdfToolsError::InvalidInput(format!(
                "pixel buffer is {} bytes, surface needs {}",
                data.len(),
                self.data.len()
            )));
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| PdfToolsError::Serialization(e.to_string()))?;
            writer
                .write_image_data(&self.data)
                .map_err(|e| PdfToolsError::Serialization(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| PdfToolsError::Serialization(e.to_string()))?;
        }
        Ok(out)
    }
}

/// A document opened by a renderer
pub trait RasterDocument {
    fn page_count(&self) -> usize;

    fn viewport(&self, index: usize, scale: f64) -> Result<Viewport>;

    /// Paint page `index` into `surface`, which matches `viewport`
    fn render(&mut self, index: usize, viewport: &Viewport, surface: &mut PixelSurface)
        -> Result<()>;
}

/// Rendering capability supplied by the host
pub trait Rasterizer {
    type Document: RasterDocument;

    fn load(&self, bytes: &[u8]) -> Result<Self::Document>;

    /// Acquire a drawing surface for `viewport`; `None` when the host cannot
    /// provide one.
    fn acquire_surface(&self, viewport: &Viewport) -> Option<PixelSurface> {
        PixelSurface::new(viewport.width, viewport.height)
    }
}
