//! Test documents built directly with lopdf

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::document::{LopdfBackend, PdfBackend};
use crate::error::{PdfToolsError, Result};
use crate::raster::{PixelSurface, RasterDocument, Rasterizer, Viewport};
use crate::DocumentModel;

#[derive(Debug, Clone, Copy)]
pub struct TestPage {
    pub width: f64,
    pub height: f64,
    pub rotate: Option<i64>,
}

impl TestPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotate: None,
        }
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

/// Create a simple PDF with N Letter pages, each showing `{prefix}-Page-{n}`
pub fn create_test_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    let pages: Vec<TestPage> = (0..num_pages)
        .map(|_| TestPage::new(612.0, 792.0))
        .collect();
    create_test_pdf_with_pages(&pages, prefix)
}

/// Create a PDF with the given page sizes. The font resource and the Letter
/// MediaBox live on the page tree root, so pages inherit them.
pub fn create_test_pdf_with_pages(pages: &[TestPage], prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut page_ids = Vec::new();
    for (i, test_page) in pages.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{}-Page-{}", prefix, i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        };
        if (test_page.width, test_page.height) != (612.0, 792.0) {
            page.set(
                "MediaBox",
                vec![
                    0.into(),
                    0.into(),
                    Object::Real(test_page.width as f32),
                    Object::Real(test_page.height as f32),
                ],
            );
        }
        if let Some(rotate) = test_page.rotate {
            page.set("Rotate", Object::Integer(rotate));
        }
        page_ids.push(doc.add_object(page));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => pages.len() as i64,
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        },
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Page texts of a document, in page order
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    use crate::document::TextLayer;

    let doc = LopdfBackend.load(bytes).unwrap();
    (0..doc.page_count())
        .map(|i| doc.text_fragments(i).unwrap().join(" "))
        .collect()
}

/// Renderer that paints every page a flat gray, optionally refusing
/// surfaces for some pages or failing to render others.
#[derive(Debug, Default)]
pub struct FakeRasterizer {
    /// Viewport widths for which no surface is handed out
    pub no_surface_for: Vec<usize>,
    pub fail_on: Vec<usize>,
}

pub struct FakeRasterDocument {
    doc: crate::document::LopdfDocument,
    fail_on: Vec<usize>,
}

impl Rasterizer for FakeRasterizer {
    type Document = FakeRasterDocument;

    fn load(&self, bytes: &[u8]) -> Result<FakeRasterDocument> {
        Ok(FakeRasterDocument {
            doc: LopdfBackend.load(bytes)?,
            fail_on: self.fail_on.clone(),
        })
    }

    fn acquire_surface(&self, viewport: &Viewport) -> Option<PixelSurface> {
        // Keyed on viewport width; the surface request carries no page index.
        if self.no_surface_for.contains(&(viewport.width as usize)) {
            return None;
        }
        PixelSurface::new(viewport.width, viewport.height)
    }
}

impl RasterDocument for FakeRasterDocument {
    fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    fn viewport(&self, index: usize, scale: f64) -> Result<Viewport> {
        Ok(Viewport::for_page(&self.doc.page_info(index)?, scale))
    }

    fn render(
        &mut self,
        index: usize,
        _viewport: &Viewport,
        surface: &mut PixelSurface,
    ) -> Result<()> {
        if self.fail_on.contains(&index) {
            return Err(PdfToolsError::Render {
                page: index,
                message: "renderer crashed".into(),
            });
        }
        surface.fill([128, 128, 128, 255]);
        Ok(())
    }
}
