//! Document model adapter
//!
//! Pipelines only talk to a PDF library through [`PdfBackend`] and
//! [`DocumentModel`]: load, enumerate pages, copy pages between documents,
//! add a page, set rotation, embed a font, draw text, and serialize.
//! [`LopdfBackend`] implements that surface on top of `lopdf`.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::color::Rgb;
use crate::error::{PdfToolsError, Result};
use crate::geometry::rotated_text_matrix;

/// US Letter, used when a page carries no MediaBox at all
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page attributes that may live on an ancestor in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Geometry of a single page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
    /// Rotation in degrees, normalized to 0..360
    pub rotation: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveOptions {
    pub use_object_streams: bool,
    /// Insert a blank page when the document would otherwise have none
    pub add_default_page: bool,
    /// Drop unreachable objects and deflate streams before writing
    pub optimize: bool,
}

impl SaveOptions {
    /// Options used by the compress pipeline
    pub fn compact() -> Self {
        Self {
            use_object_streams: false,
            add_default_page: false,
            optimize: true,
        }
    }
}

/// The standard 14 fonts usable without embedding font programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
        }
    }

    /// Map a font name to a standard font, defaulting to Helvetica
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let bold = lower.contains("bold");
        if lower.contains("times") || lower == "serif" {
            if bold {
                StandardFont::TimesBold
            } else {
                StandardFont::TimesRoman
            }
        } else if lower.contains("courier") || lower.contains("mono") {
            if bold {
                StandardFont::CourierBold
            } else {
                StandardFont::Courier
            }
        } else if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }
}

/// A single run of text to paint onto a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw<'a> {
    pub text: &'a str,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Counter-clockwise rotation in degrees around `(x, y)`
    pub rotation: f64,
    pub color: Rgb,
    /// Fill opacity, 0.0..=1.0
    pub opacity: f32,
}

/// Opens and creates documents
pub trait PdfBackend: Send + Sync {
    type Document: DocumentModel;

    fn load(&self, bytes: &[u8]) -> Result<Self::Document>;

    fn create(&self) -> Self::Document;
}

/// Capability surface of a loaded document. Page indices are zero-based.
pub trait DocumentModel: Sized {
    /// A page copied into this document but not yet placed in its page tree
    type PageRef;
    type FontRef: Copy;

    fn page_count(&self) -> usize;

    fn page_info(&self, index: usize) -> Result<PageInfo>;

    /// Copy pages of `source` (with everything they reference) into `self`.
    fn copy_pages(&mut self, source: &Self, indices: &[usize]) -> Result<Vec<Self::PageRef>>;

    /// Append a copied page to the end of the page tree
    fn add_page(&mut self, page: Self::PageRef) -> Result<()>;

    fn set_rotation(&mut self, index: usize, degrees: i32) -> Result<()>;

    fn embed_font(&mut self, font: StandardFont) -> Result<Self::FontRef>;

    fn draw_text(&mut self, index: usize, font: Self::FontRef, draw: &TextDraw<'_>) -> Result<()>;

    fn save(&mut self, options: SaveOptions) -> Result<Vec<u8>>;
}

/// Text-layer capability: the recognized text fragments of a page, in the
/// order the backend produces them. Whitespace-only fragments are dropped.
pub trait TextLayer {
    fn text_fragments(&self, index: usize) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;

    fn load(&self, bytes: &[u8]) -> Result<LopdfDocument> {
        let inner =
            Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))?;
        Ok(LopdfDocument { inner })
    }

    fn create(&self) -> LopdfDocument {
        let mut inner = Document::with_version("1.7");
        let pages_id = inner.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(Vec::new()),
            "Count" => 0,
        });
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        inner.trailer.set("Root", Object::Reference(catalog_id));
        LopdfDocument { inner }
    }
}

/// A document held as a `lopdf` object graph
#[derive(Debug, Clone)]
pub struct LopdfDocument {
    inner: Document,
}

impl LopdfDocument {
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().values().copied().collect()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let pages = self.page_ids();
        pages
            .get(index)
            .copied()
            .ok_or(PdfToolsError::PageOutOfRange {
                index,
                count: pages.len(),
            })
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary> {
        Ok(self.inner.get_object(page_id)?.as_dict()?)
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        Ok(self.inner.get_object_mut(page_id)?.as_dict_mut()?)
    }

    /// Look up `key` on the page, then up its Parent chain
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = page_id;
        // Page trees are shallow; the bound guards against Parent cycles
        for _ in 0..64 {
            let dict = self.inner.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.inner.get_object(*id).unwrap_or(obj),
            other => other,
        }
    }

    fn pages_root(&self) -> Result<ObjectId> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| PdfToolsError::Parse("No Root in trailer".into()))?;

        self.inner
            .get_object(catalog_id)
            .and_then(Object::as_dict)
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|_| PdfToolsError::Parse("Catalog has no Pages reference".into()))
    }

    /// Resources dictionary of a page, materialized on the page itself when
    /// it was inherited or missing.
    fn resources_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        let inherited = self.inherited(page_id, b"Resources");
        let indirect = {
            let page = self.page_dict_mut(page_id)?;
            match inherited {
                Some(Object::Reference(id)) => {
                    page.set("Resources", Object::Reference(id));
                    Some(id)
                }
                Some(Object::Dictionary(dict)) => {
                    page.set("Resources", Object::Dictionary(dict));
                    None
                }
                _ => {
                    page.set("Resources", Object::Dictionary(Dictionary::new()));
                    None
                }
            }
        };

        let resources = match indirect {
            Some(id) => self.inner.get_object_mut(id)?,
            None => self.page_dict_mut(page_id)?.get_mut(b"Resources")?,
        };
        Ok(resources.as_dict_mut()?)
    }

    /// Add `value` under a fresh name in a resource category (`/Font`,
    /// `/ExtGState`) of the page and return that name.
    fn register_resource(
        &mut self,
        page_id: ObjectId,
        category: &[u8],
        prefix: &str,
        value: Object,
    ) -> Result<Vec<u8>> {
        let indirect = {
            let resources = self.resources_mut(page_id)?;
            match resources.get(category) {
                Ok(Object::Reference(id)) => Some(*id),
                Ok(Object::Dictionary(_)) => None,
                _ => {
                    resources.set(category, Object::Dictionary(Dictionary::new()));
                    None
                }
            }
        };

        let entries = match indirect {
            Some(id) => self.inner.get_object_mut(id)?.as_dict_mut()?,
            None => self.resources_mut(page_id)?.get_mut(category)?.as_dict_mut()?,
        };

        let mut n = 1;
        let name = loop {
            let candidate = format!("{}{}", prefix, n);
            if !entries.has(candidate.as_bytes()) {
                break candidate.into_bytes();
            }
            n += 1;
        };
        entries.set(name.clone(), value);
        Ok(name)
    }

    /// Append a content stream to a page. Existing content is wrapped in
    /// `q ... Q` so its graphics state cannot leak into the new stream.
    fn append_content(&mut self, page_id: ObjectId, content: Vec<u8>) -> Result<()> {
        let existing = match self.page_dict(page_id)?.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(obj @ Object::Reference(_)) => vec![obj.clone()],
            _ => Vec::new(),
        };

        let mut contents = Vec::with_capacity(existing.len() + 2);
        if existing.is_empty() {
            let id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), content));
            contents.push(Object::Reference(id));
        } else {
            let open = self
                .inner
                .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let mut tail = b"\nQ\n".to_vec();
            tail.extend_from_slice(&content);
            let close = self.inner.add_object(Stream::new(Dictionary::new(), tail));
            contents.push(Object::Reference(open));
            contents.extend(existing);
            contents.push(Object::Reference(close));
        }

        self.page_dict_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }
}

impl DocumentModel for LopdfDocument {
    type PageRef = ObjectId;
    type FontRef = ObjectId;

    fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    fn page_info(&self, index: usize) -> Result<PageInfo> {
        let page_id = self.page_id(index)?;

        let media_box = match self.inherited(page_id, b"MediaBox") {
            Some(obj) => match self.resolve(&obj) {
                Object::Array(values) => parse_box_array(values)?,
                _ => DEFAULT_MEDIA_BOX,
            },
            None => DEFAULT_MEDIA_BOX,
        };

        let rotation = self
            .inherited(page_id, b"Rotate")
            .and_then(|obj| self.resolve(&obj).as_i64().ok())
            .map(|angle| normalize_rotation(angle as i32))
            .unwrap_or(0);

        Ok(PageInfo {
            width: (media_box[2] - media_box[0]).abs(),
            height: (media_box[3] - media_box[1]).abs(),
            rotation,
        })
    }

    fn copy_pages(&mut self, source: &Self, indices: &[usize]) -> Result<Vec<ObjectId>> {
        let source_pages = source.page_ids();
        let mut id_map: BTreeMap<ObjectId, ObjectId> = BTreeMap::new();
        let mut next = self.inner.max_id;
        let mut copied = Vec::with_capacity(indices.len());

        for &index in indices {
            let page_id =
                *source_pages
                    .get(index)
                    .ok_or(PdfToolsError::PageOutOfRange {
                        index,
                        count: source_pages.len(),
                    })?;

            // Detach the page from its tree, keeping inherited attributes
            let mut page = source.page_dict(page_id)?.clone();
            for key in INHERITABLE {
                if !page.has(key) {
                    if let Some(value) = source.inherited(page_id, key) {
                        page.set(key, value);
                    }
                }
            }
            page.remove(b"Parent");

            next += 1;
            let new_page_id = (next, 0);
            id_map.insert(page_id, new_page_id);

            let mut pending = Vec::new();
            collect_references(&Object::Dictionary(page.clone()), &mut pending);
            let mut fresh = Vec::new();

            while let Some(old_id) = pending.pop() {
                if id_map.contains_key(&old_id) {
                    continue;
                }
                let Ok(object) = source.inner.get_object(old_id) else {
                    continue;
                };
                if is_page_tree_node(object) {
                    continue;
                }
                next += 1;
                id_map.insert(old_id, (next, 0));
                fresh.push(old_id);
                collect_references(object, &mut pending);
            }

            for old_id in fresh {
                let mut object = source.inner.get_object(old_id)?.clone();
                remap_references(&mut object, &id_map);
                self.inner.objects.insert(id_map[&old_id], object);
            }

            let mut page = Object::Dictionary(page);
            remap_references(&mut page, &id_map);
            self.inner.objects.insert(new_page_id, page);
            copied.push(new_page_id);
        }

        self.inner.max_id = next;
        Ok(copied)
    }

    fn add_page(&mut self, page_id: ObjectId) -> Result<()> {
        let pages_id = self.pages_root()?;

        self.page_dict_mut(page_id)?
            .set("Parent", Object::Reference(pages_id));

        let pages = self.page_dict_mut(pages_id)?;
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => pages.set("Kids", Object::Array(vec![Object::Reference(page_id)])),
        }
        pages.set("Count", Object::Integer(count + 1));
        Ok(())
    }

    fn set_rotation(&mut self, index: usize, degrees: i32) -> Result<()> {
        let page_id = self.page_id(index)?;
        self.page_dict_mut(page_id)?
            .set("Rotate", Object::Integer(degrees as i64));
        Ok(())
    }

    fn embed_font(&mut self, font: StandardFont) -> Result<ObjectId> {
        Ok(self.inner.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }))
    }

    fn draw_text(&mut self, index: usize, font: ObjectId, draw: &TextDraw<'_>) -> Result<()> {
        let page_id = self.page_id(index)?;
        let opacity = draw.opacity.clamp(0.0, 1.0);

        let font_name = self.register_resource(page_id, b"Font", "PTF", Object::Reference(font))?;
        let gs_id = self.inner.add_object(dictionary! {
            "Type" => "ExtGState",
            "CA" => Object::Real(opacity),
            "ca" => Object::Real(opacity),
        });
        let gs_name =
            self.register_resource(page_id, b"ExtGState", "PTGS", Object::Reference(gs_id))?;

        let [r, g, b] = draw.color.components();
        let matrix = rotated_text_matrix(draw.x, draw.y, draw.rotation);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("gs", vec![Object::Name(gs_name)]),
                Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(font_name), Object::Real(draw.size as f32)],
                ),
                Operation::new(
                    "Tm",
                    matrix.iter().map(|v| Object::Real(*v as f32)).collect(),
                ),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        encode_win_ansi(draw.text),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        let bytes = content
            .encode()
            .map_err(|e| PdfToolsError::Serialization(e.to_string()))?;

        self.append_content(page_id, bytes)
    }

    fn save(&mut self, options: SaveOptions) -> Result<Vec<u8>> {
        if options.add_default_page && self.page_count() == 0 {
            let pages_id = self.pages_root()?;
            let blank = self.inner.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => DEFAULT_MEDIA_BOX.iter().map(|v| Object::Real(*v as f32)).collect::<Vec<_>>(),
            });
            self.add_page(blank)?;
        }
        if options.use_object_streams {
            tracing::debug!("object streams requested; writing a classic xref table instead");
        }
        if options.optimize {
            self.inner.prune_objects();
            self.inner.compress();
        }

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfToolsError::Serialization(e.to_string()))?;
        Ok(buffer)
    }
}

impl TextLayer for LopdfDocument {
    fn text_fragments(&self, index: usize) -> Result<Vec<String>> {
        let page_id = self.page_id(index)?;
        let raw = self.inner.get_page_content(page_id)?;
        let content = Content::decode(&raw)?;

        let mut fragments = Vec::new();
        for op in &content.operations {
            let text = match op.operator.as_str() {
                "Tj" | "'" | "\"" => match op.operands.last() {
                    Some(Object::String(bytes, _)) => decode_pdf_string(bytes),
                    _ => continue,
                },
                "TJ" => match op.operands.first() {
                    Some(Object::Array(parts)) => decode_text_array(parts),
                    _ => continue,
                },
                _ => continue,
            };
            if !text.trim().is_empty() {
                fragments.push(text);
            }
        }
        Ok(fragments)
    }
}

/// Parse a box array [x1, y1, x2, y2]
fn parse_box_array(array: &[Object]) -> Result<[f64; 4]> {
    if array.len() != 4 {
        return Err(PdfToolsError::Parse(
            "MediaBox must have 4 elements".to_string(),
        ));
    }

    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => {
                return Err(PdfToolsError::Parse(format!(
                    "MediaBox element {} is not a number",
                    i
                )))
            }
        };
    }

    Ok(result)
}

/// Normalize rotation to 0, 90, 180, or 270
pub fn normalize_rotation(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

fn is_page_tree_node(object: &Object) -> bool {
    match object.as_dict().and_then(|d| d.get(b"Type")) {
        Ok(Object::Name(name)) => name == b"Page" || name == b"Pages",
        _ => false,
    }
}

/// Push every reference reachable from `obj` without crossing `/Parent`
fn collect_references(obj: &Object, out: &mut Vec<ObjectId>) {
    match obj {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|o| collect_references(o, out)),
        Object::Dictionary(dict) => {
            for (key, value) in dict.iter() {
                if key != b"Parent" {
                    collect_references(value, out);
                }
            }
        }
        Object::Stream(stream) => {
            for (key, value) in stream.dict.iter() {
                if key != b"Parent" {
                    collect_references(value, out);
                }
            }
        }
        _ => {}
    }
}

/// Rewrite references through `map`; anything not copied becomes null
fn remap_references(obj: &mut Object, map: &BTreeMap<ObjectId, ObjectId>) {
    match obj {
        Object::Reference(id) => {
            *obj = match map.get(id) {
                Some(new_id) => Object::Reference(*new_id),
                None => Object::Null,
            };
        }
        Object::Array(items) => items.iter_mut().for_each(|o| remap_references(o, map)),
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                remap_references(value, map);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                remap_references(value, map);
            }
        }
        _ => {}
    }
}

/// Kerning offset (thousandths of an em) wide enough to read as a word gap
const WORD_GAP_OFFSET: f64 = -100.0;

/// Concatenate the strings of a `TJ` array, turning wide negative offsets
/// into spaces.
fn decode_text_array(parts: &[Object]) -> String {
    let mut text = String::new();
    for part in parts {
        match part {
            Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
            Object::Integer(n) if (*n as f64) < WORD_GAP_OFFSET => text.push(' '),
            Object::Real(n) if (*n as f64) < WORD_GAP_OFFSET => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Text strings are UTF-16BE when they carry a BOM, single-byte otherwise
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode for a WinAnsi simple font; characters outside Latin-1 become `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}
