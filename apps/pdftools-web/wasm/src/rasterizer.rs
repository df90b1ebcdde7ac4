//! Host-supplied renderer
//!
//! The page renderer is a JavaScript object with synchronous methods, for
//! example a PDFium build compiled to WebAssembly:
//!
//! ```javascript
//! const renderer = {
//!   load(bytes) { return doc },            // doc.numPages: number
//!   canAllocate(width, height) { return true },  // optional
//! };
//! doc.getViewport(index, scale)            // -> { width, height, rotation? }
//! doc.render(index, width, height, scale)  // -> Uint8Array | Uint8ClampedArray (RGBA)
//! ```

use js_sys::{Array, Function, Reflect, Uint8Array};
use pdftools_core::{
    PdfToolsError, PixelSurface, RasterDocument, Rasterizer, Result, Viewport,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Call `target[name](...args)`
fn call(target: &JsValue, name: &str, args: &[JsValue]) -> std::result::Result<JsValue, String> {
    let method = Reflect::get(target, &JsValue::from_str(name))
        .map_err(|e| format!("{} lookup failed: {:?}", name, e))?;
    let method = method
        .dyn_ref::<Function>()
        .ok_or_else(|| format!("{} is not a function", name))?;

    let arguments = Array::new();
    for arg in args {
        arguments.push(arg);
    }
    method
        .apply(target, &arguments)
        .map_err(|e| format!("{} failed: {:?}", name, e))
}

fn number(obj: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
}

pub struct JsRasterizer {
    renderer: JsValue,
}

impl JsRasterizer {
    pub fn new(renderer: JsValue) -> std::result::Result<Self, JsValue> {
        if renderer.is_undefined() || renderer.is_null() {
            return Err(JsValue::from_str("A renderer is required to convert pages"));
        }
        Ok(Self { renderer })
    }
}

pub struct JsRasterDocument {
    handle: JsValue,
    pages: usize,
}

impl Rasterizer for JsRasterizer {
    type Document = JsRasterDocument;

    fn load(&self, bytes: &[u8]) -> Result<JsRasterDocument> {
        let data: JsValue = Uint8Array::from(bytes).into();
        let handle = call(&self.renderer, "load", &[data]).map_err(PdfToolsError::Parse)?;
        let pages = number(&handle, "numPages")
            .ok_or_else(|| PdfToolsError::Parse("renderer document has no numPages".into()))?;

        Ok(JsRasterDocument {
            handle,
            pages: pages.max(0.0) as usize,
        })
    }

    fn acquire_surface(&self, viewport: &Viewport) -> Option<PixelSurface> {
        let has_check = Reflect::get(&self.renderer, &JsValue::from_str("canAllocate"))
            .map(|f| f.is_function())
            .unwrap_or(false);
        if has_check {
            let allowed = call(
                &self.renderer,
                "canAllocate",
                &[
                    JsValue::from(viewport.width),
                    JsValue::from(viewport.height),
                ],
            )
            .map(|v| v.is_truthy())
            .unwrap_or(false);
            if !allowed {
                return None;
            }
        }
        PixelSurface::new(viewport.width, viewport.height)
    }
}

impl RasterDocument for JsRasterDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn viewport(&self, index: usize, scale: f64) -> Result<Viewport> {
        let render_error = |message: String| PdfToolsError::Render {
            page: index,
            message,
        };
        let value = call(
            &self.handle,
            "getViewport",
            &[JsValue::from(index as u32), JsValue::from_f64(scale)],
        )
        .map_err(render_error)?;

        let width = number(&value, "width")
            .ok_or_else(|| render_error("viewport has no width".into()))?;
        let height = number(&value, "height")
            .ok_or_else(|| render_error("viewport has no height".into()))?;

        Ok(Viewport {
            width: width.ceil().max(0.0) as u32,
            height: height.ceil().max(0.0) as u32,
            scale,
            rotation: number(&value, "rotation").unwrap_or(0.0) as i32,
        })
    }

    fn render(
        &mut self,
        index: usize,
        viewport: &Viewport,
        surface: &mut PixelSurface,
    ) -> Result<()> {
        let pixels = call(
            &self.handle,
            "render",
            &[
                JsValue::from(index as u32),
                JsValue::from(viewport.width),
                JsValue::from(viewport.height),
                JsValue::from_f64(viewport.scale),
            ],
        )
        .map_err(|message| PdfToolsError::Render {
            page: index,
            message,
        })?;

        surface.copy_from(&Uint8Array::new(&pixels).to_vec())
    }
}
