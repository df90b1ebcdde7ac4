//! WASM bindings for the PDF tools
//!
//! Every operation runs synchronously inside the module on bytes handed
//! over from JavaScript and returns file objects
//! (`{ name, mime, bytes }`) ready to be bundled or downloaded.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PdfToolsApp, bundleFiles, downloadFiles } from './pkg/pdftools_wasm.js';
//!
//! await init();
//!
//! const app = new PdfToolsApp({ render_scale: 2.0 });
//! const onProgress = (stage, percent) => updateUI(stage, percent);
//!
//! const pages = app.splitPdf("report.pdf", bytes, onProgress);
//! await downloadFiles(pages);            // 100 ms apart
//!
//! const archive = bundleFiles(pages, "report_pages.zip");
//! const marked = app.watermarkPdf("report.pdf", bytes, "DRAFT",
//!     { opacity: 0.3, fontSize: 48, color: "#ff0000", position: "top-right" }, onProgress);
//! ```

pub mod downloads;
pub mod files;
pub mod progress;
pub mod rasterizer;

use std::time::Duration;

use js_sys::{Array, Function};
use pdftools_core::{
    bundle, output_name, parse_page_indices, DownloadScheduler, EngineConfig, ExportFile,
    InputFile, PdfTools, WatermarkOptions,
};
use wasm_bindgen::prelude::*;

use crate::files::{export_files, file_to_js, files_to_js, input_files, js_error};
use crate::progress::js_progress;
use crate::rasterizer::JsRasterizer;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get page count from PDF bytes
#[wasm_bindgen(js_name = getPageCount)]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    pdftools_core::get_page_count(bytes)
        .map(|count| count as u32)
        .map_err(js_error)
}

/// Names of the single-page files a split produces
pub fn split_names(input_name: &str, count: usize, ext: &str) -> Vec<String> {
    (1..=count)
        .map(|n| output_name(input_name, &format!("page_{}", n), ext))
        .collect()
}

fn optional<T: serde::de::DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))
}

/// Operation entry points, configured once
#[wasm_bindgen]
pub struct PdfToolsApp {
    tools: PdfTools,
}

#[wasm_bindgen]
impl PdfToolsApp {
    /// `config` is an optional object with `render_scale`,
    /// `watermark_margin`, `watermark_angle`, `download_delay_ms` and
    /// `default_font`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PdfToolsApp, JsValue> {
        let config: EngineConfig = optional(config)?;
        config.validate().map_err(js_error)?;
        Ok(Self {
            tools: PdfTools::new(config),
        })
    }

    #[wasm_bindgen(js_name = compressPdf)]
    pub fn compress_pdf(
        &self,
        name: String,
        bytes: Vec<u8>,
        on_progress: Option<Function>,
    ) -> Result<JsValue, JsValue> {
        let input = InputFile::new(name, bytes);
        let blob = self
            .tools
            .compress(&input, &mut js_progress(on_progress.as_ref()))
            .map_err(js_error)?;
        file_to_js(&ExportFile::new(
            output_name(&input.name, "compressed", "pdf"),
            blob,
        ))
    }

    #[wasm_bindgen(js_name = splitPdf)]
    pub fn split_pdf(
        &self,
        name: String,
        bytes: Vec<u8>,
        on_progress: Option<Function>,
    ) -> Result<Array, JsValue> {
        let input = InputFile::new(name, bytes);
        let parts = self
            .tools
            .split(&input, &mut js_progress(on_progress.as_ref()))
            .map_err(js_error)?;

        let names = split_names(&input.name, parts.len(), "pdf");
        let files: Vec<ExportFile> = names
            .into_iter()
            .zip(parts)
            .map(|(name, blob)| ExportFile::new(name, blob))
            .collect();
        files_to_js(&files)
    }

    /// Copy the pages named by `selection` (e.g. `"1-3, 5"`) into one file
    #[wasm_bindgen(js_name = extractPages)]
    pub fn extract_pages(
        &self,
        name: String,
        bytes: Vec<u8>,
        selection: String,
        on_progress: Option<Function>,
    ) -> Result<JsValue, JsValue> {
        let pages = parse_page_indices(&selection).map_err(js_error)?;
        let input = InputFile::new(name, bytes);
        let blob = self
            .tools
            .extract_pages(&input, &pages, &mut js_progress(on_progress.as_ref()))
            .map_err(js_error)?;
        file_to_js(&ExportFile::new(
            output_name(&input.name, "extracted", "pdf"),
            blob,
        ))
    }

    /// `files` is an array of `{ name, bytes }`, merged in array order
    #[wasm_bindgen(js_name = mergePdfs)]
    pub fn merge_pdfs(&self, files: Array, on_progress: Option<Function>) -> Result<JsValue, JsValue> {
        let inputs = input_files(&files)?;
        let blob = self
            .tools
            .merge(&inputs, &mut js_progress(on_progress.as_ref()))
            .map_err(js_error)?;
        let first = inputs.first().map(|f| f.name.as_str()).unwrap_or("document");
        file_to_js(&ExportFile::new(output_name(first, "merged", "pdf"), blob))
    }

    /// Rotate the pages named by `selection` (all pages when omitted)
    #[wasm_bindgen(js_name = rotatePdf)]
    pub fn rotate_pdf(
        &self,
        name: String,
        bytes: Vec<u8>,
        degrees: i32,
        selection: Option<String>,
        on_progress: Option<Function>,
    ) -> Result<JsValue, JsValue> {
        let pages = selection
            .map(|s| parse_page_indices(&s))
            .transpose()
            .map_err(js_error)?;
        let input = InputFile::new(name, bytes);
        let blob = self
            .tools
            .rotate(
                &input,
                degrees,
                pages.as_deref(),
                &mut js_progress(on_progress.as_ref()),
            )
            .map_err(js_error)?;
        file_to_js(&ExportFile::new(
            output_name(&input.name, "rotated", "pdf"),
            blob,
        ))
    }

    /// `options` is an optional `{ opacity, fontSize, color, position }`
    #[wasm_bindgen(js_name = watermarkPdf)]
    pub fn watermark_pdf(
        &self,
        name: String,
        bytes: Vec<u8>,
        text: String,
        options: JsValue,
        on_progress: Option<Function>,
    ) -> Result<JsValue, JsValue> {
        let options: WatermarkOptions = optional(options)?;
        let input = InputFile::new(name, bytes);
        let blob = self
            .tools
            .watermark(&input, &text, &options, &mut js_progress(on_progress.as_ref()))
            .map_err(js_error)?;
        file_to_js(&ExportFile::new(
            output_name(&input.name, "watermarked", "pdf"),
            blob,
        ))
    }

    #[wasm_bindgen(js_name = extractText)]
    pub fn extract_text(
        &self,
        name: String,
        bytes: Vec<u8>,
        on_progress: Option<Function>,
    ) -> Result<String, JsValue> {
        let input = InputFile::new(name, bytes);
        self.tools
            .extract_text(&input, &mut js_progress(on_progress.as_ref()))
            .map_err(js_error)
    }

    /// Render every page to PNG with the host `renderer`
    #[wasm_bindgen(js_name = rasterizePdf)]
    pub fn rasterize_pdf(
        &self,
        name: String,
        bytes: Vec<u8>,
        renderer: JsValue,
        on_progress: Option<Function>,
    ) -> Result<Array, JsValue> {
        let rasterizer = JsRasterizer::new(renderer)?;
        let input = InputFile::new(name, bytes);
        let images = self
            .tools
            .rasterize(&rasterizer, &input, &mut js_progress(on_progress.as_ref()))
            .map_err(js_error)?;

        let files: Vec<ExportFile> = images
            .into_iter()
            .map(|image| {
                ExportFile::new(
                    output_name(&input.name, &format!("page_{}", image.page + 1), "png"),
                    image.blob,
                )
            })
            .collect();
        files_to_js(&files)
    }

    #[wasm_bindgen(js_name = downloadDelayMs)]
    pub fn download_delay_ms(&self) -> u32 {
        self.tools.config().download_delay_ms.min(u32::MAX as u64) as u32
    }
}

/// One file passes through unchanged; several become a ZIP archive
#[wasm_bindgen(js_name = bundleFiles)]
pub fn bundle_files(files: Array, archive_name: String) -> Result<JsValue, JsValue> {
    let files = export_files(&files)?;
    file_to_js(&bundle(&files, &archive_name).map_err(js_error)?)
}

/// Trigger a browser download for each file, `delayMs` apart (100 ms by
/// default)
#[wasm_bindgen(js_name = downloadFiles)]
pub async fn download_files(files: Array, delay_ms: Option<u32>) -> Result<u32, JsValue> {
    let files = export_files(&files)?;
    let scheduler = match delay_ms {
        Some(ms) => DownloadScheduler::new(Duration::from_millis(ms as u64)),
        None => DownloadScheduler::default(),
    };
    let delivered = downloads::deliver_all(&files, scheduler).await?;
    Ok(delivered as u32)
}
