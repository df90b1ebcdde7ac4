//! Sequential browser downloads
//!
//! Browsers throttle or drop downloads triggered in a tight loop, so files
//! are handed over one at a time with a pause between them.

use std::time::Duration;

use js_sys::{Array, Promise, Uint8Array};
use pdftools_core::{DownloadScheduler, DownloadTarget, ExportFile, PdfToolsError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, Url, Window};

/// How long an object URL outlives the click that started its download
pub const REVOKE_DELAY: Duration = Duration::from_secs(10);

/// Saves files by clicking a temporary `<a download>` link
pub struct BrowserDownloads {
    window: Window,
    document: Document,
}

impl BrowserDownloads {
    pub fn new(window: &Window) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        Ok(Self {
            window: window.clone(),
            document,
        })
    }

    /// Start the download and return the object URL backing it. The URL is
    /// revoked after [`REVOKE_DELAY`], once the browser has picked it up.
    pub fn trigger(&self, file: &ExportFile) -> Result<String, JsValue> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(file.blob.bytes.as_slice()));
        let options = BlobPropertyBag::new();
        options.set_type(file.blob.mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

        let url = Url::create_object_url_with_blob(&blob)?;
        let anchor: HtmlAnchorElement = self
            .document
            .create_element("a")?
            .dyn_into()
            .map_err(|_| JsValue::from_str("Failed to create download link"))?;
        anchor.set_href(&url);
        anchor.set_download(&file.name);
        anchor.click();

        let pending = url.clone();
        let revoke = Closure::once_into_js(move || {
            let _ = Url::revoke_object_url(&pending);
        });
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                revoke.unchecked_ref(),
                millis(REVOKE_DELAY),
            )?;
        Ok(url)
    }
}

impl DownloadTarget for BrowserDownloads {
    fn deliver(&mut self, file: &ExportFile) -> pdftools_core::Result<()> {
        self.trigger(file).map(|_| ()).map_err(|e| PdfToolsError::Delivery {
            name: file.name.clone(),
            message: format!("{:?}", e),
        })
    }
}

fn millis(delay: Duration) -> i32 {
    delay.as_millis().min(i32::MAX as u128) as i32
}

/// Resolve after `delay` using `setTimeout`
async fn sleep(window: &Window, delay: Duration) -> Result<(), JsValue> {
    let timeout = millis(delay);
    let promise = Promise::new(&mut |resolve, _reject| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout);
    });
    JsFuture::from(promise).await.map(|_| ())
}

/// Deliver every file in order, pausing between files as the scheduler
/// dictates. Returns the number of files handed to the browser.
pub async fn deliver_all(files: &[ExportFile], scheduler: DownloadScheduler) -> Result<usize, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
    let mut target = BrowserDownloads::new(&window)?;

    for (index, file) in files.iter().enumerate() {
        let pause = scheduler.delay_before(index);
        if !pause.is_zero() {
            sleep(&window, pause).await?;
        }
        target
            .deliver(file)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
    }
    Ok(files.len())
}


#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use pdftools_core::Blob;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_object_url_survives_the_click() {
        let window = web_sys::window().unwrap();
        let downloads = BrowserDownloads::new(&window).unwrap();
        let file = ExportFile::new("a.pdf", Blob::pdf(b"%PDF-1.7".to_vec()));

        let url = downloads.trigger(&file).unwrap();
        assert!(url.starts_with("blob:"));

        // Still resolvable after the click returns
        sleep(&window, Duration::from_millis(50)).await.unwrap();
        let response = JsFuture::from(window.fetch_with_str(&url)).await;
        assert!(response.is_ok());
    }
}
