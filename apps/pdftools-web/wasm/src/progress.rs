//! Bridge from core progress events to a JavaScript callback

use js_sys::Function;
use pdftools_core::Progress;
use wasm_bindgen::JsValue;

/// Reporter that calls `callback(stage, percent)` for every event. Errors
/// thrown by the callback are ignored so a broken UI cannot abort the
/// operation.
pub fn js_progress(callback: Option<&Function>) -> Progress<'_> {
    match callback {
        Some(callback) => Progress::from_fn(move |event| {
            let this = JsValue::null();
            let _ = callback.call2(
                &this,
                &JsValue::from_str(&event.stage),
                &JsValue::from(event.percent),
            );
        }),
        None => Progress::none(),
    }
}
