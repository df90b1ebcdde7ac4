//! Conversion between JavaScript file objects and core files
//!
//! A file crosses the boundary as `{ name: string, bytes: Uint8Array,
//! mime?: string }`.

use js_sys::{Array, Object, Reflect, Uint8Array};
use pdftools_core::input::{MIME_PDF, MIME_PNG, MIME_TEXT, MIME_ZIP};
use pdftools_core::{Blob, ExportFile, InputFile, PdfToolsError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub fn js_error(err: PdfToolsError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn get(obj: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    Reflect::get(obj, &JsValue::from_str(key))
}

fn read_file(value: &JsValue) -> Result<(String, String, Vec<u8>), JsValue> {
    let name = get(value, "name")?
        .as_string()
        .ok_or_else(|| JsValue::from_str("file.name must be a string"))?;
    let bytes = get(value, "bytes")?
        .dyn_into::<Uint8Array>()
        .map_err(|_| JsValue::from_str(&format!("{}: bytes must be a Uint8Array", name)))?
        .to_vec();
    let mime = get(value, "mime")?
        .as_string()
        .unwrap_or_else(|| MIME_PDF.to_string());
    Ok((name, mime, bytes))
}

/// Read an array of file objects as operation inputs
pub fn input_files(files: &Array) -> Result<Vec<InputFile>, JsValue> {
    files
        .iter()
        .map(|value| {
            let (name, mime, bytes) = read_file(&value)?;
            Ok(InputFile::new(name, bytes).with_mime(mime))
        })
        .collect()
}

/// Read an array of file objects as finished results
pub fn export_files(files: &Array) -> Result<Vec<ExportFile>, JsValue> {
    files
        .iter()
        .map(|value| {
            let (name, mime, bytes) = read_file(&value)?;
            Ok(ExportFile::new(name, blob_for(&mime, bytes)))
        })
        .collect()
}

fn blob_for(mime: &str, bytes: Vec<u8>) -> Blob {
    let mime = match mime {
        MIME_PNG => MIME_PNG,
        MIME_ZIP => MIME_ZIP,
        MIME_TEXT => MIME_TEXT,
        _ => MIME_PDF,
    };
    Blob { mime, bytes }
}

pub fn file_to_js(file: &ExportFile) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"name".into(), &JsValue::from_str(&file.name))?;
    Reflect::set(&obj, &"mime".into(), &JsValue::from_str(file.blob.mime))?;
    Reflect::set(
        &obj,
        &"bytes".into(),
        &Uint8Array::from(file.blob.bytes.as_slice()),
    )?;
    Ok(obj.into())
}

pub fn files_to_js(files: &[ExportFile]) -> Result<Array, JsValue> {
    let out = Array::new();
    for file in files {
        out.push(&file_to_js(file)?);
    }
    Ok(out)
}
