//! Input files and output blobs

use std::path::Path;

use crate::error::{PdfToolsError, Result};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_PNG: &str = "image/png";
pub const MIME_ZIP: &str = "application/zip";
pub const MIME_TEXT: &str = "text/plain";

/// A named binary buffer handed to an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub mime: String,
    bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: MIME_PDF.to_string(),
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    /// Read a file from disk, naming it after its file name
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| PdfToolsError::Read(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self::new(name, bytes))
    }

    /// The file's bytes; an empty buffer cannot be interpreted as a document
    pub fn bytes(&self) -> Result<&[u8]> {
        if self.bytes.is_empty() {
            return Err(PdfToolsError::Read(format!("{} is empty", self.name)));
        }
        Ok(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Binary output of an operation, tagged with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self {
            mime: MIME_PDF,
            bytes,
        }
    }

    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            mime: MIME_PNG,
            bytes,
        }
    }

    pub fn zip(bytes: Vec<u8>) -> Self {
        Self {
            mime: MIME_ZIP,
            bytes,
        }
    }

    pub fn text(text: String) -> Self {
        Self {
            mime: MIME_TEXT,
            bytes: text.into_bytes(),
        }
    }

    /// Pick the constructor matching a file extension
    pub fn for_extension(ext: &str, bytes: Vec<u8>) -> Self {
        let mime = match ext.to_ascii_lowercase().as_str() {
            "png" => MIME_PNG,
            "zip" => MIME_ZIP,
            "txt" => MIME_TEXT,
            _ => MIME_PDF,
        };
        Self { mime, bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime {
            MIME_PNG => "png",
            MIME_ZIP => "zip",
            MIME_TEXT => "txt",
            _ => "pdf",
        }
    }
}
