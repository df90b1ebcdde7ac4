use std::fmt;

use thiserror::Error;

/// Which pipeline produced a wrapped failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Compress,
    Split,
    Merge,
    Rotate,
    Watermark,
    ExtractText,
    Rasterize,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            OperationKind::Compress => "Failed to compress PDF",
            OperationKind::Split => "Failed to split PDF",
            OperationKind::Merge => "Failed to merge PDFs",
            OperationKind::Rotate => "Failed to rotate pages",
            OperationKind::Watermark => "Failed to add watermark",
            OperationKind::ExtractText => "Failed to extract text",
            OperationKind::Rasterize => "Failed to convert pages to images",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug)]
pub enum PdfToolsError {
    #[error("Failed to read input: {0}")]
    Read(String),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Failed to save {name}: {message}")]
    Delivery { name: String, message: String },

    #[error("{kind}: {source}")]
    Operation {
        kind: OperationKind,
        #[source]
        source: Box<PdfToolsError>,
    },
}

impl PdfToolsError {
    /// Wrap a stage failure in the operation that was running.
    pub fn during(kind: OperationKind) -> impl FnOnce(PdfToolsError) -> PdfToolsError {
        move |source| PdfToolsError::Operation {
            kind,
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping any operation wrappers.
    pub fn root_cause(&self) -> &PdfToolsError {
        match self {
            PdfToolsError::Operation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<lopdf::Error> for PdfToolsError {
    fn from(e: lopdf::Error) -> Self {
        PdfToolsError::Parse(e.to_string())
    }
}

impl From<zip::result::ZipError> for PdfToolsError {
    fn from(e: zip::result::ZipError) -> Self {
        PdfToolsError::Archive(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_message_embeds_cause() {
        let err = PdfToolsError::during(OperationKind::Compress)(PdfToolsError::Parse(
            "bad xref".into(),
        ));
        assert_eq!(
            err.to_string(),
            "Failed to compress PDF: Failed to parse PDF: bad xref"
        );
    }

    #[test]
    fn test_root_cause_skips_wrappers() {
        let inner = PdfToolsError::Serialization("disk full".into());
        let err = PdfToolsError::during(OperationKind::Merge)(inner);
        assert!(matches!(err.root_cause(), PdfToolsError::Serialization(_)));
    }
}
