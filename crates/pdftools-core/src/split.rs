//! Split a document into single-page documents, or extract a page selection
//! into one document.
//!
//! Pages are copied into a freshly created document rather than deleted
//! from a clone of the source, so each output only carries the objects its
//! own pages reach.

use crate::document::{DocumentModel, PdfBackend, SaveOptions};
use crate::error::{OperationKind, PdfToolsError, Result};
use crate::input::{Blob, InputFile};
use crate::progress::Progress;

/// One blob per page, in page order. A document without pages yields no
/// blobs.
pub fn split_document<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    progress: &mut Progress<'_>,
) -> Result<Vec<Blob>> {
    split_stages(backend, input, progress).map_err(PdfToolsError::during(OperationKind::Split))
}

fn split_stages<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    progress: &mut Progress<'_>,
) -> Result<Vec<Blob>> {
    let source = backend.load(input.bytes()?)?;
    let count = source.page_count();
    tracing::debug!(file = %input.name, pages = count, "splitting");
    progress.report("Loading document", 10);

    let mut parts = Vec::with_capacity(count);
    for index in 0..count {
        parts.push(Blob::pdf(single_document(backend, &source, &[index])?));
        progress.report_step(
            format!("Extracting page {} of {}", index + 1, count),
            index + 1,
            count,
            10,
            90,
        );
    }

    tracing::info!(file = %input.name, parts = parts.len(), "split complete");
    progress.finish();
    Ok(parts)
}

/// Copy the zero-based `pages` of `input`, in the given order, into one
/// document.
pub fn extract_pages<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    pages: &[usize],
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    if pages.is_empty() {
        return Err(PdfToolsError::InvalidInput("No pages specified".into()));
    }

    extract_stages(backend, input, pages, progress)
        .map_err(PdfToolsError::during(OperationKind::Split))
}

fn extract_stages<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    pages: &[usize],
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    let source = backend.load(input.bytes()?)?;
    tracing::debug!(file = %input.name, selected = pages.len(), "extracting pages");
    progress.report("Loading document", 10);

    let bytes = single_document(backend, &source, pages)?;
    progress.report("Saving document", 90);
    progress.finish();
    Ok(Blob::pdf(bytes))
}

fn single_document<B: PdfBackend>(
    backend: &B,
    source: &B::Document,
    indices: &[usize],
) -> Result<Vec<u8>> {
    let mut doc = backend.create();
    for page in doc.copy_pages(source, indices)? {
        doc.add_page(page)?;
    }
    doc.save(SaveOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LopdfBackend;
    use crate::fixtures::{create_test_pdf, page_texts};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_yields_one_blob_per_page() {
        let input = InputFile::new("doc.pdf", create_test_pdf(4, "Split"));
        let parts = split_document(&LopdfBackend, &input, &mut Progress::none()).unwrap();

        assert_eq!(parts.len(), 4);
        for (i, part) in parts.iter().enumerate() {
            assert_eq!(page_texts(&part.bytes), vec![format!("Split-Page-{}", i + 1)]);
        }
    }

    #[test]
    fn test_split_zero_pages_is_empty() {
        let mut empty = LopdfBackend.create();
        let bytes = empty.save(SaveOptions::default()).unwrap();
        let input = InputFile::new("empty.pdf", bytes);

        let parts = split_document(&LopdfBackend, &input, &mut Progress::none()).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_split_progress_bands() {
        let input = InputFile::new("doc.pdf", create_test_pdf(4, "Split"));
        let mut seen = Vec::new();
        {
            let mut progress = Progress::from_fn(|e| seen.push(e.percent));
            split_document(&LopdfBackend, &input, &mut progress).unwrap();
        }
        assert_eq!(seen, vec![10, 30, 50, 70, 90, 100]);
    }

    #[test]
    fn test_split_invalid_pdf_is_wrapped() {
        let input = InputFile::new("bad.pdf", b"not a pdf".to_vec());
        let err = split_document(&LopdfBackend, &input, &mut Progress::none()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to split PDF"));
    }

    #[test]
    fn test_extract_pages_in_requested_order() {
        let input = InputFile::new("doc.pdf", create_test_pdf(5, "Pick"));
        let blob = extract_pages(&LopdfBackend, &input, &[4, 0, 2], &mut Progress::none()).unwrap();
        assert_eq!(
            page_texts(&blob.bytes),
            vec!["Pick-Page-5", "Pick-Page-1", "Pick-Page-3"]
        );
    }

    #[test]
    fn test_extract_pages_rejects_empty_selection() {
        let input = InputFile::new("doc.pdf", create_test_pdf(2, "Pick"));
        let err = extract_pages(&LopdfBackend, &input, &[], &mut Progress::none()).unwrap_err();
        assert!(matches!(err, PdfToolsError::InvalidInput(_)));
    }

    #[test]
    fn test_extract_pages_out_of_range() {
        let input = InputFile::new("doc.pdf", create_test_pdf(2, "Pick"));
        let err = extract_pages(&LopdfBackend, &input, &[5], &mut Progress::none()).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            PdfToolsError::PageOutOfRange { index: 5, count: 2 }
        ));
    }
}
