//! Plain-text extraction

use crate::document::{DocumentModel, PdfBackend, TextLayer};
use crate::error::{OperationKind, PdfToolsError, Result};
use crate::input::InputFile;
use crate::progress::Progress;

/// Separator placed between the text of consecutive pages
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Text of every page, fragments joined by single spaces, pages joined by a
/// blank line. Leading and trailing whitespace of the whole result is
/// trimmed.
pub fn extract_text<B>(backend: &B, input: &InputFile, progress: &mut Progress<'_>) -> Result<String>
where
    B: PdfBackend,
    B::Document: TextLayer,
{
    extract_stages(backend, input, progress)
        .map_err(PdfToolsError::during(OperationKind::ExtractText))
}

fn extract_stages<B>(backend: &B, input: &InputFile, progress: &mut Progress<'_>) -> Result<String>
where
    B: PdfBackend,
    B::Document: TextLayer,
{
    let doc = backend.load(input.bytes()?)?;
    let count = doc.page_count();
    tracing::debug!(file = %input.name, pages = count, "extracting text");
    progress.report("Loading document", 20);

    let mut pages = Vec::with_capacity(count);
    for index in 0..count {
        pages.push(doc.text_fragments(index)?.join(" "));
        progress.report_step(
            format!("Reading page {} of {}", index + 1, count),
            index + 1,
            count,
            20,
            100,
        );
    }

    let text = pages.join(PAGE_SEPARATOR).trim().to_string();
    tracing::info!(file = %input.name, chars = text.len(), "text extracted");
    progress.finish();
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LopdfBackend;
    use crate::fixtures::create_test_pdf;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pages_joined_by_blank_line() {
        let input = InputFile::new("doc.pdf", create_test_pdf(3, "Txt"));
        let text = extract_text(&LopdfBackend, &input, &mut Progress::none()).unwrap();
        assert_eq!(text, "Txt-Page-1\n\nTxt-Page-2\n\nTxt-Page-3");
    }

    #[test]
    fn test_progress_ends_at_100() {
        let input = InputFile::new("doc.pdf", create_test_pdf(4, "Txt"));
        let mut seen = Vec::new();
        {
            let mut progress = Progress::from_fn(|e| seen.push(e.percent));
            extract_text(&LopdfBackend, &input, &mut progress).unwrap();
        }
        assert_eq!(seen, vec![20, 40, 60, 80, 100, 100]);
    }

    #[test]
    fn test_garbage_is_wrapped() {
        let input = InputFile::new("bad.pdf", b"not a pdf".to_vec());
        let err = extract_text(&LopdfBackend, &input, &mut Progress::none()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to extract text"));
    }
}
