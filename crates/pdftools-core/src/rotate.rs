//! Set the rotation of some or all pages

use crate::document::{normalize_rotation, DocumentModel, PdfBackend, SaveOptions};
use crate::error::{OperationKind, PdfToolsError, Result};
use crate::input::{Blob, InputFile};
use crate::progress::Progress;

/// Set `/Rotate` to `degrees` on the zero-based `pages`, or on every page
/// when `pages` is `None`. The angle replaces any existing rotation. Indices
/// past the end of the document are ignored.
pub fn rotate_pages<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    degrees: i32,
    pages: Option<&[usize]>,
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    if degrees % 90 != 0 {
        return Err(PdfToolsError::InvalidInput(format!(
            "Rotation must be a multiple of 90 degrees, got {}",
            degrees
        )));
    }

    rotate_stages(backend, input, normalize_rotation(degrees), pages, progress)
        .map_err(PdfToolsError::during(OperationKind::Rotate))
}

fn rotate_stages<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    degrees: i32,
    pages: Option<&[usize]>,
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    let bytes = input.bytes()?;
    progress.report("Reading file", 20);

    let mut doc = backend.load(bytes)?;
    let count = doc.page_count();
    let targets: Vec<usize> = match pages {
        Some(indices) => indices.iter().copied().filter(|&i| i < count).collect(),
        None => (0..count).collect(),
    };
    if let Some(indices) = pages {
        if targets.len() < indices.len() {
            tracing::debug!(
                requested = indices.len(),
                kept = targets.len(),
                "ignoring page indices past the end of the document"
            );
        }
    }

    for &index in &targets {
        doc.set_rotation(index, degrees)?;
    }
    progress.report("Rotating pages", 60);

    let output = doc.save(SaveOptions::default())?;
    progress.report("Saving document", 90);
    tracing::info!(file = %input.name, pages = targets.len(), degrees, "rotated");
    progress.finish();

    Ok(Blob::pdf(output))
}
