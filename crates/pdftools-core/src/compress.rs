//! Re-serialize a document with unreachable objects dropped and streams
//! deflated. There is no size guarantee: images and fonts are not re-encoded.

use crate::document::{DocumentModel, PdfBackend, SaveOptions};
use crate::error::{OperationKind, PdfToolsError, Result};
use crate::input::{Blob, InputFile};
use crate::progress::Progress;

pub fn compress_document<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    compress_stages(backend, input, progress)
        .map_err(PdfToolsError::during(OperationKind::Compress))
}

fn compress_stages<B: PdfBackend>(
    backend: &B,
    input: &InputFile,
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    let bytes = input.bytes()?;
    progress.report("Reading file", 20);

    let mut doc = backend.load(bytes)?;
    tracing::debug!(file = %input.name, pages = doc.page_count(), "compressing");
    progress.report("Optimizing document", 60);

    let output = doc.save(SaveOptions::compact())?;
    tracing::info!(
        file = %input.name,
        before = bytes.len(),
        after = output.len(),
        "compressed"
    );
    progress.finish();

    Ok(Blob::pdf(output))
}
