//! Combine several documents into one.
//!
//! The algorithm:
//! 1. Reject an empty input list
//! 2. Create an empty destination document
//! 3. For each source, in the order given:
//!    a. Parse it
//!    b. Copy all of its pages, in its own page order
//!    c. Append the copies to the destination page tree
//! 4. Serialize the destination
//!
//! Even a single input goes through the copy, so the output is always a
//! freshly written document.

use crate::document::{DocumentModel, PdfBackend, SaveOptions};
use crate::error::{OperationKind, PdfToolsError, Result};
use crate::input::{Blob, InputFile};
use crate::progress::Progress;

pub fn merge_documents<B: PdfBackend>(
    backend: &B,
    inputs: &[InputFile],
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    if inputs.is_empty() {
        return Err(PdfToolsError::InvalidInput("No documents to merge".into()));
    }

    merge_stages(backend, inputs, progress).map_err(PdfToolsError::during(OperationKind::Merge))
}

fn merge_stages<B: PdfBackend>(
    backend: &B,
    inputs: &[InputFile],
    progress: &mut Progress<'_>,
) -> Result<Blob> {
    let total = inputs.len();
    let mut dest = backend.create();

    for (i, input) in inputs.iter().enumerate() {
        let source = backend.load(input.bytes()?).map_err(|e| match e {
            PdfToolsError::Parse(msg) => {
                PdfToolsError::Parse(format!("Failed to load {}: {}", input.name, msg))
            }
            other => other,
        })?;

        let indices: Vec<usize> = (0..source.page_count()).collect();
        tracing::debug!(file = %input.name, pages = indices.len(), "appending");
        for page in dest.copy_pages(&source, &indices)? {
            dest.add_page(page)?;
        }

        progress.report_step(
            format!("Merging file {} of {}", i + 1, total),
            i + 1,
            total,
            10,
            90,
        );
    }

    progress.report("Saving merged document", 95);
    let bytes = dest.save(SaveOptions::default())?;
    tracing::info!(files = total, pages = dest.page_count(), "merge complete");
    progress.finish();

    Ok(Blob::pdf(bytes))
}
