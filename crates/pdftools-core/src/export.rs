//! Naming, bundling and delivery of operation results

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::time::Duration;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PdfToolsError, Result};
use crate::input::Blob;

/// Default pause between two downloads of a multi-file result
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_millis(100);

/// A result blob with the file name it should be saved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub blob: Blob,
}

impl ExportFile {
    pub fn new(name: impl Into<String>, blob: Blob) -> Self {
        Self {
            name: name.into(),
            blob,
        }
    }
}

/// Derive an output file name from an input name: `report.pdf` with suffix
/// `page_3` and extension `pdf` becomes `report_page_3.pdf`.
pub fn output_name(input_name: &str, suffix: &str, ext: &str) -> String {
    let base = input_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(input_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    let stem = if stem.trim().is_empty() { "document" } else { stem };

    if suffix.is_empty() {
        format!("{}.{}", stem, ext)
    } else {
        format!("{}_{}.{}", stem, suffix, ext)
    }
}

/// Package results for a single download. One file is returned unchanged;
/// several are stored in a ZIP archive named `archive_name`, with clashing
/// entry names made unique.
pub fn bundle(files: &[ExportFile], archive_name: &str) -> Result<ExportFile> {
    match files {
        [] => Err(PdfToolsError::InvalidInput("No files to bundle".into())),
        [single] => Ok(single.clone()),
        many => {
            let bytes = write_zip(many)?;
            tracing::debug!(entries = many.len(), bytes = bytes.len(), "archive written");
            Ok(ExportFile::new(archive_name, Blob::zip(bytes)))
        }
    }
}

fn write_zip(files: &[ExportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used = HashSet::new();
    for file in files {
        let name = unique_name(&file.name, &mut used);
        zip.start_file(name, options)?;
        zip.write_all(&file.blob.bytes)
            .map_err(|e| PdfToolsError::Archive(e.to_string()))?;
    }

    Ok(zip.finish()?.into_inner())
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Something that can save a file for the user: a browser download, a
/// directory on disk.
pub trait DownloadTarget {
    fn deliver(&mut self, file: &ExportFile) -> Result<()>;
}

/// Delivers files one at a time with a fixed pause between consecutive
/// deliveries, so hosts that throttle rapid downloads accept every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadScheduler {
    delay: Duration,
}

impl Default for DownloadScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOAD_DELAY)
    }
}

impl DownloadScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No pause between files
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Pause owed before delivering file `index`; never before the first.
    pub fn delay_before(&self, index: usize) -> Duration {
        if index == 0 {
            Duration::ZERO
        } else {
            self.delay
        }
    }

    /// Deliver `files` in order, calling `wait` for every non-zero pause.
    /// Stops at the first failed delivery.
    pub fn run<T, W>(&self, files: &[ExportFile], target: &mut T, mut wait: W) -> Result<usize>
    where
        T: DownloadTarget + ?Sized,
        W: FnMut(Duration),
    {
        for (index, file) in files.iter().enumerate() {
            let pause = self.delay_before(index);
            if !pause.is_zero() {
                wait(pause);
            }
            target.deliver(file)?;
            tracing::debug!(file = %file.name, index, "delivered");
        }
        Ok(files.len())
    }

    /// [`run`](Self::run) with the calling thread sleeping between files
    pub fn run_blocking<T>(&self, files: &[ExportFile], target: &mut T) -> Result<usize>
    where
        T: DownloadTarget + ?Sized,
    {
        self.run(files, target, std::thread::sleep)
    }
}
