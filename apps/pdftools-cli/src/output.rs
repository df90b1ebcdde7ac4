//! Writing results to disk

use std::path::{Path, PathBuf};

use pdftools_core::{bundle, DownloadScheduler, DownloadTarget, ExportFile, PdfToolsError};

/// Saves each delivered file into a directory, overwriting files of the
/// same name.
pub struct DirectoryTarget {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadTarget for DirectoryTarget {
    fn deliver(&mut self, file: &ExportFile) -> pdftools_core::Result<()> {
        let delivery_error = |e: std::io::Error| PdfToolsError::Delivery {
            name: file.name.clone(),
            message: e.to_string(),
        };
        std::fs::create_dir_all(&self.dir).map_err(delivery_error)?;

        let path = self.dir.join(&file.name);
        std::fs::write(&path, &file.blob.bytes).map_err(delivery_error)?;
        tracing::info!(path = %path.display(), bytes = file.blob.len(), "wrote");
        self.written.push(path);
        Ok(())
    }
}

/// Where and how results are saved
#[derive(Debug, Clone)]
pub struct Output {
    pub dir: PathBuf,
    pub zip: bool,
}

impl Output {
    pub fn new(dir: impl AsRef<Path>, zip: bool) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            zip,
        }
    }

    /// Write `files`, first bundling them into `archive_name` when zipping
    /// was requested and there is more than one.
    pub fn save(&self, files: Vec<ExportFile>, archive_name: &str) -> pdftools_core::Result<Vec<PathBuf>> {
        let files = if self.zip && files.len() > 1 {
            vec![bundle(&files, archive_name)?]
        } else {
            files
        };

        let mut target = DirectoryTarget::new(&self.dir);
        DownloadScheduler::immediate().run_blocking(&files, &mut target)?;
        Ok(target.written().to_vec())
    }
}
