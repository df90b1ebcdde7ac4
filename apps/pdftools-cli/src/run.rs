//! Command execution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use pdftools_core::{
    output_name, parse_page_indices, progress, Blob, EngineConfig, ExportFile, InputFile,
    PdfTools, Progress, ProgressEvent, WatermarkOptions, WatermarkPosition,
};

use crate::cli::{Cli, Command, WatermarkArgs};
use crate::output::Output;

/// Load the engine configuration, falling back to defaults without a file
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    paths
        .iter()
        .map(|path| InputFile::read(path).with_context(|| format!("reading {}", path.display())))
        .collect()
}

/// Run `op` with a channel-backed progress reporter whose events are logged
/// from a separate thread.
fn tracked<T>(
    label: &str,
    op: impl FnOnce(&mut Progress<'_>) -> pdftools_core::Result<T>,
) -> pdftools_core::Result<T> {
    let file = label.to_string();
    tracked_with(label, op, move |event| {
        tracing::debug!(file = %file, stage = %event.stage, percent = event.percent, "progress");
    })
}

/// [`tracked`] with a custom event handler. A panicking handler is logged and
/// does not fail the operation.
fn tracked_with<T>(
    label: &str,
    op: impl FnOnce(&mut Progress<'_>) -> pdftools_core::Result<T>,
    mut handle: impl FnMut(ProgressEvent) + Send + 'static,
) -> pdftools_core::Result<T> {
    let (tx, rx) = progress::channel();
    let reporter = std::thread::spawn(move || {
        for event in rx.iter() {
            handle(event);
        }
    });

    let result = {
        let mut progress = Progress::channel(tx);
        op(&mut progress)
    };
    // The reporter exits once the sender above is dropped
    if reporter.join().is_err() {
        tracing::warn!(file = %label, "progress reporter panicked");
    }
    result
}

/// Run `op` on every input on the blocking pool, keeping input order in the
/// collected results.
async fn process_all<F>(tools: &Arc<PdfTools>, inputs: Vec<InputFile>, op: F) -> Result<Vec<ExportFile>>
where
    F: Fn(&PdfTools, &InputFile) -> Result<Vec<ExportFile>> + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let tools = Arc::clone(tools);
            let op = Arc::clone(&op);
            tokio::task::spawn_blocking(move || op(&tools, &input))
        })
        .collect();

    let mut files = Vec::new();
    for handle in handles {
        files.extend(handle.await.context("worker task failed")??);
    }
    Ok(files)
}

/// Execute a parsed command line and return the paths written
pub async fn run(cli: Cli) -> Result<Vec<PathBuf>> {
    let config = load_config(cli.config.as_deref())?;
    let tools = Arc::new(PdfTools::new(config));
    let output = Output::new(&cli.out, cli.zip);

    let (files, archive_name) = match cli.command {
        Command::Compress { files } => {
            let results = process_all(&tools, read_inputs(&files)?, |tools, input| {
                let blob = tracked(&input.name, |p| tools.compress(input, p))?;
                Ok(vec![ExportFile::new(
                    output_name(&input.name, "compressed", "pdf"),
                    blob,
                )])
            })
            .await?;
            (results, "compressed.zip".to_string())
        }

        Command::Split { file, pages } => {
            let input = InputFile::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let results = match pages {
                Some(selection) => {
                    let pages = parse_page_indices(&selection)?;
                    let blob = tracked(&input.name, |p| tools.extract_pages(&input, &pages, p))?;
                    vec![ExportFile::new(
                        output_name(&input.name, "extracted", "pdf"),
                        blob,
                    )]
                }
                None => tracked(&input.name, |p| tools.split(&input, p))?
                    .into_iter()
                    .enumerate()
                    .map(|(i, blob)| {
                        ExportFile::new(
                            output_name(&input.name, &format!("page_{}", i + 1), "pdf"),
                            blob,
                        )
                    })
                    .collect(),
            };
            (results, output_name(&input.name, "pages", "zip"))
        }

        Command::Merge { files, name } => {
            let inputs = read_inputs(&files)?;
            let blob = tracked(&name, |p| tools.merge(&inputs, p))?;
            (vec![ExportFile::new(name, blob)], "merged.zip".to_string())
        }

        Command::Rotate {
            files,
            degrees,
            pages,
        } => {
            let pages = pages.as_deref().map(parse_page_indices).transpose()?;
            let results = process_all(&tools, read_inputs(&files)?, move |tools, input| {
                let blob = tracked(&input.name, |p| {
                    tools.rotate(input, degrees, pages.as_deref(), p)
                })?;
                Ok(vec![ExportFile::new(
                    output_name(&input.name, "rotated", "pdf"),
                    blob,
                )])
            })
            .await?;
            (results, "rotated.zip".to_string())
        }

        Command::Watermark(args) => {
            let WatermarkArgs {
                files,
                text,
                opacity,
                font_size,
                color,
                position,
            } = args;
            let options = WatermarkOptions {
                opacity,
                font_size,
                color,
                position: WatermarkPosition::parse(&position),
            };
            let results = process_all(&tools, read_inputs(&files)?, move |tools, input| {
                let blob = tracked(&input.name, |p| tools.watermark(input, &text, &options, p))?;
                Ok(vec![ExportFile::new(
                    output_name(&input.name, "watermarked", "pdf"),
                    blob,
                )])
            })
            .await?;
            (results, "watermarked.zip".to_string())
        }

        Command::Text { files, save } => {
            let results = process_all(&tools, read_inputs(&files)?, |tools, input| {
                let text = tracked(&input.name, |p| tools.extract_text(input, p))?;
                Ok(vec![ExportFile::new(
                    output_name(&input.name, "", "txt"),
                    Blob::text(text),
                )])
            })
            .await?;

            if !save {
                for file in &results {
                    println!("{}", String::from_utf8_lossy(&file.blob.bytes));
                }
                return Ok(Vec::new());
            }
            (results, "text.zip".to_string())
        }

        Command::Archive { files, name } => {
            let exports = files
                .iter()
                .map(|path| -> Result<ExportFile> {
                    let input = InputFile::read(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("pdf");
                    let bytes = input.bytes()?.to_vec();
                    Ok(ExportFile::new(input.name.clone(), Blob::for_extension(ext, bytes)))
                })
                .collect::<Result<Vec<_>>>()?;
            let archive = pdftools_core::bundle(&exports, &name)?;
            let written = Output::new(&cli.out, false).save(vec![archive], &name)?;
            return Ok(written);
        }
    };

    Ok(output.save(files, &archive_name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use lopdf::{dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;

    fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..pages)
            .map(|i| {
                let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i + 1);
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => pages as i64,
                "Kids" => kids,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pdftools").chain(args.iter().copied())).unwrap()
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_split_writes_one_file_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "report.pdf", 3);
        let out = dir.path().join("out");

        let written = run(cli(&[
            "split",
            input.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ]))
        .await
        .unwrap();

        assert_eq!(
            file_names(&written),
            vec!["report_page_1.pdf", "report_page_2.pdf", "report_page_3.pdf"]
        );
    }

    #[tokio::test]
    async fn test_split_with_zip_writes_archive() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "report.pdf", 2);

        let written = run(cli(&[
            "split",
            input.to_str().unwrap(),
            "--zip",
            "--out",
            dir.path().to_str().unwrap(),
        ]))
        .await
        .unwrap();

        assert_eq!(file_names(&written), vec!["report_pages.zip"]);
    }

    #[tokio::test]
    async fn test_merge_and_compress_many() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_pdf(dir.path(), "a.pdf", 1);
        let b = write_pdf(dir.path(), "b.pdf", 2);
        let out = dir.path().to_str().unwrap();

        let merged = run(cli(&[
            "merge",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--out",
            out,
        ]))
        .await
        .unwrap();
        assert_eq!(file_names(&merged), vec!["merged.pdf"]);
        assert_eq!(pdftools_core::get_page_count(&std::fs::read(&merged[0]).unwrap()).unwrap(), 3);

        let compressed = run(cli(&[
            "compress",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--out",
            out,
        ]))
        .await
        .unwrap();
        assert_eq!(
            file_names(&compressed),
            vec!["a_compressed.pdf", "b_compressed.pdf"]
        );
    }

    #[tokio::test]
    async fn test_rotate_accepts_negative_degrees() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "r.pdf", 2);

        let written = run(cli(&[
            "rotate",
            input.to_str().unwrap(),
            "--degrees",
            "-90",
            "--pages",
            "2",
            "--out",
            dir.path().to_str().unwrap(),
        ]))
        .await
        .unwrap();
        assert_eq!(file_names(&written), vec!["r_rotated.pdf"]);
    }

    #[tokio::test]
    async fn test_watermark_rejects_bad_color() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "w.pdf", 1);

        let err = run(cli(&[
            "watermark",
            input.to_str().unwrap(),
            "--text",
            "DRAFT",
            "--color",
            "#zzzzzz",
            "--out",
            dir.path().to_str().unwrap(),
        ]))
        .await
        .unwrap_err();
        assert!(err.to_string().contains("#zzzzzz"));
    }

    #[tokio::test]
    async fn test_text_save_writes_txt() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "t.pdf", 2);

        let written = run(cli(&[
            "text",
            input.to_str().unwrap(),
            "--save",
            "--out",
            dir.path().to_str().unwrap(),
        ]))
        .await
        .unwrap();
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(text, "Page 1\n\nPage 2");
    }

    #[tokio::test]
    async fn test_archive_bundles_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_pdf(dir.path(), "a.pdf", 1);
        let b = write_pdf(dir.path(), "b.pdf", 1);
        let out = dir.path().join("bundle");

        let written = run(cli(&[
            "archive",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--name",
            "both.zip",
            "--out",
            out.to_str().unwrap(),
        ]))
        .await
        .unwrap();
        assert_eq!(file_names(&written), vec!["both.zip"]);
    }

    #[test]
    fn test_tracked_survives_reporter_panic() {
        let result = tracked_with(
            "a.pdf",
            |progress| {
                progress.report("Working", 50);
                progress.finish();
                Ok(7)
            },
            |_| panic!("display failed"),
        );
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_tracked_forwards_every_event() {
        let (tx, rx) = std::sync::mpsc::channel();
        tracked_with(
            "a.pdf",
            |progress| {
                progress.report("Loading", 20);
                progress.finish();
                Ok(())
            },
            move |event| {
                let _ = tx.send(event.percent);
            },
        )
        .unwrap();
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![20, 100]);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let err = load_config(Some(Path::new("/nonexistent/pdftools.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("loading configuration"));
    }
}
