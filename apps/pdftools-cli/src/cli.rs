//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pdftools")]
#[command(version, about = "Compress, split, merge, rotate, watermark and read PDF files")]
pub struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory results are written to
    #[arg(long, global = true, default_value = ".")]
    pub out: PathBuf,

    /// Bundle multi-file results into a single ZIP archive
    #[arg(long, global = true)]
    pub zip: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Re-save documents with unused objects dropped and streams deflated
    Compress {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Split a document into one file per page
    Split {
        file: PathBuf,

        /// Extract these pages (e.g. "1-3, 5") into a single file instead
        #[arg(long)]
        pages: Option<String>,
    },

    /// Combine documents in the order given
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Name of the merged file
        #[arg(long, default_value = "merged.pdf")]
        name: String,
    },

    /// Set page rotation
    Rotate {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Angle in degrees, a multiple of 90
        #[arg(long, allow_hyphen_values = true)]
        degrees: i32,

        /// Pages to rotate (e.g. "1-3, 5"); all pages when omitted
        #[arg(long)]
        pages: Option<String>,
    },

    /// Stamp text onto every page
    Watermark(WatermarkArgs),

    /// Print the text of each document
    Text {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write `<name>.txt` files to the output directory instead of stdout
        #[arg(long)]
        save: bool,
    },

    /// Package existing files into a ZIP archive
    Archive {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Name of the archive
        #[arg(long, default_value = "archive.zip")]
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct WatermarkArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Watermark text
    #[arg(long)]
    pub text: String,

    /// Fill opacity between 0 and 1
    #[arg(long, default_value_t = 0.5)]
    pub opacity: f32,

    #[arg(long, default_value_t = 24.0)]
    pub font_size: f64,

    /// Colour as #RRGGBB
    #[arg(long, default_value = "#000000")]
    pub color: String,

    /// top-left, top-center, top-right, middle-left, center, middle-right,
    /// bottom-left, bottom-center or bottom-right
    #[arg(long, default_value = "center")]
    pub position: String,
}
