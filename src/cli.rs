use crate::selection::ExportOrder;
use crate::session::DEFAULT_THUMBNAIL_WIDTH;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfpick")]
#[command(about = "Pick pages out of a PDF and save them as a new document")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Thumbnail width in pixels
    #[arg(long, global = true, env = "PDFPICK_THUMBNAIL_WIDTH", default_value_t = DEFAULT_THUMBNAIL_WIDTH)]
    pub thumbnail_width: u32,

    /// Page order of exported documents
    #[arg(long, global = true, env = "PDFPICK_ORDER", value_enum, default_value_t = ExportOrder::Document)]
    pub order: ExportOrder,

    /// Path to the pdfium shared library
    #[arg(long, global = true, env = "PDFIUM_DYNAMIC_LIB_PATH")]
    pub pdfium_lib: Option<PathBuf>,

    /// Do not render page thumbnails
    #[arg(long, global = true)]
    pub no_thumbnails: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Interactively select pages and export them
    Select {
        /// PDF file to load on start
        path: Option<PathBuf>,

        /// Directory exported files are written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Directory for thumbnail images (a temporary directory if omitted)
        #[arg(long)]
        thumbnail_dir: Option<PathBuf>,
    },

    /// Apply clicks and export the selected pages in one go
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Clicks (e.g. "2-5,9" or "3 +7"); "+N" is a shift-click
        clicks: String,

        /// Output file (defaults to <name>-extracted.pdf in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a thumbnail of every page to PNG files
    Thumbnails {
        /// PDF file to render
        path: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },
}
