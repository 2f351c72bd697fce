use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not a PDF file: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("invalid PDF document")]
    InvalidDocument(#[source] lopdf::Error),

    #[error("no document loaded")]
    NoDocument,

    #[error("page {page} is out of range (1-{total})")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("no pages selected")]
    EmptySelection,

    #[error("invalid click {token:?}: {reason}")]
    InvalidClick { token: String, reason: String },

    #[error("failed to render page {page}: {reason}")]
    Render { page: u32, reason: String },

    #[error("failed to write extracted document: {0}")]
    Extraction(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
