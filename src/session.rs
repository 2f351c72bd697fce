//! The state one interactive session owns: the loaded document, its selection,
//! its thumbnails and its rasterizer.

use crate::error::{Error, Result};
use crate::pdf::{self, PageRasterizer, PdfDocument, RenderBackend};
use crate::selection::{ExportOrder, Selection};
use crate::thumbnails::{RenderOutcome, ThumbnailBoard};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 300;

const EXPORT_SUFFIX: &str = "-extracted.pdf";

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub thumbnail_width: u32,
    pub export_order: ExportOrder,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            export_order: ExportOrder::Document,
        }
    }
}

pub struct LoadedDocument {
    pub name: String,
    pub page_count: u32,
    bytes: Arc<[u8]>,
    selection: Selection,
    thumbnails: ThumbnailBoard,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
}

impl LoadedDocument {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn thumbnails(&self) -> &ThumbnailBoard {
        &self.thumbnails
    }
}

pub struct Session {
    config: SessionConfig,
    backend: Option<Arc<dyn RenderBackend>>,
    current: Option<LoadedDocument>,
}

impl Session {
    pub fn new(config: SessionConfig, backend: Option<Arc<dyn RenderBackend>>) -> Self {
        Session {
            config,
            backend,
            current: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.current.as_ref()
    }

    /// Replace whatever is loaded with the document in `bytes`.
    ///
    /// Prior state is discarded before parsing, so a failed load leaves no
    /// document loaded. Returns the page count.
    pub fn load(&mut self, name: &str, bytes: Vec<u8>) -> Result<u32> {
        self.current = None;

        let document = PdfDocument::from_bytes(&bytes)?;
        let page_count = document.page_count();
        let bytes: Arc<[u8]> = bytes.into();

        let rasterizer = match &self.backend {
            Some(backend) => match backend.open(Arc::clone(&bytes)) {
                Ok(rasterizer) => Some(rasterizer),
                Err(err) => {
                    warn!(error = %err, "thumbnails unavailable for {}", name);
                    None
                }
            },
            None => None,
        };

        info!(name, page_count, "loaded document");
        self.current = Some(LoadedDocument {
            name: name.to_string(),
            page_count,
            bytes,
            selection: Selection::new(page_count),
            thumbnails: ThumbnailBoard::new(page_count),
            rasterizer,
        });
        Ok(page_count)
    }

    /// Start over: drop the document and everything attached to it.
    pub fn reset(&mut self) {
        if let Some(doc) = self.current.take() {
            debug!(name = %doc.name, "session reset");
        }
    }

    /// Apply one click, checking `page` against the loaded document first.
    pub fn click(&mut self, page: u32, extend_range: bool) -> Result<()> {
        let doc = self.current.as_mut().ok_or(Error::NoDocument)?;
        if page == 0 || page > doc.page_count {
            return Err(Error::PageOutOfRange {
                page,
                total: doc.page_count,
            });
        }

        doc.selection.toggle(page, extend_range);
        debug!(
            page,
            extend_range,
            anchor = ?doc.selection.anchor(),
            selected = doc.selection.len(),
            "click"
        );
        Ok(())
    }

    /// Kick off thumbnail renders for the loaded document into `dir`.
    ///
    /// Returns `false` when there is nothing to render with.
    pub fn schedule_thumbnails(&self, dir: &Path, sender: UnboundedSender<RenderOutcome>) -> bool {
        let Some(doc) = &self.current else {
            return false;
        };
        let Some(rasterizer) = &doc.rasterizer else {
            return false;
        };
        doc.thumbnails.schedule(
            Arc::clone(rasterizer),
            self.config.thumbnail_width,
            dir,
            sender,
        );
        true
    }

    pub fn apply_render(&mut self, outcome: RenderOutcome) {
        match self.current.as_mut() {
            Some(doc) => {
                doc.thumbnails.apply(outcome);
            }
            None => debug!(page = outcome.page, "render finished with no document loaded"),
        }
    }

    /// Snapshot what an export needs. The selection itself is not touched.
    pub fn prepare_export(&self) -> Result<ExportJob> {
        let doc = self.current.as_ref().ok_or(Error::NoDocument)?;
        if doc.selection.is_empty() {
            return Err(Error::EmptySelection);
        }

        Ok(ExportJob {
            file_name: export_file_name(&doc.name),
            bytes: Arc::clone(&doc.bytes),
            pages: doc.selection.pages(self.config.export_order),
        })
    }
}

/// Everything needed to produce the exported file, detached from the session.
#[derive(Clone)]
pub struct ExportJob {
    pub file_name: String,
    pub pages: Vec<u32>,
    bytes: Arc<[u8]>,
}

impl fmt::Debug for ExportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportJob")
            .field("file_name", &self.file_name)
            .field("pages", &self.pages)
            .field("source_len", &self.bytes.len())
            .finish()
    }
}

impl ExportJob {
    pub fn run(&self) -> Result<Vec<u8>> {
        let bytes = pdf::extract(&self.bytes, &self.pages)?;
        info!(file = %self.file_name, pages = self.pages.len(), "extracted pages");
        Ok(bytes)
    }
}

/// `<base-name>-extracted.pdf` for a document named `name`.
pub fn export_file_name(name: &str) -> String {
    let base = match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".pdf") => {
            &name[..cut]
        }
        _ => name,
    };
    format!("{}{}", base, EXPORT_SUFFIX)
}

/// Display name of a document read from `path`.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string())
}

/// The only check applied to user-supplied files before reading them.
pub fn ensure_pdf_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => Ok(()),
        _ => Err(Error::UnsupportedFile(path.to_path_buf())),
    }
}
