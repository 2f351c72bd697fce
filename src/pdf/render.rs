use crate::error::{Error, Result};
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rasterizes pages of one loaded document.
///
/// Obtained once per document load and dropped when another document replaces it.
pub trait PageRasterizer: Send + Sync {
    /// Render 1-based `page` scaled to `target_width` pixels.
    fn render_page(&self, page: u32, target_width: u32) -> Result<RgbaImage>;
}

/// Hands out a [`PageRasterizer`] for a document's bytes.
pub trait RenderBackend: Send + Sync {
    fn open(&self, bytes: Arc<[u8]>) -> Result<Arc<dyn PageRasterizer>>;
}

pub struct PdfiumBackend {
    pdfium: Arc<Pdfium>,
}

impl PdfiumBackend {
    /// Bind pdfium from `library` if given, else the working directory, else the system.
    pub fn bind(library: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = library {
            match Pdfium::bind_to_library(path) {
                Ok(bindings) => return Ok(Self::with_bindings(bindings)),
                Err(err) => warn!(path = %path.display(), error = %err, "failed to bind pdfium"),
            }
        }

        let cwd_path = Pdfium::pdfium_platform_library_name_at_path("./");
        match Pdfium::bind_to_library(&cwd_path) {
            Ok(bindings) => return Ok(Self::with_bindings(bindings)),
            Err(err) => debug!(path = %cwd_path.display(), error = %err, "no pdfium in working directory"),
        }

        let bindings = Pdfium::bind_to_system_library()
            .map_err(|err| anyhow::anyhow!("failed to bind system pdfium library: {}", err))?;
        Ok(Self::with_bindings(bindings))
    }

    fn with_bindings(bindings: Box<dyn PdfiumLibraryBindings>) -> Self {
        PdfiumBackend {
            pdfium: Arc::new(Pdfium::new(bindings)),
        }
    }
}

impl RenderBackend for PdfiumBackend {
    fn open(&self, bytes: Arc<[u8]>) -> Result<Arc<dyn PageRasterizer>> {
        Ok(Arc::new(PdfiumRasterizer {
            pdfium: Arc::clone(&self.pdfium),
            bytes,
        }))
    }
}

struct PdfiumRasterizer {
    pdfium: Arc<Pdfium>,
    bytes: Arc<[u8]>,
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_page(&self, page: u32, target_width: u32) -> Result<RgbaImage> {
        let failed = |reason: String| Error::Render { page, reason };

        let index = page
            .checked_sub(1)
            .and_then(|index| PdfPageIndex::try_from(index).ok())
            .ok_or_else(|| failed("page index out of range".to_string()))?;

        // Each render opens its own handle; pdfium documents borrow the bindings
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|err| failed(err.to_string()))?;
        let pdf_page = document
            .pages()
            .get(index)
            .map_err(|err| failed(err.to_string()))?;

        let width = i32::try_from(target_width).unwrap_or(i32::MAX).max(1);
        let config = PdfRenderConfig::new().set_target_width(width);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|err| failed(err.to_string()))?;

        let width = u32::try_from(bitmap.width()).unwrap_or_default();
        let height = u32::try_from(bitmap.height()).unwrap_or_default();
        RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or_else(|| failed(format!("unexpected bitmap size {}x{}", width, height)))
    }
}
