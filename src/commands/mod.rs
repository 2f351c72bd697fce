pub mod extract;
pub mod select;
pub mod thumbnails;

use crate::cli::Settings;
use crate::pdf::{PdfiumBackend, RenderBackend};
use crate::session::{document_name, ensure_pdf_extension, SessionConfig};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

impl Settings {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            thumbnail_width: self.thumbnail_width.max(1),
            export_order: self.order,
        }
    }

    /// Bind the renderer unless disabled. Failure to bind only costs thumbnails.
    pub fn render_backend(&self) -> Option<Arc<dyn RenderBackend>> {
        if self.no_thumbnails {
            return None;
        }
        match PdfiumBackend::bind(self.pdfium_lib.as_deref()) {
            Ok(backend) => Some(Arc::new(backend)),
            Err(err) => {
                warn!(error = %err, "page thumbnails disabled");
                None
            }
        }
    }
}

/// Read a user-supplied PDF, returning its file name and bytes.
pub async fn read_document(path: &Path) -> Result<(String, Vec<u8>)> {
    ensure_pdf_extension(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read PDF: {}", path.display()))?;
    Ok((document_name(path), bytes))
}

/// Write `bytes` to `path` through a temporary file so a failure leaves nothing behind.
pub fn save_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create file in {}", dir.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to save PDF: {}", path.display()))?;
    Ok(())
}
